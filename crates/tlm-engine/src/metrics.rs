//! Per-step and per-run counters.

/// Counters for one completed step, summed over partitions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepRecord {
    /// Step number, from 0.
    pub step: u64,
    /// Active nodes after connect.
    pub active: usize,
    /// Active nodes after connect, per partition.
    pub per_partition: Vec<usize>,
    /// Nodes activated by scatter inside their own partition.
    pub activated: usize,
    /// Discoveries sent across a partition boundary.
    pub handed_off: usize,
    /// Hand-offs that activated a node at merge.
    pub merged: usize,
    /// Hand-offs discarded at merge because the node was already active.
    pub duplicates: usize,
    /// Nodes pruned by connect.
    pub pruned: usize,
    /// Nodes re-homed by a rebalance at the start of the step.
    pub migrated: usize,
}

/// Counters for a whole run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// One record per completed step.
    pub steps: Vec<StepRecord>,
    /// Rebalancing rounds that moved at least one cut.
    pub rebalances: u64,
}

impl RunMetrics {
    /// Global active count after each step.
    pub fn active_counts(&self) -> Vec<usize> {
        self.steps.iter().map(|s| s.active).collect()
    }

    /// Largest global active count seen.
    pub fn peak_active(&self) -> usize {
        self.steps.iter().map(|s| s.active).max().unwrap_or(0)
    }

    /// Nodes pruned over the run.
    pub fn total_pruned(&self) -> usize {
        self.steps.iter().map(|s| s.pruned).sum()
    }

    /// Duplicate hand-offs discarded over the run.
    pub fn total_duplicates(&self) -> usize {
        self.steps.iter().map(|s| s.duplicates).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_empty() {
        let m = RunMetrics::default();
        assert!(m.steps.is_empty());
        assert_eq!(m.peak_active(), 0);
        assert_eq!(m.total_pruned(), 0);
        assert_eq!(m.rebalances, 0);
    }

    #[test]
    fn aggregates() {
        let m = RunMetrics {
            steps: vec![
                StepRecord {
                    step: 0,
                    active: 6,
                    pruned: 1,
                    duplicates: 2,
                    ..StepRecord::default()
                },
                StepRecord {
                    step: 1,
                    active: 4,
                    pruned: 5,
                    ..StepRecord::default()
                },
            ],
            rebalances: 0,
        };
        assert_eq!(m.active_counts(), vec![6, 4]);
        assert_eq!(m.peak_active(), 6);
        assert_eq!(m.total_pruned(), 6);
        assert_eq!(m.total_duplicates(), 2);
    }
}
