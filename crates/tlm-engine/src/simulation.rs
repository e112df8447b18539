//! The driver: owns the grid, spawns one worker per partition, issues
//! steps and decides when the run is over.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;
use tlm_core::{Axis, Bounds};
use tlm_grid::Grid;
use tlm_kernel::{ActiveSet, Pruning};
use tracing::{debug, info, warn};

use crate::audit::audit_ownership;
use crate::barrier::PhaseBarrier;
use crate::config::{ConfigError, SimConfig};
use crate::handoff::link_partitions;
use crate::metrics::{RunMetrics, StepRecord};
use crate::partition::PartitionLayout;
use crate::worker::{Event, PartitionReport, StepCommand, Worker};

// ── CancelToken ────────────────────────────────────────────────────

/// Cooperative cancellation, checked by the driver before each step.
///
/// Clones share the flag, so a token can be handed to another thread
/// before the run starts.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the run stop after the current step.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`cancel()`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ── Outcome types ──────────────────────────────────────────────────

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The wavefront died out after the source finished.
    Converged,
    /// [`SimConfig::max_steps`] was reached first.
    StepLimit,
    /// The [`CancelToken`] was cancelled.
    Cancelled,
}

/// Errors from [`Simulation::run()`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RunError {
    /// A worker thread could not be spawned.
    #[error("worker thread spawn failed: {reason}")]
    ThreadSpawnFailed {
        /// OS error and partition.
        reason: String,
    },
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A worker stopped answering without panicking.
    #[error("worker for partition {partition} stopped without reporting")]
    WorkerLost {
        /// The silent partition.
        partition: usize,
    },
}

/// Result of a completed run.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Why the run stopped.
    pub termination: Termination,
    /// Steps executed.
    pub steps: u64,
    /// Partitions (worker threads) used.
    pub partitions: usize,
    /// Per-step counters.
    pub metrics: RunMetrics,
    /// One slice sample per step, if a slice was configured.
    pub time_variation: Vec<Vec<f64>>,
    /// Partition bounds at the end of the run.
    pub final_bounds: Vec<Bounds>,
}

// ── Simulation ─────────────────────────────────────────────────────

/// A validated grid and configuration, ready to run.
///
/// After a run the grid holds every node's peak; the per-node results
/// are read through [`grid()`](Self::grid). Running again resets the
/// grid first.
#[derive(Debug)]
pub struct Simulation {
    grid: Grid,
    config: SimConfig,
    layout: PartitionLayout,
    pruning: Pruning,
}

const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<Simulation>();
};

impl Simulation {
    /// Validate `config` against `grid` and lay out the partitions.
    pub fn new(grid: Grid, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate(&grid)?;
        let workers = config.resolved_worker_count();
        let layout = PartitionLayout::new(grid.dims(), workers);
        if layout.partition_count() < workers {
            debug!(
                requested = workers,
                used = layout.partition_count(),
                "grid too small for every worker"
            );
        }
        let pruning = Pruning::new(config.metric, config.thresholds);
        Ok(Self {
            grid,
            config,
            layout,
            pruning,
        })
    }

    /// Validate, run once and hand back the report and the grid.
    pub fn run_once(grid: Grid, config: SimConfig) -> Result<(RunReport, Grid), RunError> {
        let mut sim = Self::new(grid, config)?;
        let report = sim.run()?;
        Ok((report, sim.into_grid()))
    }

    /// The grid, holding the results of the last run.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Take the grid back.
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// The configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The initial partition layout. Rebalancing changes a copy.
    pub fn layout(&self) -> &PartitionLayout {
        &self.layout
    }

    /// Run to termination.
    pub fn run(&mut self) -> Result<RunReport, RunError> {
        self.run_with_cancel(&CancelToken::new())
    }

    /// Run to termination or until `cancel` fires.
    ///
    /// # Panics
    ///
    /// Re-raises a worker panic on the calling thread, and panics on an
    /// ownership violation when auditing is on.
    pub fn run_with_cancel(&mut self, cancel: &CancelToken) -> Result<RunReport, RunError> {
        self.grid.reset();
        let grid = &self.grid;
        let config = &self.config;
        let layout = Arc::new(self.layout.clone());
        let partitions = layout.partition_count();

        let source = config.source.position;
        let owner = layout.owner_of(source);
        let barrier = PhaseBarrier::new(partitions);

        let workers: Vec<Worker<'_>> = link_partitions(&layout)
            .into_iter()
            .enumerate()
            .map(|(p, links)| {
                let mut set = ActiveSet::new();
                if p == owner {
                    set.insert(grid, grid.index(source));
                }
                Worker::new(
                    p,
                    grid,
                    &barrier,
                    self.pruning,
                    source,
                    Arc::clone(&layout),
                    set,
                    links,
                    config.audit_ownership,
                )
            })
            .collect();

        info!(
            dims = %grid.dims(),
            partitions,
            shape = ?layout.shape(),
            source = %source,
            waveform = %config.source.waveform,
            metric = ?self.pruning.metric(),
            absolute = self.pruning.thresholds().absolute,
            relative = self.pruning.thresholds().relative,
            "starting wavefront run"
        );

        thread::scope(|s| {
            let (event_tx, event_rx) = crossbeam_channel::unbounded();
            let mut commands = Vec::with_capacity(partitions);
            let mut handles = Vec::with_capacity(partitions);
            for worker in workers {
                let p = worker.partition();
                let (command_tx, command_rx) = crossbeam_channel::unbounded();
                let events = event_tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("tlm-worker-{p}"))
                    .spawn_scoped(s, move || worker.run(command_rx, events));
                match spawned {
                    Ok(handle) => {
                        commands.push(command_tx);
                        handles.push(handle);
                    }
                    // Dropping `commands` releases the workers already
                    // started; the scope joins them.
                    Err(e) => {
                        return Err(RunError::ThreadSpawnFailed {
                            reason: format!("partition {p}: {e}"),
                        });
                    }
                }
            }
            drop(event_tx);

            let mut driver = Driver {
                grid,
                config,
                layout: Arc::clone(&layout),
                pending: None,
                commands,
                events: event_rx,
                cancel,
                metrics: RunMetrics::default(),
                time_variation: Vec::new(),
                next_axis: Axis::X,
            };
            let outcome = driver.drive();
            let Driver {
                layout: final_layout,
                metrics,
                time_variation,
                commands,
                ..
            } = driver;
            drop(commands);

            let mut worker_panic = None;
            for handle in handles {
                if let Err(payload) = handle.join() {
                    worker_panic.get_or_insert(payload);
                }
            }
            if let Some(payload) = worker_panic {
                std::panic::resume_unwind(payload);
            }

            let termination = match outcome {
                Outcome::Finished(t) => t,
                Outcome::Aborted { partition } => {
                    return Err(RunError::WorkerLost { partition });
                }
            };
            let steps = metrics.steps.len() as u64;
            info!(
                ?termination,
                steps,
                peak_active = metrics.peak_active(),
                rebalances = metrics.rebalances,
                "wavefront run finished"
            );
            Ok(RunReport {
                termination,
                steps,
                partitions,
                metrics,
                time_variation,
                final_bounds: final_layout.all_bounds(),
            })
        })
    }
}

// ── Driver loop ────────────────────────────────────────────────────

enum Outcome {
    Finished(Termination),
    Aborted { partition: usize },
}

struct Driver<'a> {
    grid: &'a Grid,
    config: &'a SimConfig,
    /// Layout the workers will be on at the next step.
    layout: Arc<PartitionLayout>,
    /// Layout to ship with the next command.
    pending: Option<Arc<PartitionLayout>>,
    commands: Vec<Sender<StepCommand>>,
    events: Receiver<Event>,
    cancel: &'a CancelToken,
    metrics: RunMetrics,
    time_variation: Vec<Vec<f64>>,
    /// Where the rebalancing rotation resumes.
    next_axis: Axis,
}

impl Driver<'_> {
    fn drive(&mut self) -> Outcome {
        let duration = u64::from(self.config.source.duration);
        let mut step: u64 = 0;
        loop {
            if self.cancel.is_cancelled() {
                warn!(step, "run cancelled");
                return Outcome::Finished(Termination::Cancelled);
            }
            if self.config.max_steps.is_some_and(|max| step >= max) {
                warn!(step, "step limit reached before convergence");
                return Outcome::Finished(Termination::StepLimit);
            }

            let command = StepCommand {
                step,
                sample: self.config.source.sample(step),
                layout: self.pending.take(),
            };
            for (partition, tx) in self.commands.iter().enumerate() {
                if tx.send(command.clone()).is_err() {
                    return Outcome::Aborted { partition };
                }
            }
            let reports = match self.collect(step) {
                Ok(reports) => reports,
                Err(partition) => return Outcome::Aborted { partition },
            };

            let record = step_record(step, &reports);
            debug!(
                step,
                active = record.active,
                activated = record.activated,
                handed_off = record.handed_off,
                duplicates = record.duplicates,
                pruned = record.pruned,
                "step complete"
            );

            if self.config.audit_ownership {
                let members: Vec<Vec<usize>> = reports
                    .iter()
                    .map(|r| r.members.clone().unwrap_or_default())
                    .collect();
                if let Err(violation) = audit_ownership(self.grid, &self.layout, &members) {
                    panic!("ownership audit failed after step {step}: {violation}");
                }
            }
            if let Some(slice) = &self.config.slice {
                self.time_variation.push(self.grid.sample(slice));
            }

            let active = record.active;
            self.metrics.steps.push(record);
            if active == 0 && step + 1 >= duration {
                return Outcome::Finished(Termination::Converged);
            }
            if self.config.rebalance.due_after(step) {
                self.plan_rebalance(step, &reports);
            }
            step += 1;
        }
    }

    /// One report from every worker for `step`, ordered by partition, or
    /// the partition that failed to answer.
    fn collect(&self, step: u64) -> Result<Vec<PartitionReport>, usize> {
        let n = self.commands.len();
        let mut slots: Vec<Option<PartitionReport>> = vec![None; n];
        for _ in 0..n {
            match self.events.recv() {
                Ok(Event::Report(report)) => {
                    debug_assert_eq!(
                        report.step, step,
                        "partition {} reported out of step",
                        report.partition
                    );
                    let p = report.partition;
                    slots[p] = Some(report);
                }
                Ok(Event::Panicked { partition }) => {
                    warn!(partition, "worker panicked");
                    return Err(partition);
                }
                Err(_) => {
                    let missing = slots.iter().position(Option::is_none).unwrap_or(0);
                    return Err(missing);
                }
            }
        }
        Ok(slots.into_iter().flatten().collect())
    }

    /// Shift the cuts of the next split axis towards the lighter side.
    fn plan_rebalance(&mut self, step: u64, reports: &[PartitionReport]) {
        let shape = self.layout.shape();
        let mut axis = self.next_axis;
        let mut found = false;
        for _ in 0..3 {
            if shape[axis.index()] > 1 {
                found = true;
                break;
            }
            axis = axis.next();
        }
        if !found {
            return;
        }
        self.next_axis = axis.next();

        let mut slab_counts = vec![0usize; shape[axis.index()]];
        for r in reports {
            slab_counts[self.layout.lattice_position(r.partition)[axis.index()]] += r.active;
        }
        match self
            .layout
            .rebalanced(axis, &slab_counts, self.config.rebalance.min_imbalance)
        {
            Some(layout) => {
                debug!(step, %axis, ?slab_counts, cuts = ?layout.cuts(axis), "rebalanced");
                let layout = Arc::new(layout);
                self.layout = Arc::clone(&layout);
                self.pending = Some(layout);
                self.metrics.rebalances += 1;
            }
            None => debug!(step, %axis, ?slab_counts, "partitions balanced"),
        }
    }
}

fn step_record(step: u64, reports: &[PartitionReport]) -> StepRecord {
    let mut record = StepRecord {
        step,
        per_partition: reports.iter().map(|r| r.active).collect(),
        ..StepRecord::default()
    };
    for r in reports {
        record.active += r.active;
        record.activated += r.scatter.activated;
        record.handed_off += r.scatter.handed_off;
        record.merged += r.merged;
        record.duplicates += r.duplicates;
        record.pruned += r.connect.pruned;
        record.migrated += r.migrated_in;
    }
    record
}
