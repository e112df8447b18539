//! One partition's worker: the per-step protocol run on its own thread.
//!
//! The driver sends a [`StepCommand`] per step. The worker then:
//!
//! 1. adopts a new layout if the command carries one, migrating active
//!    nodes that left its territory (one extra barrier),
//! 2. injects the source sample if it owns the source,
//! 3. scatters, handing boundary discoveries to neighbours,
//! 4. waits at barrier A,
//! 5. merges staged hand-offs,
//! 6. connects and prunes,
//! 7. waits at barrier B,
//! 8. zeroes the outgoing ports of pruned nodes,
//!
//! and reports its counts. A panic anywhere poisons the barrier so the
//! other workers stop instead of waiting forever.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use tlm_core::{Axis, Bounds, Coord, Face};
use tlm_grid::Grid;
use tlm_kernel::{
    clear_pruned, connect, inject, scatter, ActiveSet, ConnectStats, Pruning, ScatterStats,
};
use tracing::{debug, trace};

use crate::barrier::{BarrierPoisoned, PhaseBarrier};
use crate::handoff::{Handoff, Links};
use crate::partition::PartitionLayout;

/// Instruction for one step, sent to every worker.
#[derive(Clone, Debug)]
pub(crate) struct StepCommand {
    pub(crate) step: u64,
    /// Source amplitude this step, `None` once the source is exhausted.
    pub(crate) sample: Option<f64>,
    /// Layout to adopt before stepping, after a rebalance.
    pub(crate) layout: Option<Arc<PartitionLayout>>,
}

/// What a worker tells the driver.
#[derive(Debug)]
pub(crate) enum Event {
    Report(PartitionReport),
    Panicked { partition: usize },
}

/// One partition's counts for one step.
#[derive(Clone, Debug, Default)]
pub(crate) struct PartitionReport {
    pub(crate) partition: usize,
    pub(crate) step: u64,
    /// Members after connect.
    pub(crate) active: usize,
    pub(crate) scatter: ScatterStats,
    pub(crate) merged: usize,
    pub(crate) duplicates: usize,
    pub(crate) connect: ConnectStats,
    pub(crate) migrated_out: usize,
    pub(crate) migrated_in: usize,
    /// Member indices, only when ownership auditing is on.
    pub(crate) members: Option<Vec<usize>>,
}

pub(crate) struct Worker<'a> {
    partition: usize,
    grid: &'a Grid,
    barrier: &'a PhaseBarrier,
    pruning: Pruning,
    source: Coord,
    layout: Arc<PartitionLayout>,
    bounds: Bounds,
    set: ActiveSet,
    links: Links,
    /// Discoveries that arrived while draining migrations.
    staged: Vec<usize>,
    pruned: Vec<usize>,
    audit: bool,
}

/// Poisons the barrier and tells the driver if the worker unwinds.
struct PoisonOnPanic<'a> {
    barrier: &'a PhaseBarrier,
    events: Sender<Event>,
    partition: usize,
}

impl Drop for PoisonOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.barrier.poison();
            let _ = self.events.send(Event::Panicked {
                partition: self.partition,
            });
        }
    }
}

impl<'a> Worker<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        partition: usize,
        grid: &'a Grid,
        barrier: &'a PhaseBarrier,
        pruning: Pruning,
        source: Coord,
        layout: Arc<PartitionLayout>,
        set: ActiveSet,
        links: Links,
        audit: bool,
    ) -> Self {
        let bounds = layout.bounds(partition);
        Self {
            partition,
            grid,
            barrier,
            pruning,
            source,
            layout,
            bounds,
            set,
            links,
            staged: Vec::new(),
            pruned: Vec::new(),
            audit,
        }
    }

    pub(crate) fn partition(&self) -> usize {
        self.partition
    }

    /// Step on command until the command channel closes, the driver
    /// stops listening, or another worker poisons the barrier.
    pub(crate) fn run(mut self, commands: Receiver<StepCommand>, events: Sender<Event>) {
        let _guard = PoisonOnPanic {
            barrier: self.barrier,
            events: events.clone(),
            partition: self.partition,
        };
        debug!(partition = self.partition, bounds = %self.bounds, "worker started");
        while let Ok(command) = commands.recv() {
            match self.step(&command) {
                Ok(report) => {
                    if events.send(Event::Report(report)).is_err() {
                        break;
                    }
                }
                Err(BarrierPoisoned) => {
                    debug!(
                        partition = self.partition,
                        step = command.step,
                        "barrier poisoned, stopping"
                    );
                    break;
                }
            }
        }
        debug!(partition = self.partition, "worker stopped");
    }

    fn step(&mut self, command: &StepCommand) -> Result<PartitionReport, BarrierPoisoned> {
        let mut report = PartitionReport {
            partition: self.partition,
            step: command.step,
            ..PartitionReport::default()
        };
        let grid = self.grid;

        if let Some(layout) = &command.layout {
            self.migrate(layout, &mut report)?;
        }

        if let Some(amplitude) = command.sample {
            if self.bounds.contains(self.source) {
                let index = grid.index(self.source);
                inject(grid, &mut self.set, index, amplitude, &self.pruning);
            }
        }

        let partition = self.partition;
        let outbound = &self.links.outbound;
        report.scatter = scatter(grid, &mut self.set, &self.bounds, |face, n| {
            send(outbound, partition, face, Handoff::Discovered(n));
        });
        trace!(
            partition,
            step = command.step,
            scattered = report.scatter.scattered,
            handed_off = report.scatter.handed_off,
            "scatter"
        );

        self.barrier.wait()?;

        self.merge(&mut report);
        report.connect = connect(grid, &mut self.set, &self.pruning, &mut self.pruned);
        trace!(
            partition,
            step = command.step,
            merged = report.merged,
            pruned = report.connect.pruned,
            "connect"
        );

        self.barrier.wait()?;

        clear_pruned(grid, &mut self.pruned);
        report.active = self.set.len();
        if self.audit {
            report.members = Some(self.set.iter().collect());
        }
        Ok(report)
    }

    /// Move members outside the new territory to their new owners and
    /// adopt the ones moving in.
    fn migrate(
        &mut self,
        layout: &Arc<PartitionLayout>,
        report: &mut PartitionReport,
    ) -> Result<(), BarrierPoisoned> {
        let old = std::mem::replace(&mut self.layout, Arc::clone(layout));
        self.bounds = layout.bounds(self.partition);

        let leaving: Vec<usize> = self
            .set
            .iter()
            .filter(|&i| !self.bounds.contains(self.grid.coord(i)))
            .collect();
        for n in leaving {
            let owner = layout.owner_of(self.grid.coord(n));
            // Cuts move at most one slab, so the new owner was a face
            // neighbour under the old layout.
            let face = migration_face(&old, self.partition, owner).unwrap_or_else(|| {
                panic!(
                    "node {} moved from partition {} to non-adjacent partition {owner}",
                    self.grid.coord(n),
                    self.partition
                )
            });
            self.set.detach(n);
            send(&self.links.outbound, self.partition, face, Handoff::Migrated(n));
            report.migrated_out += 1;
        }

        self.barrier.wait()?;

        // Faster neighbours may already be scattering into our channels.
        for message in self.links.drain() {
            match message {
                Handoff::Migrated(n) => {
                    assert!(
                        self.bounds.contains(self.grid.coord(n)),
                        "partition {} adopted {} outside {}",
                        self.partition,
                        self.grid.coord(n),
                        self.bounds
                    );
                    self.set.adopt(n);
                    report.migrated_in += 1;
                }
                Handoff::Discovered(n) => self.staged.push(n),
            }
        }
        debug!(
            partition = self.partition,
            bounds = %self.bounds,
            migrated_out = report.migrated_out,
            migrated_in = report.migrated_in,
            "adopted new layout"
        );
        Ok(())
    }

    /// Activate staged hand-offs; ones already active are duplicates.
    fn merge(&mut self, report: &mut PartitionReport) {
        let staged = std::mem::take(&mut self.staged);
        let arrived = self.links.drain().map(|message| match message {
            Handoff::Discovered(n) => n,
            Handoff::Migrated(n) => panic!(
                "migration of node {} reached partition {} outside a rebalance",
                self.grid.coord(n),
                self.partition
            ),
        });
        let incoming: Vec<usize> = staged.into_iter().chain(arrived).collect();

        for n in incoming {
            let c = self.grid.coord(n);
            assert!(
                self.bounds.contains(c),
                "partition {} received {c} outside {}",
                self.partition,
                self.bounds
            );
            if self.set.insert(self.grid, n) {
                report.merged += 1;
            } else {
                report.duplicates += 1;
            }
        }
    }
}

/// Face of partition `from` across which `to` lies in `layout`, if the
/// two are face neighbours.
fn migration_face(layout: &PartitionLayout, from: usize, to: usize) -> Option<Face> {
    let a = layout.lattice_position(from);
    let b = layout.lattice_position(to);
    let axis = Axis::ALL.into_iter().find(|ax| a[ax.index()] != b[ax.index()])?;
    let face = Face::toward(axis, b[axis.index()] > a[axis.index()]);
    (layout.neighbour(from, face) == Some(to)).then_some(face)
}

fn send(outbound: &[Option<Sender<Handoff>>; 6], partition: usize, face: Face, message: Handoff) {
    match &outbound[face.index()] {
        // The receiver only goes away when its worker has died, which the
        // barrier reports.
        Some(tx) => {
            let _ = tx.send(message);
        }
        None => panic!("partition {partition} has no neighbour across {face} for {message:?}"),
    }
}
