//! Moving-class block scheduler.
//!
//! Students' subject selections become subject instances, instances that share
//! students (or sessions of one group) conflict, and the conflict graph is
//! colored into concurrent time blocks. Mixed blocks are then merged where
//! possible and the whole sequence is reordered to close gaps in students'
//! timetables.

pub mod assemble;
pub mod assign;
pub mod graph;
pub mod instances;
pub mod merge;
pub mod sequence;

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::{ScheduleRequest, ScheduleResult, Scheduler};
use tracing::{debug, info};
use types::OptimizeMode;

use crate::assemble::{assemble, Assembly};
use crate::assign::{
    assign_min_blocks, assign_with_fixed_block_count, minimum_block_count, place_pure,
};
use crate::graph::ConflictGraph;
use crate::instances::build_instances;
use crate::merge::merge_blocks;
use crate::sequence::optimize_sequence;

#[derive(Clone, Copy, Debug, Default)]
pub struct MovingScheduler;

impl MovingScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for MovingScheduler {
    fn schedule(&self, req: ScheduleRequest) -> anyhow::Result<ScheduleResult> {
        Ok(run(&req))
    }
}

/// Runs the full pipeline on private state. Deterministic for a given seed.
pub fn run(req: &ScheduleRequest) -> ScheduleResult {
    let params = &req.params;
    info!(
        students = req.students.len(),
        subjects = req.subjects.len(),
        mode = %params.mode,
        seed = params.seed,
        "scheduling moving classes"
    );

    let built = build_instances(req);
    debug!(
        instances = built.instances.len(),
        warnings = built.warnings.len(),
        violations = built.violations.len(),
        "instances built"
    );

    let graph = ConflictGraph::build(&built.instances, built.students.len());
    let (pure, mixed): (Vec<usize>, Vec<usize>) =
        (0..built.instances.len()).partition(|&i| built.instances[i].pure);
    let order = graph.degree_order(mixed);
    debug!(edges = graph.edge_count(), mixed = order.len(), pure = pure.len(), "conflict graph ready");

    let (mut blocks, lower_bound) = match params.mode {
        OptimizeMode::MinBlocks => {
            let blocks = assign_min_blocks(&order, &built.instances, &graph);
            let t = blocks.len();
            (blocks, t)
        }
        OptimizeMode::MinSpace => {
            let t = minimum_block_count(&order, &built.instances, &graph);
            (
                assign_with_fixed_block_count(&order, &built.instances, &graph, t),
                t,
            )
        }
    };
    let assigned = blocks.len();

    let merges = merge_blocks(&mut blocks, &built.instances, &graph);
    debug!(assigned, merges, remaining = blocks.len(), "mixed blocks merged");

    blocks.extend(place_pure(&pure));

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let seq = optimize_sequence(
        &mut blocks,
        &built.instances,
        built.students.len(),
        params.sequence_iterations,
        &mut rng,
    );
    debug!(before = seq.before, after = seq.after, accepted = seq.accepted, "sequence optimized");

    let stats = serde_json::json!({
        "method": "greedy+merge+swap",
        "mode": params.mode,
        "seed": params.seed,
        "lowerBoundBlocks": lower_bound,
        "assignedBlocks": assigned,
        "merges": merges,
        "edges": graph.edge_count(),
        "gapBefore": seq.before,
        "gapAfter": seq.after,
        "acceptedSwaps": seq.accepted,
        "iterations": params.sequence_iterations,
    });

    let result = assemble(Assembly {
        blocks: &blocks,
        instances: &built.instances,
        students: &built.students,
        warnings: built.warnings,
        violations: built.violations,
        total_gap: seq.after,
        stats,
    });
    info!(
        blocks = result.metrics.total_blocks,
        max_concurrent = result.metrics.max_concurrent,
        gap = result.metrics.total_gap_cost,
        "schedule assembled"
    );
    result
}
