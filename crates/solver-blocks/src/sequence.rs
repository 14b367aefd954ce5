use rand::Rng;
use sched_core::scoring::span_gap;

use crate::assign::Block;
use crate::instances::SubjectInstance;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequenceOutcome {
    pub before: i64,
    pub after: i64,
    pub accepted: usize,
}

/// Aggregate student gap over the current block ordering.
pub fn total_gap(blocks: &[Block], instances: &[SubjectInstance], students: usize) -> i64 {
    let mut positions: Vec<Vec<usize>> = vec![Vec::new(); students];
    for (bi, b) in blocks.iter().enumerate() {
        for &m in &b.members {
            for &s in &instances[m].roster {
                positions[s].push(bi);
            }
        }
    }
    positions.iter().map(|p| span_gap(p.iter().copied())).sum()
}

/// Random pairwise swaps, kept only when the total gap strictly drops.
pub fn optimize_sequence<R: Rng>(
    blocks: &mut [Block],
    instances: &[SubjectInstance],
    students: usize,
    iterations: u32,
    rng: &mut R,
) -> SequenceOutcome {
    let before = total_gap(blocks, instances, students);
    let mut current = before;
    let mut accepted = 0;

    let n = blocks.len();
    if n >= 2 {
        for _ in 0..iterations {
            if current == 0 {
                break;
            }
            let i = rng.gen_range(0..n);
            let mut j = rng.gen_range(0..n - 1);
            if j >= i {
                j += 1;
            }
            blocks.swap(i, j);
            let cost = total_gap(blocks, instances, students);
            if cost < current {
                current = cost;
                accepted += 1;
            } else {
                blocks.swap(i, j);
            }
        }
    }

    SequenceOutcome {
        before,
        after: current,
        accepted,
    }
}
