use std::collections::{BTreeSet, HashMap};
use std::iter;

use sched_core::scoring::span_gap;

use crate::graph::ConflictGraph;
use crate::instances::SubjectInstance;

/// One concurrent time slot, holding instance indices in placement order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub members: Vec<usize>,
}

impl Block {
    pub fn singleton(i: usize) -> Self {
        Self { members: vec![i] }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// No conflicting instance already in the block, and a free teacher for the subject.
pub fn fits(block: &Block, i: usize, instances: &[SubjectInstance], graph: &ConflictGraph) -> bool {
    if block.members.iter().any(|&m| graph.conflicts(i, m)) {
        return false;
    }
    let inst = &instances[i];
    match inst.teacher_limit {
        Some(limit) => {
            let same = block
                .members
                .iter()
                .filter(|&&m| instances[m].code == inst.code)
                .count();
            same < limit as usize
        }
        None => true,
    }
}

/// Per-student block positions, live for one placement pass.
#[derive(Default)]
struct StudentBlocks {
    sets: HashMap<usize, BTreeSet<usize>>,
}

impl StudentBlocks {
    /// Summed gap over `roster` if the instance joined `block`.
    fn cost_with(&self, roster: &[usize], block: usize) -> i64 {
        roster
            .iter()
            .map(|s| match self.sets.get(s) {
                Some(set) => span_gap(set.iter().copied().chain(iter::once(block))),
                None => 0,
            })
            .sum()
    }

    fn record(&mut self, roster: &[usize], block: usize) {
        for &s in roster {
            self.sets.entry(s).or_default().insert(block);
        }
    }
}

/// Greedy gap-guided placement. Each instance goes to the cheapest feasible
/// existing block unless opening a new block is strictly cheaper.
pub fn assign_min_blocks(
    order: &[usize],
    instances: &[SubjectInstance],
    graph: &ConflictGraph,
) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut index = StudentBlocks::default();

    for &i in order {
        let roster = &instances[i].roster;

        let mut best: Option<(usize, i64)> = None;
        for (bi, b) in blocks.iter().enumerate() {
            if !fits(b, i, instances, graph) {
                continue;
            }
            let cost = index.cost_with(roster, bi);
            if best.map_or(true, |(_, c)| cost < c) {
                best = Some((bi, cost));
            }
        }
        let open_cost = index.cost_with(roster, blocks.len());

        let target = match best {
            Some((bi, cost)) if cost <= open_cost => bi,
            _ => {
                blocks.push(Block::default());
                blocks.len() - 1
            }
        };
        blocks[target].members.push(i);
        index.record(roster, target);
    }
    blocks
}

pub fn minimum_block_count(
    order: &[usize],
    instances: &[SubjectInstance],
    graph: &ConflictGraph,
) -> usize {
    assign_min_blocks(order, instances, graph).len()
}

/// Load-balancing placement over `count` pre-created blocks. Instances that fit
/// nowhere open extra blocks past `count`.
pub fn assign_with_fixed_block_count(
    order: &[usize],
    instances: &[SubjectInstance],
    graph: &ConflictGraph,
    count: usize,
) -> Vec<Block> {
    let mut blocks: Vec<Block> = vec![Block::default(); count];

    for &i in order {
        let target = blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| fits(b, i, instances, graph))
            .min_by_key(|(bi, b)| (b.len(), *bi))
            .map(|(bi, _)| bi);

        match target {
            Some(bi) => blocks[bi].members.push(i),
            None => blocks.push(Block::singleton(i)),
        }
    }
    blocks.retain(|b| !b.is_empty());
    blocks
}

/// Intact homerooms never share a block.
pub fn place_pure(pure: &[usize]) -> Vec<Block> {
    pure.iter().map(|&i| Block::singleton(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::InstanceId;

    fn inst(code: &str, group: &str, session: u32, roster: &[usize], limit: Option<u32>) -> SubjectInstance {
        SubjectInstance {
            id: InstanceId(format!("{code}_{group}_{session}")),
            code: code.into(),
            group: group.to_string(),
            session,
            roster: roster.to_vec(),
            pure: false,
            teacher_limit: limit,
            label: String::new(),
        }
    }

    fn student_count(instances: &[SubjectInstance]) -> usize {
        instances
            .iter()
            .flat_map(|i| i.roster.iter().copied())
            .max()
            .map_or(0, |m| m + 1)
    }

    fn plan(instances: &[SubjectInstance]) -> (ConflictGraph, Vec<usize>) {
        let g = ConflictGraph::build(instances, student_count(instances));
        let order = g.degree_order(0..instances.len());
        (g, order)
    }

    #[test]
    fn disjoint_subjects_share_one_block() {
        let a: Vec<usize> = (0..20).collect();
        let b: Vec<usize> = (20..40).collect();
        let instances = vec![inst("A", "G1", 1, &a, Some(1)), inst("B", "G1", 1, &b, Some(1))];
        let (g, order) = plan(&instances);
        let blocks = assign_min_blocks(&order, &instances, &g);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].len(), 2);
    }

    #[test]
    fn teacher_count_limits_parallel_sections() {
        let instances = vec![
            inst("A", "G1", 1, &[0], Some(2)),
            inst("A", "G2", 1, &[1], Some(2)),
            inst("A", "G3", 1, &[2], Some(2)),
        ];
        let (g, order) = plan(&instances);
        let blocks = assign_min_blocks(&order, &instances, &g);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.len() <= 2));
    }

    #[test]
    fn sessions_of_one_group_are_separated() {
        let instances = vec![
            inst("A", "G1", 1, &[0, 1], None),
            inst("A", "G1", 2, &[0, 1], None),
            inst("A", "G1", 3, &[0, 1], None),
        ];
        let (g, order) = plan(&instances);
        let blocks = assign_min_blocks(&order, &instances, &g);
        assert_eq!(blocks.len(), 3);
        assert_eq!(minimum_block_count(&order, &instances, &g), 3);
    }

    #[test]
    fn cost_prefers_adjacent_block() {
        // Student 0 already sits in blocks 0 and 1; the candidate could join
        // block 0 or block 2 only, and both are gap-free for student 0.
        let mut index = StudentBlocks::default();
        index.record(&[0], 0);
        index.record(&[0], 1);
        index.record(&[1], 3);
        assert_eq!(index.cost_with(&[0], 2), 0);
        assert_eq!(index.cost_with(&[0], 4), 2);
        assert_eq!(index.cost_with(&[0, 1], 2), 0);
        assert_eq!(index.cost_with(&[0, 1], 0), 2);
        assert_eq!(index.cost_with(&[7], 9), 0);
        // Joining a block the student already attends adds no slot.
        assert_eq!(index.cost_with(&[0], 1), 0);
    }

    #[test]
    fn fixed_count_spreads_load() {
        // Four independent sections of one subject, teacher count 2:
        // min-blocks packs two per block, min-space keeps two blocks too.
        let instances: Vec<SubjectInstance> = (0..4)
            .map(|k| inst("A", &format!("G{k}"), 1, &[k], Some(2)))
            .collect();
        let (g, order) = plan(&instances);
        let t = minimum_block_count(&order, &instances, &g);
        assert_eq!(t, 2);
        let blocks = assign_with_fixed_block_count(&order, &instances, &g, t);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.len() == 2));
    }

    #[test]
    fn fixed_count_balances_unbounded_subjects() {
        let instances = vec![
            inst("A", "G1", 1, &[0, 1], None),
            inst("A", "G1", 2, &[0, 1], None),
            inst("B", "G1", 1, &[2], None),
            inst("C", "G1", 1, &[3], None),
        ];
        let (g, order) = plan(&instances);
        let blocks = assign_with_fixed_block_count(&order, &instances, &g, 2);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].len(), 2);
        assert_eq!(blocks[1].len(), 2);
    }

    #[test]
    fn fixed_count_grows_when_nothing_fits() {
        let instances = vec![
            inst("A", "G1", 1, &[0], None),
            inst("A", "G1", 2, &[0], None),
            inst("A", "G1", 3, &[0], None),
        ];
        let (g, order) = plan(&instances);
        let blocks = assign_with_fixed_block_count(&order, &instances, &g, 1);
        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn pure_instances_get_singletons() {
        let blocks = place_pure(&[4, 7]);
        assert_eq!(blocks, vec![Block::singleton(4), Block::singleton(7)]);
    }
}
