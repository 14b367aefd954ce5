use std::collections::{HashMap, HashSet};

use crate::assign::Block;
use crate::graph::ConflictGraph;
use crate::instances::SubjectInstance;
use types::SubjectCode;

fn can_merge(a: &Block, b: &Block, instances: &[SubjectInstance], graph: &ConflictGraph) -> bool {
    let seated: HashSet<usize> = a
        .members
        .iter()
        .flat_map(|&m| instances[m].roster.iter().copied())
        .collect();
    let shares_student = b
        .members
        .iter()
        .any(|&m| instances[m].roster.iter().any(|s| seated.contains(s)));
    if shares_student {
        return false;
    }

    // Sibling sessions conflict even when their rosters are empty.
    if a
        .members
        .iter()
        .any(|&x| b.members.iter().any(|&y| graph.conflicts(x, y)))
    {
        return false;
    }

    let mut per_code: HashMap<&SubjectCode, (usize, Option<u32>)> = HashMap::new();
    for &m in a.members.iter().chain(b.members.iter()) {
        let entry = per_code
            .entry(&instances[m].code)
            .or_insert((0, instances[m].teacher_limit));
        entry.0 += 1;
    }
    per_code
        .values()
        .all(|&(count, limit)| limit.map_or(true, |l| count <= l as usize))
}

/// Merges compatible blocks until none remain, restarting the pair scan after
/// every merge. Returns the number of merges.
pub fn merge_blocks(
    blocks: &mut Vec<Block>,
    instances: &[SubjectInstance],
    graph: &ConflictGraph,
) -> usize {
    let mut merges = 0;
    'scan: loop {
        for a in 0..blocks.len() {
            for b in a + 1..blocks.len() {
                if can_merge(&blocks[a], &blocks[b], instances, graph) {
                    let absorbed = blocks.remove(b);
                    blocks[a].members.extend(absorbed.members);
                    merges += 1;
                    continue 'scan;
                }
            }
        }
        break;
    }
    merges
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

    #[test]
    fn merges_fragmented_blocks_to_fixed_point() {
        let instances = vec![
            inst("A", "G1", 1, &[0], None),
            inst("B", "G1", 1, &[1], None),
            inst("C", "G1", 1, &[2], None),
        ];
        let g = ConflictGraph::build(&instances, 3);
        let mut blocks = vec![Block::singleton(0), Block::singleton(1), Block::singleton(2)];
        let merges = merge_blocks(&mut blocks, &instances, &g);
        assert_eq!(merges, 2);
        assert_eq!(blocks, vec![Block { members: vec![0, 1, 2] }]);
    }

    #[test]
    fn keeps_blocks_with_shared_students_apart() {
        let instances = vec![inst("A", "G1", 1, &[0, 1], None), inst("B", "G1", 1, &[1, 2], None)];
        let g = ConflictGraph::build(&instances, 3);
        let mut blocks = vec![Block::singleton(0), Block::singleton(1)];
        assert_eq!(merge_blocks(&mut blocks, &instances, &g), 0);
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn respects_teacher_count() {
        let instances = vec![
            inst("A", "G1", 1, &[0], Some(1)),
            inst("A", "G2", 1, &[1], Some(1)),
            inst("B", "G1", 1, &[2], Some(1)),
        ];
        let g = ConflictGraph::build(&instances, 3);
        let mut blocks = vec![Block::singleton(0), Block::singleton(1), Block::singleton(2)];
        merge_blocks(&mut blocks, &instances, &g);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].members, vec![0, 2]);
        assert_eq!(blocks[1].members, vec![1]);
    }

    #[test]
    fn keeps_empty_sibling_sessions_apart() {
        let instances = vec![inst("A", "G1", 1, &[], None), inst("A", "G1", 2, &[], None)];
        let g = ConflictGraph::build(&instances, 0);
        let mut blocks = vec![Block::singleton(0), Block::singleton(1)];
        assert_eq!(merge_blocks(&mut blocks, &instances, &g), 0);
    }
}
