use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use types::{InstanceId, InstanceInfo, StudentId};

/// Empty slots between a student's first and last occupied block.
///
/// `positions` are the block indices the student attends; repeats count once.
pub fn span_gap<I: IntoIterator<Item = usize>>(positions: I) -> i64 {
    let mut min = usize::MAX;
    let mut max = 0usize;
    let mut seen = BTreeSet::new();
    for p in positions {
        min = min.min(p);
        max = max.max(p);
        seen.insert(p);
    }
    if seen.is_empty() {
        return 0;
    }
    (max - min + 1) as i64 - seen.len() as i64
}

/// Gap of a student whose occupied positions are already a set.
pub fn set_gap(positions: &BTreeSet<usize>) -> i64 {
    match (positions.first(), positions.last()) {
        (Some(&lo), Some(&hi)) => (hi - lo + 1) as i64 - positions.len() as i64,
        _ => 0,
    }
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("block {block} references unknown instance {instance}")]
    UnknownInstance { block: usize, instance: InstanceId },
}

#[derive(Clone, Debug, Default)]
pub struct GapScores {
    /// Students with a non-zero gap.
    pub per_student: BTreeMap<StudentId, i64>,
    pub total: i64,
    pub students_scored: usize,
}

/// Gap breakdown for an ordered list of blocks, each given as instance ids.
pub fn compute_gap_scores(
    blocks: &[Vec<InstanceId>],
    instances: &BTreeMap<InstanceId, InstanceInfo>,
) -> Result<GapScores, ScoringError> {
    let mut occupied: BTreeMap<&StudentId, BTreeSet<usize>> = BTreeMap::new();
    for (bi, ids) in blocks.iter().enumerate() {
        for id in ids {
            let info = instances.get(id).ok_or_else(|| ScoringError::UnknownInstance {
                block: bi + 1,
                instance: id.clone(),
            })?;
            for s in &info.students {
                occupied.entry(s).or_default().insert(bi);
            }
        }
    }

    let mut per_student = BTreeMap::new();
    let mut total = 0i64;
    for (s, positions) in &occupied {
        let g = set_gap(positions);
        if g != 0 {
            per_student.insert((*s).clone(), g);
        }
        total += g;
    }

    Ok(GapScores {
        per_student,
        total,
        students_scored: occupied.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(code: &str, students: &[&str]) -> InstanceInfo {
        InstanceInfo {
            subject_code: code.into(),
            students: students.iter().map(|&s| s.into()).collect(),
        }
    }

    #[test]
    fn span_gap_counts_holes() {
        assert_eq!(span_gap(Vec::<usize>::new()), 0);
        assert_eq!(span_gap([4]), 0);
        assert_eq!(span_gap([0, 1, 2]), 0);
        assert_eq!(span_gap([0, 3]), 2);
        assert_eq!(span_gap([5, 1, 1, 3]), 2);
        assert_eq!(set_gap(&BTreeSet::from([2, 6])), 3);
    }

    #[test]
    fn scores_ordered_blocks() {
        let mut instances = BTreeMap::new();
        instances.insert(InstanceId::from("A_G1_1"), info("A", &["s1", "s2"]));
        instances.insert(InstanceId::from("B_G1_1"), info("B", &["s3"]));
        instances.insert(InstanceId::from("C_G1_1"), info("C", &["s1"]));

        let blocks = vec![
            vec![InstanceId::from("A_G1_1")],
            vec![InstanceId::from("B_G1_1")],
            vec![InstanceId::from("C_G1_1")],
        ];
        let scores = compute_gap_scores(&blocks, &instances).unwrap();
        assert_eq!(scores.total, 1);
        assert_eq!(scores.per_student.get(&StudentId::from("s1")), Some(&1));
        assert_eq!(scores.students_scored, 3);
    }

    #[test]
    fn rejects_unknown_instance() {
        let blocks = vec![vec![InstanceId::from("X_G1_1")]];
        let err = compute_gap_scores(&blocks, &BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("X_G1_1"));
    }
}
