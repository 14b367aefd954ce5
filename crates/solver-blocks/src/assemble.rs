use std::collections::BTreeMap;

use types::{
    HomeroomId, InstanceDetail, InstanceId, InstanceInfo, ScheduleBlock, ScheduleMetrics,
    ScheduleResult,
};

use crate::assign::Block;
use crate::instances::{StudentTable, SubjectInstance};

pub struct Assembly<'a> {
    pub blocks: &'a [Block],
    pub instances: &'a [SubjectInstance],
    pub students: &'a StudentTable,
    pub warnings: Vec<String>,
    pub violations: Vec<String>,
    pub total_gap: i64,
    pub stats: serde_json::Value,
}

fn detail(inst: &SubjectInstance, students: &StudentTable) -> InstanceDetail {
    let mut homeroom_moves: BTreeMap<HomeroomId, usize> = BTreeMap::new();
    for &s in &inst.roster {
        *homeroom_moves.entry(students.homerooms[s].clone()).or_default() += 1;
    }
    InstanceDetail {
        instance_id: inst.id.clone(),
        subject_code: inst.code.clone(),
        label: inst.label.clone(),
        student_count: inst.roster.len(),
        pure: inst.pure,
        homeroom_moves,
    }
}

/// Display records in final block order; ids are 1-based positions.
pub fn assemble(a: Assembly<'_>) -> ScheduleResult {
    let blocks: Vec<ScheduleBlock> = a
        .blocks
        .iter()
        .enumerate()
        .map(|(pos, b)| {
            let members = b.members.iter().map(|&m| &a.instances[m]);
            ScheduleBlock {
                id: pos as u32 + 1,
                instance_ids: members.clone().map(|i| i.id.clone()).collect(),
                labels: members.clone().map(|i| i.label.clone()).collect(),
                details: members.map(|i| detail(i, a.students)).collect(),
            }
        })
        .collect();

    let instances: BTreeMap<InstanceId, InstanceInfo> = a
        .instances
        .iter()
        .map(|i| {
            (
                i.id.clone(),
                InstanceInfo {
                    subject_code: i.code.clone(),
                    students: i.roster.iter().map(|&s| a.students.ids[s].clone()).collect(),
                },
            )
        })
        .collect();

    let metrics = ScheduleMetrics {
        total_blocks: blocks.len(),
        max_concurrent: blocks.iter().map(|b| b.instance_ids.len()).max().unwrap_or(0),
        total_instances: a.instances.len(),
        total_gap_cost: a.total_gap,
    };

    ScheduleResult {
        blocks,
        metrics,
        warnings: a.warnings,
        violations: a.violations,
        instances,
        stats: a.stats,
    }
}
