pub mod scoring;

use std::collections::HashSet;
use thiserror::Error;

pub use types::{
    ClassRoom, InstanceId, InstanceInfo, OptimizeMode, ScheduleBlock, ScheduleParams,
    ScheduleRequest, ScheduleResult, Student, StudentId, SubjectCode, SubjectMeta,
};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid request: {0}")]
    Msg(String),
}

/// Advisory input checks. The engine schedules regardless of the outcome.
pub fn validate(req: &ScheduleRequest) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();

    fn chk_unique<I: ToString>(name: &str, ids: impl Iterator<Item = I>, errors: &mut Vec<String>) {
        let mut seen = HashSet::new();
        for id in ids {
            let s = id.to_string();
            if !seen.insert(s.clone()) {
                errors.push(format!("duplicate {name} id: {s}"));
            }
        }
    }
    chk_unique("student", req.students.iter().map(|s| &s.id), &mut errors);
    chk_unique("subject", req.subjects.iter().map(|s| &s.code), &mut errors);
    chk_unique("classroom", req.classrooms.iter().map(|c| &c.id), &mut errors);

    for s in &req.subjects {
        if s.credit_count == 0 {
            errors.push(format!("subject {} has creditCount=0", s.code));
        }
        if s.teacher_count == Some(0) {
            errors.push(format!("subject {} has teacherCount=0", s.code));
        }
    }

    for c in &req.classrooms {
        if c.max_size == 0 {
            errors.push(format!("classroom {} has maxSize=0", c.id));
        }
        if c.min_size > c.max_size {
            errors.push(format!(
                "classroom {} has minSize {} above maxSize {}",
                c.id, c.min_size, c.max_size
            ));
        }
    }

    let min = req.min_group_size();
    let max = req.max_group_size();
    if min > max {
        errors.push(format!("minGroupSize {min} exceeds maxGroupSize {max}"));
    }

    let known: HashSet<&SubjectCode> = req.subjects.iter().map(|s| &s.code).collect();
    let mut reported: HashSet<&SubjectCode> = HashSet::new();
    for st in &req.students {
        for code in &st.subjects {
            if !known.contains(code) && reported.insert(code) {
                errors.push(format!(
                    "student {} selects unknown subject {}",
                    st.id, code
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Msg(errors.join("; ")))
    }
}

/// A scheduling engine. Runs are synchronous and own all of their state.
pub trait Scheduler: Send + Sync + 'static {
    fn schedule(&self, req: ScheduleRequest) -> anyhow::Result<ScheduleResult>;
}
