use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone,
            Debug,
            Serialize,
            Deserialize,
            ToSchema,
            JsonSchema,
            Eq,
            PartialEq,
            Hash,
            Ord,
            PartialOrd,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}
id_newtype!(StudentId);
id_newtype!(HomeroomId);
id_newtype!(SubjectCode);
id_newtype!(InstanceId);

/// Physical capacity used when the classroom list is empty.
pub const DEFAULT_MAX_SIZE: u32 = 30;

/// Swap trials of the sequence optimizer when the request does not say.
pub const DEFAULT_SEQUENCE_ITERATIONS: u32 = 1000;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMeta {
    pub code: SubjectCode,
    pub name: String,
    #[serde(default = "one")]
    pub credit_count: u32,
    /// Parallel sections of this subject allowed in one block. `None` is unbounded.
    #[serde(default)]
    pub teacher_count: Option<u32>,
    #[serde(default)]
    pub category: String,
    #[serde(default = "unit_weight")]
    pub importance: f64,
}

fn one() -> u32 {
    1
}

fn unit_weight() -> f64 {
    1.0
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub homeroom: HomeroomId,
    #[serde(default)]
    pub subjects: Vec<SubjectCode>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassRoom {
    pub id: String,
    pub max_size: u32,
    #[serde(default)]
    pub min_size: u32,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizeMode {
    /// Fewest blocks, placement guided by student gap cost.
    #[default]
    MinBlocks,
    /// Same block count as `MinBlocks`, instances spread evenly across blocks.
    MinSpace,
}

impl fmt::Display for OptimizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizeMode::MinBlocks => f.write_str("min-blocks"),
            OptimizeMode::MinSpace => f.write_str("min-space"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleParams {
    #[serde(default)]
    pub mode: OptimizeMode,
    /// Advisory floor for mixed groups. Absent or zero disables it.
    #[serde(default)]
    pub min_group_size: Option<u32>,
    /// Overrides the cap derived from the classroom list.
    #[serde(default)]
    pub max_group_size: Option<u32>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_iterations")]
    pub sequence_iterations: u32,
}

fn default_iterations() -> u32 {
    DEFAULT_SEQUENCE_ITERATIONS
}

impl Default for ScheduleParams {
    fn default() -> Self {
        Self {
            mode: OptimizeMode::default(),
            min_group_size: None,
            max_group_size: None,
            seed: 0,
            sequence_iterations: DEFAULT_SEQUENCE_ITERATIONS,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub students: Vec<Student>,
    pub subjects: Vec<SubjectMeta>,
    #[serde(default)]
    pub classrooms: Vec<ClassRoom>,
    #[serde(default)]
    pub params: ScheduleParams,
}

impl ScheduleRequest {
    /// Hard cap for one group: explicit override, else the smallest classroom,
    /// else [`DEFAULT_MAX_SIZE`]. Never below one.
    pub fn max_group_size(&self) -> u32 {
        self.params
            .max_group_size
            .or_else(|| self.classrooms.iter().map(|c| c.max_size).min())
            .unwrap_or(DEFAULT_MAX_SIZE)
            .max(1)
    }

    pub fn min_group_size(&self) -> u32 {
        self.params.min_group_size.unwrap_or(0)
    }

    pub fn subject(&self, code: &SubjectCode) -> Option<&SubjectMeta> {
        self.subjects.iter().find(|s| &s.code == code)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDetail {
    pub instance_id: InstanceId,
    pub subject_code: SubjectCode,
    pub label: String,
    pub student_count: usize,
    pub pure: bool,
    /// Students leaving each homeroom for this instance.
    pub homeroom_moves: BTreeMap<HomeroomId, usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBlock {
    pub id: u32,
    pub instance_ids: Vec<InstanceId>,
    pub labels: Vec<String>,
    pub details: Vec<InstanceDetail>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMetrics {
    pub total_blocks: usize,
    pub max_concurrent: usize,
    pub total_instances: usize,
    pub total_gap_cost: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstanceInfo {
    pub subject_code: SubjectCode,
    pub students: Vec<StudentId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    pub blocks: Vec<ScheduleBlock>,
    pub metrics: ScheduleMetrics,
    pub warnings: Vec<String>,
    pub violations: Vec<String>,
    pub instances: BTreeMap<InstanceId, InstanceInfo>,
    pub stats: serde_json::Value,
}
