//! Subject instances: one roster attending one section of a subject, replicated
//! once per weekly session.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use types::{HomeroomId, InstanceId, ScheduleRequest, Student, StudentId, SubjectCode};

/// Index-addressed view of the student population. First record wins on
/// duplicate ids.
#[derive(Clone, Debug, Default)]
pub struct StudentTable {
    pub ids: Vec<StudentId>,
    pub homerooms: Vec<HomeroomId>,
    selections: Vec<HashSet<SubjectCode>>,
}

impl StudentTable {
    pub fn new(students: &[Student]) -> Self {
        let mut table = Self::default();
        let mut seen: HashSet<&StudentId> = HashSet::new();
        for s in students {
            if !seen.insert(&s.id) {
                continue;
            }
            table.ids.push(s.id.clone());
            table.homerooms.push(s.homeroom.clone());
            table.selections.push(s.subjects.iter().cloned().collect());
        }
        table
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn selects(&self, student: usize, code: &SubjectCode) -> bool {
        self.selections[student].contains(code)
    }
}

#[derive(Clone, Debug)]
pub struct SubjectInstance {
    pub id: InstanceId,
    pub code: SubjectCode,
    /// Shared by every session of the same roster.
    pub group: String,
    pub session: u32,
    /// Student indices into the [`StudentTable`], ascending.
    pub roster: Vec<usize>,
    pub pure: bool,
    /// Parallel sections allowed per block; `None` is unbounded.
    pub teacher_limit: Option<u32>,
    pub label: String,
}

#[derive(Debug, Default)]
pub struct BuildOutput {
    pub students: StudentTable,
    pub instances: Vec<SubjectInstance>,
    pub warnings: Vec<String>,
    pub violations: Vec<String>,
}

struct Group {
    key: String,
    label: String,
    roster: Vec<usize>,
    pure: bool,
}

/// Catalogue order first, then codes only seen in student selections.
fn subject_universe(req: &ScheduleRequest) -> Vec<&SubjectCode> {
    let mut seen: HashSet<&SubjectCode> = HashSet::new();
    let mut codes = Vec::new();
    let selected = req.students.iter().flat_map(|s| s.subjects.iter());
    for code in req.subjects.iter().map(|s| &s.code).chain(selected) {
        if seen.insert(code) {
            codes.push(code);
        }
    }
    codes
}

/// Splits `pool` into `ceil(len / max)` groups whose sizes differ by at most one,
/// larger groups first. Falls back to plain `max`-sized chunks when `min` is zero
/// or above `max`.
pub fn balanced_chunks<T: Copy>(pool: &[T], max: usize, min: usize) -> Vec<Vec<T>> {
    if pool.is_empty() {
        return Vec::new();
    }
    let max = max.max(1);
    if min == 0 || min > max {
        return pool.chunks(max).map(|c| c.to_vec()).collect();
    }

    let groups = pool.len().div_ceil(max);
    let base = pool.len() / groups;
    let extra = pool.len() % groups;

    let mut out = Vec::with_capacity(groups);
    let mut start = 0;
    for g in 0..groups {
        let size = base + usize::from(g < extra);
        out.push(pool[start..start + size].to_vec());
        start += size;
    }
    out
}

pub fn build_instances(req: &ScheduleRequest) -> BuildOutput {
    let students = StudentTable::new(&req.students);
    let population = students.len();
    let max_size = req.max_group_size() as usize;
    let min_size = req.min_group_size() as usize;

    let mut homeroom_size: HashMap<&HomeroomId, usize> = HashMap::new();
    for h in &students.homerooms {
        *homeroom_size.entry(h).or_default() += 1;
    }

    let mut instances = Vec::new();
    let mut warnings = Vec::new();
    let mut violations = Vec::new();

    for code in subject_universe(req) {
        let meta = req.subject(code);
        let name = meta.map(|m| m.name.as_str()).unwrap_or(code.0.as_str());
        let credit = meta.map(|m| m.credit_count).unwrap_or(1).max(1);
        let teacher_limit = meta.and_then(|m| m.teacher_count).map(|t| t.max(1));

        let selectors: Vec<usize> = (0..population)
            .filter(|&i| students.selects(i, code))
            .collect();
        if selectors.is_empty() {
            continue;
        }
        if selectors.len() == population {
            warnings.push(format!(
                "[{name}] 전체 학생 {population}명이 선택한 과목이므로 이동 수업 편성에서 제외했습니다"
            ));
            continue;
        }

        let mut by_room: BTreeMap<&HomeroomId, Vec<usize>> = BTreeMap::new();
        for &i in &selectors {
            by_room.entry(&students.homerooms[i]).or_default().push(i);
        }

        let mut groups: Vec<Group> = Vec::new();
        let mut pure_rooms: BTreeSet<&HomeroomId> = BTreeSet::new();
        for (room, members) in by_room {
            if homeroom_size.get(room).copied() == Some(members.len()) {
                pure_rooms.insert(room);
                groups.push(Group {
                    key: format!("H{room}"),
                    label: format!("{name} ({room})"),
                    roster: members,
                    pure: true,
                });
            }
        }

        let pool: Vec<usize> = selectors
            .into_iter()
            .filter(|&i| !pure_rooms.contains(&students.homerooms[i]))
            .collect();
        for (n, chunk) in balanced_chunks(&pool, max_size, min_size).into_iter().enumerate() {
            let no = n + 1;
            if min_size > 0 && chunk.len() < min_size {
                violations.push(format!(
                    "[{name}] group {no} 인원 부족: {}명 (최소 {min_size}명)",
                    chunk.len()
                ));
            }
            groups.push(Group {
                key: format!("G{no}"),
                label: format!("{name} 그룹{no}"),
                roster: chunk,
                pure: false,
            });
        }

        for g in groups {
            for session in 1..=credit {
                let label = if credit > 1 {
                    format!("{} #{session}", g.label)
                } else {
                    g.label.clone()
                };
                instances.push(SubjectInstance {
                    id: InstanceId(format!("{}_{}_{session}", code, g.key)),
                    code: code.clone(),
                    group: g.key.clone(),
                    session,
                    roster: g.roster.clone(),
                    pure: g.pure,
                    teacher_limit,
                    label,
                });
            }
        }
    }

    BuildOutput {
        students,
        instances,
        warnings,
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{ClassRoom, ScheduleParams, SubjectMeta};

    fn meta(code: &str, credit: u32) -> SubjectMeta {
        SubjectMeta {
            code: code.into(),
            name: format!("{code}-name"),
            credit_count: credit,
            teacher_count: None,
            category: String::new(),
            importance: 1.0,
        }
    }

    fn student(id: usize, room: &str, subjects: &[&str]) -> Student {
        Student {
            id: StudentId(format!("s{id}")),
            homeroom: room.into(),
            subjects: subjects.iter().map(|&c| c.into()).collect(),
        }
    }

    fn request(students: Vec<Student>, subjects: Vec<SubjectMeta>) -> ScheduleRequest {
        ScheduleRequest {
            students,
            subjects,
            classrooms: vec![],
            params: ScheduleParams::default(),
        }
    }

    #[test]
    fn balanced_chunks_spread_remainder_forward() {
        let pool: Vec<usize> = (0..31).collect();
        let sizes: Vec<usize> = balanced_chunks(&pool, 25, 10).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![16, 15]);

        let sizes: Vec<usize> = balanced_chunks(&pool, 10, 0).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![10, 10, 10, 1]);

        let sizes: Vec<usize> = balanced_chunks(&pool, 10, 12).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![10, 10, 10, 1]);

        assert!(balanced_chunks::<usize>(&[], 10, 3).is_empty());
    }

    #[test]
    fn subject_taken_by_everyone_is_excluded() {
        let students = (0..100).map(|i| student(i, "1", &["KOR"])).collect();
        let out = build_instances(&request(students, vec![meta("KOR", 3)]));
        assert!(out.instances.is_empty());
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("KOR-name"));
    }

    #[test]
    fn unselected_subject_is_skipped_silently() {
        let students = vec![student(0, "1", &["A"]), student(1, "1", &[])];
        let out = build_instances(&request(students, vec![meta("A", 1), meta("B", 1)]));
        assert!(out.warnings.is_empty());
        assert!(out.instances.iter().all(|i| i.code.0 == "A"));
    }

    #[test]
    fn undersized_groups_are_reported() {
        let mut students: Vec<Student> = (0..30)
            .map(|i| student(i, if i % 2 == 0 { "1" } else { "2" }, &["PHY"]))
            .collect();
        // Keep both homerooms impure.
        students.push(student(100, "1", &[]));
        students.push(student(101, "2", &[]));

        let mut req = request(students, vec![meta("PHY", 1)]);
        req.classrooms = vec![ClassRoom { id: "r".into(), max_size: 25, min_size: 0 }];
        req.params.min_group_size = Some(20);

        let out = build_instances(&req);
        let sizes: Vec<usize> = out.instances.iter().map(|i| i.roster.len()).collect();
        assert_eq!(sizes, vec![15, 15]);
        assert_eq!(
            out.violations,
            vec![
                "[PHY-name] group 1 인원 부족: 15명 (최소 20명)".to_string(),
                "[PHY-name] group 2 인원 부족: 15명 (최소 20명)".to_string(),
            ]
        );
    }

    #[test]
    fn whole_homeroom_becomes_pure_group() {
        let students = vec![
            student(0, "1", &["ART"]),
            student(1, "1", &["ART"]),
            student(2, "2", &["ART"]),
            student(3, "2", &[]),
        ];
        let out = build_instances(&request(students, vec![meta("ART", 2)]));

        let pure: Vec<&SubjectInstance> = out.instances.iter().filter(|i| i.pure).collect();
        let mixed: Vec<&SubjectInstance> = out.instances.iter().filter(|i| !i.pure).collect();
        assert_eq!(pure.len(), 2);
        assert_eq!(mixed.len(), 2);
        assert!(pure.iter().all(|i| i.roster == vec![0, 1]));
        assert!(mixed.iter().all(|i| i.roster == vec![2]));
        assert_eq!(pure[0].id.0, "ART_H1_1");
        assert_eq!(pure[1].id.0, "ART_H1_2");
        assert_eq!(mixed[1].label, "ART-name 그룹1 #2");
    }

    #[test]
    fn missing_metadata_defaults_to_one_session_unbounded() {
        let students = vec![student(0, "1", &["ZZZ"]), student(1, "1", &[])];
        let out = build_instances(&request(students, vec![]));
        assert_eq!(out.instances.len(), 1);
        assert_eq!(out.instances[0].teacher_limit, None);
        assert_eq!(out.instances[0].label, "ZZZ 그룹1");
    }

    #[test]
    fn empty_population_excludes_nothing() {
        let out = build_instances(&request(vec![], vec![meta("A", 1)]));
        assert!(out.instances.is_empty());
        assert!(out.warnings.is_empty());
    }
}
