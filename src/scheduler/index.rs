//! Problem index.
//!
//! Built once per run from the input: id lookups, the sorted usable slot
//! grid, the lesson visiting order, and per-lesson candidate resources.
//! Lessons that can never be placed are detected here, before any search.

use std::collections::{HashMap, HashSet};

use super::availability::location_suitable;
use super::SchedulerInput;
use crate::config::SchedulerConfig;
use crate::models::{Lesson, Location, Teacher, TimeSlot};

/// Resources a lesson may draw from.
#[derive(Debug, Clone)]
pub struct LessonCandidates<'a> {
    /// Teacher pool: the required teachers if any, otherwise every eligible one.
    pub teachers: Vec<&'a Teacher>,
    /// For dual lessons with exactly one required teacher: the teacher every
    /// pair must contain. The pool then holds the other eligible teachers.
    pub anchor: Option<&'a Teacher>,
    /// Suitable locations.
    pub locations: Vec<&'a Location>,
    /// Why the lesson can never be placed, if so.
    pub infeasible: Option<String>,
}

/// Lookup tables for one run.
#[derive(Debug)]
pub struct ProblemIndex<'a> {
    lessons: HashMap<&'a str, &'a Lesson>,
    teachers: HashMap<&'a str, &'a Teacher>,
    locations: HashMap<&'a str, &'a Location>,
    slots: Vec<TimeSlot>,
    usable: HashSet<TimeSlot>,
    order: Vec<&'a Lesson>,
    candidates: HashMap<&'a str, LessonCandidates<'a>>,
}

impl<'a> ProblemIndex<'a> {
    /// Builds the index.
    pub fn build(input: &'a SchedulerInput, config: &SchedulerConfig) -> Self {
        let lessons: HashMap<&str, &Lesson> =
            input.lessons.iter().map(|l| (l.id.as_str(), l)).collect();
        let teachers: HashMap<&str, &Teacher> =
            input.teachers.iter().map(|t| (t.id.as_str(), t)).collect();
        let locations: HashMap<&str, &Location> =
            input.locations.iter().map(|l| (l.id.as_str(), l)).collect();

        let usable: HashSet<TimeSlot> = input.time_slots.iter().copied().collect();
        let mut slots: Vec<TimeSlot> = usable.iter().copied().collect();
        slots.sort_unstable();

        // Longest lessons first; stable, so ties keep input order.
        let mut order: Vec<&Lesson> = input.lessons.iter().collect();
        order.sort_by(|a, b| b.weekly_hours.cmp(&a.weekly_hours));

        let candidates = input
            .lessons
            .iter()
            .map(|lesson| {
                (
                    lesson.id.as_str(),
                    lesson_candidates(lesson, input, &teachers, config),
                )
            })
            .collect();

        Self {
            lessons,
            teachers,
            locations,
            slots,
            usable,
            order,
            candidates,
        }
    }

    /// Lesson by id.
    pub fn lesson(&self, id: &str) -> Option<&'a Lesson> {
        self.lessons.get(id).copied()
    }

    /// Teacher by id.
    pub fn teacher(&self, id: &str) -> Option<&'a Teacher> {
        self.teachers.get(id).copied()
    }

    /// Location by id.
    pub fn location(&self, id: &str) -> Option<&'a Location> {
        self.locations.get(id).copied()
    }

    /// Usable slots, sorted.
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Usable slots as a set.
    pub fn usable(&self) -> &HashSet<TimeSlot> {
        &self.usable
    }

    /// Lessons in visiting order (weekly hours descending).
    pub fn order(&self) -> &[&'a Lesson] {
        &self.order
    }

    /// Candidate resources of a lesson.
    pub fn candidates(&self, lesson_id: &str) -> Option<&LessonCandidates<'a>> {
        self.candidates.get(lesson_id)
    }

    /// Initial remaining-hours counter.
    pub fn initial_remaining(&self) -> HashMap<String, u32> {
        self.order
            .iter()
            .map(|l| (l.id.clone(), l.required_hours()))
            .collect()
    }

    /// Lessons that can never be placed, with reasons, in visiting order.
    pub fn infeasible_lessons(&self) -> Vec<(&'a str, &str)> {
        self.order
            .iter()
            .copied()
            .filter(|l| l.required_hours() > 0)
            .filter_map(|l| {
                self.candidates
                    .get(l.id.as_str())
                    .and_then(|c| c.infeasible.as_deref())
                    .map(|reason| (l.id.as_str(), reason))
            })
            .collect()
    }
}

fn lesson_candidates<'a>(
    lesson: &'a Lesson,
    input: &'a SchedulerInput,
    teachers: &HashMap<&str, &'a Teacher>,
    config: &SchedulerConfig,
) -> LessonCandidates<'a> {
    let mut seen = HashSet::new();
    let eligible: Vec<&Teacher> = lesson
        .eligible_teacher_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| teachers.get(id.as_str()).copied())
        .collect();
    let required: Vec<&Teacher> = eligible
        .iter()
        .copied()
        .filter(|t| input.required.is_required(&t.id, &lesson.id))
        .collect();

    let locations: Vec<&Location> = input
        .locations
        .iter()
        .filter(|l| location_suitable(lesson, l))
        .collect();

    let (pool, anchor) = match (lesson.requires_dual_resources, required.len()) {
        (_, 0) => (eligible, None),
        (true, 1) => {
            let anchor = required[0];
            let others = eligible
                .into_iter()
                .filter(|t| t.id != anchor.id)
                .collect();
            (others, Some(anchor))
        }
        _ => (required, None),
    };

    let infeasible = infeasibility(lesson, &pool, anchor.is_some(), &locations, config);

    LessonCandidates {
        teachers: pool,
        anchor,
        locations,
        infeasible,
    }
}

fn infeasibility(
    lesson: &Lesson,
    pool: &[&Teacher],
    anchored: bool,
    locations: &[&Location],
    config: &SchedulerConfig,
) -> Option<String> {
    let needed = if lesson.requires_dual_resources { 2 } else { 1 };
    let teacher_count = pool.len() + usize::from(anchored);

    if teacher_count < needed {
        return Some(format!(
            "lesson '{}' needs {needed} teacher(s) but has {teacher_count} eligible",
            lesson.id
        ));
    }
    if locations.len() < needed {
        let wanted = if lesson.needs_lab() {
            format!("lab of type {}", lesson.eligible_lab_type_ids.join("|"))
        } else {
            "ordinary classroom".to_string()
        };
        return Some(format!(
            "lesson '{}' needs {needed} {wanted} location(s) but {} exist",
            lesson.id,
            locations.len()
        ));
    }

    // Smallest block size the planner can fall back to for this lesson.
    let min_block = match (lesson.can_split, lesson.weekly_hours) {
        (false, hours) => hours,
        (true, hours) if hours > 3 => lesson.halves().0,
        (true, hours) => hours.min(1),
    };
    if min_block > u32::from(config.hours_per_day) {
        return Some(format!(
            "lesson '{}' needs a {min_block}-hour block but a day has {} hours",
            lesson.id, config.hours_per_day
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassGroupKey, RequiredAssignments};

    fn group() -> ClassGroupKey {
        ClassGroupKey::new("it", 10)
    }

    fn base_input() -> SchedulerInput {
        SchedulerInput::full_week(10)
            .with_teacher(Teacher::new("T1"))
            .with_teacher(Teacher::new("T2"))
            .with_teacher(Teacher::new("T3"))
            .with_location(Location::classroom("R1"))
            .with_location(Location::classroom("R2"))
            .with_location(Location::lab("LAB", "chem"))
    }

    #[test]
    fn test_order_longest_first_stable() {
        let input = base_input()
            .with_lesson(Lesson::new("A", group()).with_weekly_hours(2))
            .with_lesson(Lesson::new("B", group()).with_weekly_hours(5))
            .with_lesson(Lesson::new("C", group()).with_weekly_hours(2))
            .with_lesson(Lesson::new("D", group()).with_weekly_hours(4));
        let index = ProblemIndex::build(&input, &SchedulerConfig::default());

        let ids: Vec<&str> = index.order().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "D", "A", "C"]);
        assert_eq!(index.slots().len(), 50);
        assert!(index.lesson("A").is_some());
        assert!(index.teacher("T2").is_some());
        assert!(index.location("LAB").is_some());
    }

    #[test]
    fn test_initial_remaining_zero_for_excluded() {
        let input = base_input()
            .with_lesson(Lesson::new("A", group()).with_weekly_hours(3))
            .with_lesson(Lesson::new("B", group()).with_weekly_hours(4).with_included(false));
        let index = ProblemIndex::build(&input, &SchedulerConfig::default());

        let remaining = index.initial_remaining();
        assert_eq!(remaining["A"], 3);
        assert_eq!(remaining["B"], 0);
    }

    #[test]
    fn test_required_teachers_restrict_pool() {
        let input = base_input()
            .with_lesson(
                Lesson::new("A", group())
                    .with_weekly_hours(2)
                    .with_teacher("T1")
                    .with_teacher("T2")
                    .with_teacher("T3"),
            )
            .with_required(RequiredAssignments::new().with("T2", "A"));
        let index = ProblemIndex::build(&input, &SchedulerConfig::default());

        let c = index.candidates("A").unwrap();
        let ids: Vec<&str> = c.teachers.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T2"]);
        assert!(c.anchor.is_none());
        assert_eq!(c.locations.len(), 2);
        assert!(c.infeasible.is_none());
    }

    #[test]
    fn test_dual_single_required_becomes_anchor() {
        let input = base_input()
            .with_location(Location::lab("LAB2", "chem"))
            .with_lesson(
                Lesson::new("A", group())
                    .with_weekly_hours(2)
                    .with_teacher("T1")
                    .with_teacher("T2")
                    .with_teacher("T3")
                    .with_lab_type("chem")
                    .dual(),
            )
            .with_required(RequiredAssignments::new().with("T3", "A"));
        let index = ProblemIndex::build(&input, &SchedulerConfig::default());

        let c = index.candidates("A").unwrap();
        assert_eq!(c.anchor.map(|t| t.id.as_str()), Some("T3"));
        let ids: Vec<&str> = c.teachers.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T2"]);
        assert!(c.infeasible.is_none());
    }

    #[test]
    fn test_structural_infeasibility() {
        let input = base_input()
            .with_lesson(
                Lesson::new("NoLab", group())
                    .with_weekly_hours(2)
                    .with_teacher("T1")
                    .with_lab_type("robotics"),
            )
            .with_lesson(Lesson::new("NoTeacher", group()).with_weekly_hours(2))
            .with_lesson(
                Lesson::new("DualOneRoom", group())
                    .with_weekly_hours(2)
                    .with_teacher("T1")
                    .with_teacher("T2")
                    .with_lab_type("chem")
                    .dual(),
            )
            .with_lesson(
                Lesson::new("TooLong", group())
                    .with_weekly_hours(11)
                    .with_teacher("T1"),
            )
            .with_lesson(
                Lesson::new("Excluded", group())
                    .with_weekly_hours(2)
                    .with_included(false),
            );
        let index = ProblemIndex::build(&input, &SchedulerConfig::default());

        let infeasible = index.infeasible_lessons();
        let ids: Vec<&str> = infeasible.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["TooLong", "NoLab", "NoTeacher", "DualOneRoom"]);
        assert!(infeasible[1].1.contains("robotics"));
        assert!(infeasible[0].1.contains("11-hour block"));
    }

    #[test]
    fn test_unknown_and_duplicate_teacher_ids_are_dropped() {
        let input = base_input().with_lesson(
            Lesson::new("A", group())
                .with_weekly_hours(2)
                .with_teacher("T1")
                .with_teacher("GHOST")
                .with_teacher("T1"),
        );
        let index = ProblemIndex::build(&input, &SchedulerConfig::default());
        assert_eq!(index.candidates("A").unwrap().teachers.len(), 1);
    }
}
