//! Input validation and schedule verification.
//!
//! [`validate_input`] checks the structural integrity of a problem before
//! searching. Detects:
//! - Duplicate IDs (lessons, teachers, locations) and duplicate slots
//! - Lessons or required assignments referencing unknown teachers
//! - Required assignments referencing unknown lessons
//! - Slots outside `1..=hours_per_day`
//! - Included lessons with zero weekly hours
//!
//! [`validate_schedule`] checks a finished schedule against every property
//! a valid timetable must satisfy and reports each breach as a
//! [`Violation`]. The scheduler runs it as its final consistency pass.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::config::SchedulerConfig;
use crate::models::{
    ClassGroupKey, Lesson, Location, Schedule, TimeSlot, Violation, ViolationType,
};
use crate::scheduler::{location_suitable, SchedulerInput};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A lesson or required assignment references a teacher that doesn't exist.
    UnknownTeacher,
    /// A required assignment references a lesson that doesn't exist.
    UnknownLesson,
    /// A time slot is outside the daily grid or listed twice.
    InvalidTimeSlot,
    /// An included lesson has no weekly hours.
    EmptyLesson,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the input data for a timetabling problem.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(input: &SchedulerInput, hours_per_day: u8) -> ValidationResult {
    let mut errors = Vec::new();

    let mut teacher_ids = HashSet::new();
    for t in &input.teachers {
        if !teacher_ids.insert(t.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate teacher ID: {}", t.id),
            ));
        }
    }

    let mut location_ids = HashSet::new();
    for l in &input.locations {
        if !location_ids.insert(l.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate location ID: {}", l.id),
            ));
        }
    }

    let mut lesson_ids = HashSet::new();
    for lesson in &input.lessons {
        if !lesson_ids.insert(lesson.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate lesson ID: {}", lesson.id),
            ));
        }

        if lesson.include_in_schedule && lesson.weekly_hours == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyLesson,
                format!("Lesson '{}' is included but has no weekly hours", lesson.id),
            ));
        }

        for teacher_id in &lesson.eligible_teacher_ids {
            if !teacher_ids.contains(teacher_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTeacher,
                    format!(
                        "Lesson '{}' references unknown teacher '{}'",
                        lesson.id, teacher_id
                    ),
                ));
            }
        }
    }

    // Sorted for stable messages.
    let mut pairs: Vec<(&str, &str)> = input.required.pairs().collect();
    pairs.sort_unstable();
    for (teacher_id, lesson_id) in pairs {
        if !teacher_ids.contains(teacher_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownTeacher,
                format!("Required assignment references unknown teacher '{teacher_id}'"),
            ));
        }
        if !lesson_ids.contains(lesson_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownLesson,
                format!("Required assignment references unknown lesson '{lesson_id}'"),
            ));
        }
    }

    let mut seen_slots = HashSet::new();
    for slot in &input.time_slots {
        if slot.hour == 0 || slot.hour > hours_per_day {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeSlot,
                format!("Time slot {slot} is outside hours 1..={hours_per_day}"),
            ));
        }
        if !seen_slots.insert(*slot) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeSlot,
                format!("Duplicate time slot: {slot}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Verifies a schedule against its problem.
///
/// Checks:
/// 1. Teacher exclusivity and class-group exclusivity per slot
/// 2. Teacher availability and location suitability per entry
/// 3. Entries reference known lessons/teachers/locations and usable slots
/// 4. At most `max_teachers_per_lesson` distinct teachers per lesson
/// 5. Placed hours equal the required hours of every lesson
/// 6. Dual-resource hours carry exactly two entries
/// 7. Split lessons above `split_day_threshold` hours use at least two days
///
/// Returns an empty vector for a valid schedule.
pub fn validate_schedule(
    schedule: &Schedule,
    input: &SchedulerInput,
    config: &SchedulerConfig,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let lessons: HashMap<&str, &Lesson> =
        input.lessons.iter().map(|l| (l.id.as_str(), l)).collect();
    let teachers: HashMap<&str, _> = input.teachers.iter().map(|t| (t.id.as_str(), t)).collect();
    let locations: HashMap<&str, &Location> =
        input.locations.iter().map(|l| (l.id.as_str(), l)).collect();
    let usable: HashSet<&TimeSlot> = input.time_slots.iter().collect();

    // (slot, teacher) and (slot, class-group) occupancy
    let mut teacher_slots: HashMap<(TimeSlot, &str), usize> = HashMap::new();
    let mut group_lessons: HashMap<(TimeSlot, &ClassGroupKey), HashSet<&str>> =
        HashMap::new();
    // lesson -> slot -> entry count
    let mut lesson_hours: HashMap<&str, BTreeMap<TimeSlot, usize>> = HashMap::new();

    for entry in schedule.entries() {
        let slot = entry.time_slot;
        *teacher_slots
            .entry((slot, entry.teacher_id.as_str()))
            .or_insert(0) += 1;
        group_lessons
            .entry((slot, &entry.class_group))
            .or_default()
            .insert(entry.lesson_id.as_str());
        *lesson_hours
            .entry(entry.lesson_id.as_str())
            .or_default()
            .entry(slot)
            .or_insert(0) += 1;

        if !usable.contains(&slot) || slot.hour == 0 || slot.hour > config.hours_per_day {
            violations.push(Violation::new(
                ViolationType::InvalidSlot,
                &entry.lesson_id,
                format!("Lesson '{}' placed at unusable slot {slot}", entry.lesson_id),
            ));
        }

        let Some(lesson) = lessons.get(entry.lesson_id.as_str()) else {
            violations.push(Violation::new(
                ViolationType::UnknownReference,
                &entry.lesson_id,
                format!("Entry at {slot} references unknown lesson '{}'", entry.lesson_id),
            ));
            continue;
        };

        match teachers.get(entry.teacher_id.as_str()) {
            Some(teacher) if !teacher.is_free_at(&slot) => violations.push(Violation::new(
                ViolationType::TeacherUnavailable,
                &entry.teacher_id,
                format!("Teacher '{}' is unavailable at {slot}", entry.teacher_id),
            )),
            Some(_) => {}
            None => violations.push(Violation::new(
                ViolationType::UnknownReference,
                &entry.teacher_id,
                format!("Entry at {slot} references unknown teacher '{}'", entry.teacher_id),
            )),
        }

        match locations.get(entry.location_id.as_str()) {
            Some(location) if !location_suitable(lesson, location) => {
                violations.push(Violation::new(
                    ViolationType::UnsuitableLocation,
                    &entry.location_id,
                    format!(
                        "Location '{}' is unsuitable for lesson '{}'",
                        entry.location_id, lesson.id
                    ),
                ))
            }
            Some(_) => {}
            None => violations.push(Violation::new(
                ViolationType::UnknownReference,
                &entry.location_id,
                format!("Entry at {slot} references unknown location '{}'", entry.location_id),
            )),
        }
    }

    for ((slot, teacher_id), count) in &teacher_slots {
        if *count > 1 {
            violations.push(Violation::new(
                ViolationType::TeacherDoubleBooked,
                *teacher_id,
                format!("Teacher '{teacher_id}' has {count} entries at {slot}"),
            ));
        }
    }

    for ((slot, group), lesson_ids) in &group_lessons {
        if lesson_ids.len() > 1 {
            violations.push(Violation::new(
                ViolationType::ClassGroupDoubleBooked,
                group.to_string(),
                format!("Class-group {group} attends {} lessons at {slot}", lesson_ids.len()),
            ));
        }
    }

    for lesson in &input.lessons {
        let id = lesson.id.as_str();
        let hours = lesson_hours.get(id);
        let placed = hours.map_or(0, BTreeMap::len);

        if placed != lesson.required_hours() as usize {
            violations.push(Violation::new(
                ViolationType::IncompleteLesson,
                id,
                format!(
                    "Lesson '{id}' has {placed} of {} hours placed",
                    lesson.required_hours()
                ),
            ));
        }

        let teacher_count = schedule.lesson_teacher_count(id);
        if teacher_count > config.max_teachers_per_lesson {
            violations.push(Violation::new(
                ViolationType::TooManyTeachers,
                id,
                format!(
                    "Lesson '{id}' uses {teacher_count} teachers (max {})",
                    config.max_teachers_per_lesson
                ),
            ));
        }

        let expected_per_hour = if lesson.requires_dual_resources { 2 } else { 1 };
        if let Some(hours) = hours {
            for (slot, count) in hours {
                if *count != expected_per_hour {
                    violations.push(Violation::new(
                        ViolationType::DualPairMismatch,
                        id,
                        format!(
                            "Lesson '{id}' has {count} entries at {slot}, expected {expected_per_hour}"
                        ),
                    ));
                }
            }
        }

        if lesson.can_split
            && lesson.weekly_hours > config.split_day_threshold
            && placed > 0
            && schedule.lesson_days(id).len() < 2
        {
            violations.push(Violation::new(
                ViolationType::SplitSameDay,
                id,
                format!("Both halves of lesson '{id}' are on the same day"),
            ));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RequiredAssignments, ScheduleEntry, Teacher, Weekday};

    fn sample_input() -> SchedulerInput {
        SchedulerInput::new()
            .with_lesson(
                Lesson::new("L1", ClassGroupKey::new("it", 10))
                    .with_weekly_hours(2)
                    .with_teacher("T1"),
            )
            .with_teacher(Teacher::new("T1"))
            .with_location(Location::classroom("R1"))
            .with_time_slots(TimeSlot::full_week(10))
    }

    fn mon(hour: u8) -> TimeSlot {
        TimeSlot::new(Weekday::Monday, hour)
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_input(), 10).is_ok());
    }

    #[test]
    fn test_duplicate_ids() {
        let input = sample_input()
            .with_teacher(Teacher::new("T1"))
            .with_location(Location::classroom("R1"))
            .with_lesson(Lesson::new("L1", ClassGroupKey::new("it", 11)).with_weekly_hours(1));

        let errors = validate_input(&input, 10).unwrap_err();
        let dups: Vec<_> = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::DuplicateId)
            .collect();
        assert_eq!(dups.len(), 3);
        assert!(dups.iter().any(|e| e.message.contains("teacher")));
        assert!(dups.iter().any(|e| e.message.contains("location")));
        assert!(dups.iter().any(|e| e.message.contains("lesson")));
    }

    #[test]
    fn test_unknown_teacher_reference() {
        let input = sample_input().with_lesson(
            Lesson::new("L2", ClassGroupKey::new("it", 11))
                .with_weekly_hours(1)
                .with_teacher("NOBODY"),
        );

        let errors = validate_input(&input, 10).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownTeacher && e.message.contains("NOBODY")));
    }

    #[test]
    fn test_required_assignment_references() {
        let input = sample_input()
            .with_required(RequiredAssignments::new().with("T9", "L1").with("T1", "L9"));

        let errors = validate_input(&input, 10).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownTeacher));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownLesson));
    }

    #[test]
    fn test_invalid_time_slots() {
        let input = sample_input()
            .with_time_slot(TimeSlot::new(Weekday::Friday, 11))
            .with_time_slot(TimeSlot::new(Weekday::Friday, 0))
            .with_time_slot(mon(1));

        let errors = validate_input(&input, 10).unwrap_err();
        let slot_errors = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidTimeSlot)
            .count();
        assert_eq!(slot_errors, 3);
    }

    #[test]
    fn test_empty_included_lesson() {
        let input = sample_input()
            .with_lesson(Lesson::new("L0", ClassGroupKey::new("it", 12)))
            .with_lesson(Lesson::new("Lx", ClassGroupKey::new("it", 12)).with_included(false));

        let errors = validate_input(&input, 10).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyLesson);
        assert!(errors[0].message.contains("L0"));
    }

    #[test]
    fn test_schedule_verification_accepts_valid_schedule() {
        let input = sample_input();
        let mut s = Schedule::new();
        let group = ClassGroupKey::new("it", 10);
        s.insert(ScheduleEntry::new("L1", "T1", "R1", mon(1), group.clone())).unwrap();
        s.insert(ScheduleEntry::new("L1", "T1", "R1", mon(2), group)).unwrap();

        assert!(validate_schedule(&s, &input, &SchedulerConfig::default()).is_empty());
    }

    #[test]
    fn test_schedule_verification_flags_problems() {
        let input = sample_input()
            .with_teacher(Teacher::new("T2").with_unavailable(mon(5)))
            .with_location(Location::lab("LAB", "chem"));
        let group = ClassGroupKey::new("it", 10);

        let mut s = Schedule::new();
        // Lab used by a lesson needing an ordinary room, teacher blocked, 1 of 2 hours.
        s.insert(ScheduleEntry::new("L1", "T2", "LAB", mon(5), group)).unwrap();

        let violations = validate_schedule(&s, &input, &SchedulerConfig::default());
        let types: Vec<_> = violations.iter().map(|v| v.violation_type.clone()).collect();
        assert!(types.contains(&ViolationType::UnsuitableLocation));
        assert!(types.contains(&ViolationType::TeacherUnavailable));
        assert!(types.contains(&ViolationType::IncompleteLesson));
    }

    #[test]
    fn test_schedule_verification_split_same_day() {
        let input = SchedulerInput::new()
            .with_lesson(
                Lesson::new("L6", ClassGroupKey::new("it", 9))
                    .with_weekly_hours(6)
                    .splittable()
                    .with_teacher("T1"),
            )
            .with_teacher(Teacher::new("T1"))
            .with_location(Location::classroom("R1"))
            .with_time_slots(TimeSlot::full_week(10));

        let mut s = Schedule::new();
        for hour in 1..=6 {
            s.insert(ScheduleEntry::new("L6", "T1", "R1", mon(hour), ClassGroupKey::new("it", 9)))
                .unwrap();
        }

        let violations = validate_schedule(&s, &input, &SchedulerConfig::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].violation_type, ViolationType::SplitSameDay);
    }

    #[test]
    fn test_schedule_verification_teacher_bound() {
        let input = SchedulerInput::new()
            .with_lesson(
                Lesson::new("L3", ClassGroupKey::new("it", 9))
                    .with_weekly_hours(3)
                    .splittable()
                    .with_teacher("T1")
                    .with_teacher("T2")
                    .with_teacher("T3"),
            )
            .with_teacher(Teacher::new("T1"))
            .with_teacher(Teacher::new("T2"))
            .with_teacher(Teacher::new("T3"))
            .with_location(Location::classroom("R1"))
            .with_time_slots(TimeSlot::full_week(10));

        let mut s = Schedule::new();
        for (hour, teacher) in [(1, "T1"), (3, "T2"), (5, "T3")] {
            s.insert(ScheduleEntry::new("L3", teacher, "R1", mon(hour), ClassGroupKey::new("it", 9)))
                .unwrap();
        }

        let violations = validate_schedule(&s, &input, &SchedulerConfig::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].violation_type, ViolationType::TooManyTeachers);
    }
}
