//! Availability and suitability predicates.
//!
//! Pure queries against the current schedule; none of them mutate state.

use std::collections::HashSet;

use crate::models::{ClassGroupKey, Lesson, Location, Schedule, Teacher, TimeSlot};

/// Whether `teacher` can teach at `slot`: not blocked in their calendar and
/// not already teaching another entry.
#[inline]
pub fn teacher_available(teacher: &Teacher, slot: &TimeSlot, schedule: &Schedule) -> bool {
    teacher.is_free_at(slot) && !schedule.is_teacher_busy(slot, &teacher.id)
}

/// Whether `location_id` is unoccupied at `slot`.
#[inline]
pub fn location_available(location_id: &str, slot: &TimeSlot, schedule: &Schedule) -> bool {
    schedule.is_location_free(slot, location_id)
}

/// Whether `class_group` has no lesson at `slot`.
///
/// Entries carry the class-group of their lesson, resolved when the entry
/// was built, so no lesson lookup is needed here.
#[inline]
pub fn class_group_available(class_group: &ClassGroupKey, slot: &TimeSlot, schedule: &Schedule) -> bool {
    schedule.class_group_lesson_at(slot, class_group).is_none()
}

/// Whether `location` may host `lesson`.
///
/// Lessons without lab types need an ordinary classroom; lessons with lab
/// types need a lab of one of those types.
pub fn location_suitable(lesson: &Lesson, location: &Location) -> bool {
    match &location.lab_type_id {
        None => lesson.eligible_lab_type_ids.is_empty(),
        Some(lab_type) => lesson.eligible_lab_type_ids.iter().any(|t| t == lab_type),
    }
}

/// Whether a block of `duration` hours starting at `start` stays within the
/// day and covers only usable slots.
pub fn block_fits_day(
    start: &TimeSlot,
    duration: u32,
    hours_per_day: u8,
    usable: &HashSet<TimeSlot>,
) -> bool {
    if duration == 0 || start.hour == 0 {
        return false;
    }
    let last = u32::from(start.hour) + duration - 1;
    if last > u32::from(hours_per_day) {
        return false;
    }
    start.block(duration).all(|slot| usable.contains(&slot))
}
