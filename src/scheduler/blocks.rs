//! Block planner.
//!
//! Decides which contiguous block sizes to try next for a lesson, given
//! how many of its weekly hours are still unplaced.
//!
//! # Rules
//!
//! - Unsplittable lessons: the whole remainder as one block.
//! - Splittable lessons over 3 hours: two halves, `ceil(w/2)` then
//!   `floor(w/2)`. Only these checkpoints are tried.
//! - Splittable lessons of 1..=3 hours: any of 3, 2, 1 that fits, largest first.
//!
//! Restricting block sizes to checkpoints keeps the branching factor of the
//! search bounded.

use crate::models::Lesson;

/// Weekly hours at or below which splittable lessons use free-form blocks.
pub const SMALL_LESSON_HOURS: u32 = 3;

/// Candidate block durations for the next block of `lesson`, in trial order.
///
/// Returns an empty vector when `remaining` is not a checkpoint of the
/// halving plan; the caller logs it and backtracks.
pub fn plan_blocks(lesson: &Lesson, remaining: u32) -> Vec<u32> {
    if remaining == 0 {
        return Vec::new();
    }
    if !lesson.can_split {
        return vec![remaining];
    }

    let weekly = lesson.weekly_hours;
    if weekly > SMALL_LESSON_HOURS {
        let (half1, half2) = lesson.halves();
        if remaining == weekly {
            vec![half1]
        } else if remaining == half2 {
            vec![half2]
        } else if remaining == half1 && half1 != half2 {
            vec![half1]
        } else {
            Vec::new()
        }
    } else {
        (1..=SMALL_LESSON_HOURS)
            .rev()
            .filter(|&d| d <= remaining)
            .collect()
    }
}

/// Whether a block of `duration` hours is the second half of a long split
/// lesson and therefore must go on a day the lesson does not use yet.
///
/// Only meaningful once the lesson already has entries; for the first
/// placement the rule is vacuous.
pub fn needs_new_day(lesson: &Lesson, duration: u32, split_day_threshold: u32) -> bool {
    lesson.can_split && lesson.weekly_hours > split_day_threshold && duration == lesson.halves().1
}
