//! Dual-resource assigner: two teachers in two locations per hour.
//!
//! Both pairs are unordered, so `(A, B)` and `(B, A)` are tried only once.
//! Each hour of a committed block holds two entries; the lesson's remaining
//! hours drop by the block duration once.

use super::context::SearchContext;
use super::driver::place_and_descend;
use crate::error::SchedulerError;
use crate::models::{Lesson, Location, ScheduleEntry, Teacher, TimeSlot};
use crate::trace::trace_checks;

/// Tries to place a `duration`-hour dual block of `lesson` starting at
/// `start` with every teacher pair and location pair.
pub(super) fn assign_dual<'a>(
    ctx: &mut SearchContext<'a>,
    lesson_index: usize,
    lesson: &'a Lesson,
    start: TimeSlot,
    duration: u32,
) -> Result<bool, SchedulerError> {
    let index = ctx.index;
    let Some(candidates) = index.candidates(&lesson.id) else {
        return Ok(false);
    };
    if !ctx.block_open(lesson, start, duration) {
        return Ok(false);
    }

    let pool = ctx.shuffled(&candidates.teachers);
    let teacher_pairs: Vec<(&Teacher, &Teacher)> = match candidates.anchor {
        Some(anchor) => pool.iter().map(|&other| (anchor, other)).collect(),
        None => unordered_pairs(&pool),
    };
    let locations = ctx.shuffled(&candidates.locations);
    let location_pairs: Vec<(&Location, &Location)> = unordered_pairs(&locations);

    for (first, second) in teacher_pairs {
        if !ctx.teachers_fit_lesson(lesson, &[first, second])
            || !ctx.teacher_free_for(lesson, first, start, duration)
            || !ctx.teacher_free_for(lesson, second, start, duration)
        {
            continue;
        }

        for &(room_a, room_b) in &location_pairs {
            if !ctx.location_free_for(lesson, room_a, start, duration)
                || !ctx.location_free_for(lesson, room_b, start, duration)
            {
                continue;
            }

            let entries: Vec<ScheduleEntry> = start
                .block(duration)
                .flat_map(|slot| {
                    [(first, room_a), (second, room_b)].map(|(teacher, location)| {
                        ScheduleEntry::new(
                            &lesson.id,
                            &teacher.id,
                            &location.id,
                            slot,
                            lesson.class_group.clone(),
                        )
                    })
                })
                .collect();

            if place_and_descend(ctx, lesson_index, lesson, duration, entries)? {
                return Ok(true);
            }
        }
    }

    trace_checks!(
        ctx.trace,
        "lesson '{}': no teacher pair/location pair fits {duration}h at {start}",
        lesson.id
    );
    Ok(false)
}

/// Every unordered pair of distinct positions, in order of the slice.
fn unordered_pairs<T: Copy>(items: &[T]) -> Vec<(T, T)> {
    let mut pairs = Vec::with_capacity(items.len() * items.len().saturating_sub(1) / 2);
    for (i, &a) in items.iter().enumerate() {
        for &b in &items[i + 1..] {
            pairs.push((a, b));
        }
    }
    pairs
}
