//! Single-resource assigner: one teacher and one location per hour.

use super::context::SearchContext;
use super::driver::place_and_descend;
use crate::error::SchedulerError;
use crate::models::{Lesson, ScheduleEntry, TimeSlot};
use crate::trace::trace_checks;

/// Tries to place a `duration`-hour block of `lesson` starting at `start`
/// with every candidate teacher and location.
///
/// Returns `Ok(true)` once the search below one of the placements completes;
/// `Ok(false)` after every combination failed and was rolled back.
pub(super) fn assign_single<'a>(
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

    let teachers = ctx.shuffled(&candidates.teachers);
    let locations = ctx.shuffled(&candidates.locations);

    for teacher in teachers {
        if !ctx.teachers_fit_lesson(lesson, &[teacher])
            || !ctx.teacher_free_for(lesson, teacher, start, duration)
        {
            continue;
        }

        for &location in &locations {
            if !ctx.location_free_for(lesson, location, start, duration) {
                continue;
            }

            let entries: Vec<ScheduleEntry> = start
                .block(duration)
                .map(|slot| {
                    ScheduleEntry::new(
                        &lesson.id,
                        &teacher.id,
                        &location.id,
                        slot,
                        lesson.class_group.clone(),
                    )
                })
                .collect();

            if place_and_descend(ctx, lesson_index, lesson, duration, entries)? {
                return Ok(true);
            }
        }
    }

    trace_checks!(
        ctx.trace,
        "lesson '{}': no teacher/location fits {duration}h at {start}",
        lesson.id
    );
    Ok(false)
}
