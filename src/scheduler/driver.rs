//! Backtracking timetable scheduler.
//!
//! # Algorithm
//!
//! 1. Validate the input and build the problem index.
//! 2. Visit lessons longest first. For the current lesson, plan the next
//!    block sizes from its remaining hours.
//! 3. For every start slot and block size, hand the block to the single- or
//!    dual-resource assigner. The assigner tries each resource combination,
//!    commits it, recurses, and rolls it back when the recursion fails.
//! 4. After the last lesson, verify the schedule against every hard rule.
//!
//! A lesson stays current until its remaining hours reach zero, so the
//! halves of a split lesson are placed by consecutive recursion levels.
//!
//! # Complexity
//! Exponential in the worst case: O((s * b * r)^k) where s = slots,
//! b = block sizes, r = resource combinations and k = blocks placed.
//! Optional step and time limits bound a run.
//!
//! # Reference
//! Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach",
//! Ch. 6: Constraint Satisfaction Problems

use log::{debug, info, warn};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use super::blocks::plan_blocks;
use super::context::SearchContext;
use super::dual::assign_dual;
use super::index::ProblemIndex;
use super::single::assign_single;
use super::{SchedulerInput, SchedulerResult, SearchStats};
use crate::config::SchedulerConfig;
use crate::error::{FailureKind, SchedulerError};
use crate::models::{Lesson, Schedule, ScheduleEntry};
use crate::trace::{trace_changes, SearchTrace};
use crate::validation::{validate_input, validate_schedule};

/// Backtracking timetable scheduler.
///
/// # Example
///
/// ```
/// use u_timetable::models::{ClassGroupKey, Lesson, Location, Teacher};
/// use u_timetable::scheduler::{Scheduler, SchedulerInput};
/// use u_timetable::SchedulerConfig;
///
/// let input = SchedulerInput::full_week(10)
///     .with_lesson(
///         Lesson::new("math", ClassGroupKey::new("it", 10))
///             .with_weekly_hours(2)
///             .with_teacher("T1"),
///     )
///     .with_teacher(Teacher::new("T1"))
///     .with_location(Location::classroom("R1"));
///
/// let scheduler = Scheduler::with_config(SchedulerConfig::default().with_seed(7));
/// let result = scheduler.schedule(&input);
/// assert!(result.success);
/// assert_eq!(result.schedule.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

/// Raw outcome of one run before it is turned into a result.
struct RunOutcome {
    verdict: Result<(), SchedulerError>,
    schedule: Schedule,
    remaining: HashMap<String, u32>,
    logs: Vec<String>,
    stats: SearchStats,
}

impl Scheduler {
    /// Creates a scheduler with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler with `config`.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Runs one search.
    ///
    /// Never panics: a fault inside the search is reported as an
    /// `Internal` failure.
    pub fn schedule(&self, input: &SchedulerInput) -> SchedulerResult {
        let seed = self.config.seed.unwrap_or_else(rand::random::<u64>);
        self.schedule_with_seed(input, seed)
    }

    /// Runs up to `attempts` searches with seeds `seed, seed + 1, ...` and
    /// returns the first success, or the last failure.
    ///
    /// Failures that no seed can fix (invalid input, structural
    /// infeasibility) end the loop early.
    pub fn schedule_attempts(&self, input: &SchedulerInput, attempts: usize) -> SchedulerResult {
        let base = self.config.seed.unwrap_or_else(rand::random::<u64>);
        let mut result = self.schedule_with_seed(input, base);

        for attempt in 1..attempts.max(1) {
            if result.success || !retryable(result.failure) {
                break;
            }
            info!(
                "attempt {attempt} of {attempts} failed ({}), retrying",
                result.error.as_deref().unwrap_or("unknown error")
            );
            result = self.schedule_with_seed(input, base.wrapping_add(attempt as u64));
        }
        result
    }

    fn schedule_with_seed(&self, input: &SchedulerInput, seed: u64) -> SchedulerResult {
        info!(
            "scheduling {} lesson(s), {} hour(s), seed {seed}",
            input.lessons.len(),
            input.required_hours()
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(input, seed)))
            .unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                warn!("search aborted by a fault: {message}");
                RunOutcome::aborted(input, SchedulerError::Internal(message))
            });

        let result = outcome.into_result(seed);
        match &result.error {
            None => info!(
                "timetable complete: {} entries, {} steps, {} rollbacks in {:?}",
                result.schedule.len(),
                result.stats.steps,
                result.stats.rollbacks,
                result.stats.elapsed
            ),
            Some(error) => warn!("scheduling failed: {error}"),
        }
        result
    }

    fn run(&self, input: &SchedulerInput, seed: u64) -> RunOutcome {
        let started = Instant::now();
        let mut trace = SearchTrace::new(self.config.trace_level);

        if self.config.validate_input {
            if let Err(errors) = validate_input(input, self.config.hours_per_day) {
                trace_changes!(trace, "input rejected with {} problem(s)", errors.len());
                let mut outcome =
                    RunOutcome::aborted(input, SchedulerError::InvalidInput(errors));
                outcome.logs = trace.into_lines();
                outcome.stats.elapsed = started.elapsed();
                return outcome;
            }
        }

        let index = ProblemIndex::build(input, &self.config);
        let mut infeasible = Vec::new();
        for (lesson_id, reason) in index.infeasible_lessons() {
            warn!("lesson '{lesson_id}' cannot be placed: {reason}");
            trace_changes!(trace, "skipping lesson '{lesson_id}': {reason}");
            infeasible.push(reason.to_string());
        }

        let mut ctx = SearchContext::new(&index, &self.config, seed, trace);
        let verdict = match solve(&mut ctx, 0) {
            Ok(true) => self.verify(&ctx, input, &infeasible),
            Ok(false) if !infeasible.is_empty() => {
                Err(SchedulerError::StructurallyInfeasible(infeasible))
            }
            Ok(false) => Err(SchedulerError::SearchExhausted {
                steps: ctx.stats.steps,
            }),
            Err(error) => Err(error),
        };

        let (schedule, remaining, logs, stats) = ctx.finish();
        RunOutcome {
            verdict,
            schedule,
            remaining,
            logs,
            stats,
        }
    }

    /// Final consistency pass over a finished search.
    fn verify(
        &self,
        ctx: &SearchContext<'_>,
        input: &SchedulerInput,
        infeasible: &[String],
    ) -> Result<(), SchedulerError> {
        if !infeasible.is_empty() {
            return Err(SchedulerError::StructurallyInfeasible(infeasible.to_vec()));
        }

        let short: Vec<String> = ctx
            .index
            .order()
            .iter()
            .filter_map(|lesson| {
                let left = ctx.remaining(&lesson.id);
                (left > 0).then(|| {
                    format!(
                        "lesson '{}' has {left} of {} hour(s) unplaced",
                        lesson.id,
                        lesson.required_hours()
                    )
                })
            })
            .collect();
        if !short.is_empty() {
            return Err(SchedulerError::Incomplete(short));
        }

        let violations = validate_schedule(&ctx.schedule, input, &self.config);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchedulerError::Incomplete(
                violations.into_iter().map(|v| v.message).collect(),
            ))
        }
    }
}

impl RunOutcome {
    fn aborted(input: &SchedulerInput, error: SchedulerError) -> Self {
        Self {
            verdict: Err(error),
            schedule: Schedule::new(),
            remaining: input
                .lessons
                .iter()
                .map(|l| (l.id.clone(), l.required_hours()))
                .collect(),
            logs: Vec::new(),
            stats: SearchStats::default(),
        }
    }

    fn into_result(self, seed: u64) -> SchedulerResult {
        let (success, schedule, error, failure) = match self.verdict {
            Ok(()) => (true, self.schedule, None, None),
            Err(error) => (
                false,
                Schedule::new(),
                Some(error.to_string()),
                Some(error.kind()),
            ),
        };
        SchedulerResult {
            success,
            schedule,
            logs: self.logs,
            error,
            failure,
            remaining_hours: self.remaining,
            stats: self.stats,
            seed,
        }
    }
}

/// Recursive driver: places the lesson at `lesson_index` in visiting order.
///
/// Returns `Ok(true)` when every later lesson was placed too, `Ok(false)`
/// when the caller must backtrack, and `Err` when a limit or fault aborts
/// the whole search.
pub(super) fn solve<'a>(
    ctx: &mut SearchContext<'a>,
    lesson_index: usize,
) -> Result<bool, SchedulerError> {
    let index = ctx.index;
    let Some(&lesson) = index.order().get(lesson_index) else {
        trace_changes!(ctx.trace, "all lessons visited");
        return Ok(true);
    };

    let remaining = ctx.remaining(&lesson.id);
    if remaining == 0 || !lesson.include_in_schedule {
        return solve(ctx, lesson_index + 1);
    }
    if index
        .candidates(&lesson.id)
        .map_or(true, |c| c.infeasible.is_some())
    {
        return solve(ctx, lesson_index + 1);
    }

    let durations = plan_blocks(lesson, remaining);
    if durations.is_empty() {
        trace_changes!(
            ctx.trace,
            "lesson '{}': no block plan for {remaining} remaining hour(s)",
            lesson.id
        );
        return Ok(false);
    }
    trace_changes!(
        ctx.trace,
        "lesson '{}': {remaining}h left, trying blocks {durations:?}",
        lesson.id
    );

    for start in ctx.slot_order() {
        ctx.tick()?;
        for &duration in &durations {
            let placed = if lesson.requires_dual_resources {
                assign_dual(ctx, lesson_index, lesson, start, duration)?
            } else {
                assign_single(ctx, lesson_index, lesson, start, duration)?
            };
            if placed {
                return Ok(true);
            }
        }
    }

    debug!(
        "lesson '{}' exhausted every slot with {remaining}h left",
        lesson.id
    );
    trace_changes!(
        ctx.trace,
        "lesson '{}': no slot works for {remaining}h, backtracking",
        lesson.id
    );
    Ok(false)
}

/// Commits `entries`, continues the search, and rolls back if it fails.
pub(super) fn place_and_descend<'a>(
    ctx: &mut SearchContext<'a>,
    lesson_index: usize,
    lesson: &'a Lesson,
    duration: u32,
    entries: Vec<ScheduleEntry>,
) -> Result<bool, SchedulerError> {
    let placement = ctx.commit(lesson, duration, entries)?;
    let next = if ctx.remaining(&lesson.id) == 0 {
        lesson_index + 1
    } else {
        lesson_index
    };

    if solve(ctx, next)? {
        return Ok(true);
    }
    ctx.rollback(placement);
    Ok(false)
}

fn retryable(failure: Option<FailureKind>) -> bool {
    !matches!(
        failure,
        Some(FailureKind::InvalidInput | FailureKind::StructurallyInfeasible)
    )
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
