//! Search context.
//!
//! All mutable state of one scheduling run: the schedule being built, the
//! remaining-hours counter, the RNG, the trace and the counters. The driver
//! owns it and hands it by `&mut` to every assigner; nothing outlives the run.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;
use std::time::Instant;

use super::availability::{
    block_fits_day, class_group_available, location_available, teacher_available,
};
use super::blocks::needs_new_day;
use super::index::ProblemIndex;
use super::SearchStats;
use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::models::{Lesson, Location, Schedule, ScheduleEntry, Teacher, TimeSlot};
use crate::trace::{trace_changes, trace_checks, SearchTrace};

/// A committed block, kept by the caller to undo it exactly.
#[derive(Debug)]
#[must_use = "a placement must be rolled back if the search below it fails"]
pub struct Placement<'a> {
    lesson_id: &'a str,
    duration: u32,
    keys: Vec<(TimeSlot, String)>,
}

/// Mutable state of one run.
pub struct SearchContext<'a> {
    pub(crate) index: &'a ProblemIndex<'a>,
    pub(crate) config: &'a SchedulerConfig,
    pub(crate) schedule: Schedule,
    pub(crate) remaining: HashMap<String, u32>,
    pub(crate) trace: SearchTrace,
    pub(crate) stats: SearchStats,
    rng: StdRng,
    started: Instant,
}

impl<'a> SearchContext<'a> {
    /// Creates the initial state: empty schedule, full remaining hours.
    pub fn new(
        index: &'a ProblemIndex<'a>,
        config: &'a SchedulerConfig,
        seed: u64,
        trace: SearchTrace,
    ) -> Self {
        Self {
            index,
            config,
            schedule: Schedule::new(),
            remaining: index.initial_remaining(),
            trace,
            stats: SearchStats::default(),
            rng: StdRng::seed_from_u64(seed),
            started: Instant::now(),
        }
    }

    /// Hours of `lesson_id` not yet placed.
    #[inline]
    pub fn remaining(&self, lesson_id: &str) -> u32 {
        self.remaining.get(lesson_id).copied().unwrap_or(0)
    }

    /// Enforces the configured limits, then counts one slot visit.
    ///
    /// `stats.steps` only counts visits that were allowed to run.
    pub fn tick(&mut self) -> Result<(), SchedulerError> {
        if let Some(limit) = self.config.max_steps {
            if self.stats.steps >= limit {
                return Err(SchedulerError::StepLimitReached { limit });
            }
        }
        if let Some(limit) = self.config.time_limit {
            if self.started.elapsed() >= limit {
                return Err(SchedulerError::TimeLimitReached { limit });
            }
        }
        self.stats.steps += 1;
        Ok(())
    }

    /// Ends the run, returning the schedule, remaining hours, trace and counters.
    pub fn finish(self) -> (Schedule, HashMap<String, u32>, Vec<String>, SearchStats) {
        let stats = SearchStats {
            elapsed: self.started.elapsed(),
            ..self.stats
        };
        (self.schedule, self.remaining, self.trace.into_lines(), stats)
    }

    /// A copy of `items`, shuffled when candidate shuffling is on.
    pub fn shuffled<T: Copy>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        if self.config.shuffle_candidates {
            out.shuffle(&mut self.rng);
        }
        out
    }

    /// Slot enumeration order for one lesson visit.
    pub fn slot_order(&mut self) -> Vec<TimeSlot> {
        let mut slots = self.index.slots().to_vec();
        if self.config.shuffle_slots {
            slots.shuffle(&mut self.rng);
        }
        slots
    }

    /// Checks the parts of a block that do not depend on the chosen
    /// resources: it fits the day, the class-group is free for every hour,
    /// and the different-day rule for second halves holds.
    pub fn block_open(&mut self, lesson: &Lesson, start: TimeSlot, duration: u32) -> bool {
        if !block_fits_day(&start, duration, self.config.hours_per_day, self.index.usable()) {
            trace_checks!(
                self.trace,
                "lesson '{}': {duration}h block at {start} does not fit the day",
                lesson.id
            );
            return false;
        }

        if let Some(busy) = start
            .block(duration)
            .find(|slot| !class_group_available(&lesson.class_group, slot, &self.schedule))
        {
            trace_checks!(
                self.trace,
                "lesson '{}': class-group {} busy at {busy}",
                lesson.id,
                lesson.class_group
            );
            return false;
        }

        if needs_new_day(lesson, duration, self.config.split_day_threshold)
            && self.schedule.lesson_uses_day(&lesson.id, start.day)
        {
            trace_checks!(
                self.trace,
                "lesson '{}': second half may not share {} with the first",
                lesson.id,
                start.day
            );
            return false;
        }
        true
    }

    /// Whether `teacher` is free for every hour of the block.
    pub fn teacher_free_for(
        &mut self,
        lesson: &Lesson,
        teacher: &Teacher,
        start: TimeSlot,
        duration: u32,
    ) -> bool {
        match start
            .block(duration)
            .find(|slot| !teacher_available(teacher, slot, &self.schedule))
        {
            Some(busy) => {
                trace_checks!(
                    self.trace,
                    "lesson '{}': teacher '{}' unavailable at {busy}",
                    lesson.id,
                    teacher.id
                );
                false
            }
            None => true,
        }
    }

    /// Whether `location` is free for every hour of the block.
    pub fn location_free_for(
        &mut self,
        lesson: &Lesson,
        location: &Location,
        start: TimeSlot,
        duration: u32,
    ) -> bool {
        match start
            .block(duration)
            .find(|slot| !location_available(&location.id, slot, &self.schedule))
        {
            Some(busy) => {
                trace_checks!(
                    self.trace,
                    "lesson '{}': location '{}' occupied at {busy}",
                    lesson.id,
                    location.id
                );
                false
            }
            None => true,
        }
    }

    /// Whether adding `teachers` keeps the lesson within its distinct-teacher bound.
    pub fn teachers_fit_lesson(&mut self, lesson: &Lesson, teachers: &[&Teacher]) -> bool {
        let used = self.schedule.lesson_teacher_count(&lesson.id);
        let added = teachers
            .iter()
            .filter(|t| !self.schedule.lesson_uses_teacher(&lesson.id, &t.id))
            .count();
        if used + added > self.config.max_teachers_per_lesson {
            trace_checks!(
                self.trace,
                "lesson '{}': adding {} would exceed {} teachers",
                lesson.id,
                teachers.iter().map(|t| t.id.as_str()).collect::<Vec<_>>().join("+"),
                self.config.max_teachers_per_lesson
            );
            return false;
        }
        true
    }

    /// Commits a block: inserts its entries and decrements remaining hours.
    ///
    /// On a conflict the entries inserted so far are removed again before
    /// the error is returned.
    pub fn commit(
        &mut self,
        lesson: &'a Lesson,
        duration: u32,
        entries: Vec<ScheduleEntry>,
    ) -> Result<Placement<'a>, SchedulerError> {
        let mut keys: Vec<(TimeSlot, String)> = Vec::with_capacity(entries.len());
        for entry in entries {
            let key = (entry.time_slot, entry.location_id.clone());
            if let Err(conflict) = self.schedule.insert(entry) {
                for (slot, location_id) in &keys {
                    self.schedule.remove(slot, location_id);
                }
                return Err(conflict.into());
            }
            keys.push(key);
        }

        let remaining = self.remaining.entry(lesson.id.clone()).or_insert(0);
        *remaining = remaining.saturating_sub(duration);
        let left = *remaining;
        self.stats.commits += 1;

        trace_changes!(
            self.trace,
            "commit lesson '{}': {duration}h at {} [{}], {left}h left",
            lesson.id,
            keys.first().map(|(slot, _)| slot.to_string()).unwrap_or_default(),
            describe_keys(&self.schedule, &keys)
        );

        Ok(Placement {
            lesson_id: &lesson.id,
            duration,
            keys,
        })
    }

    /// Undoes a placement exactly.
    pub fn rollback(&mut self, placement: Placement<'a>) {
        for (slot, location_id) in &placement.keys {
            self.schedule.remove(slot, location_id);
        }
        *self
            .remaining
            .entry(placement.lesson_id.to_string())
            .or_insert(0) += placement.duration;
        self.stats.rollbacks += 1;

        trace_changes!(
            self.trace,
            "rollback lesson '{}': {}h returned, {}h left",
            placement.lesson_id,
            placement.duration,
            self.remaining(placement.lesson_id)
        );
    }
}

fn describe_keys(schedule: &Schedule, keys: &[(TimeSlot, String)]) -> String {
    let mut pairs: Vec<String> = keys
        .iter()
        .filter_map(|(slot, location_id)| schedule.get(slot, location_id))
        .map(|e| format!("{}@{}", e.teacher_id, e.location_id))
        .collect();
    pairs.sort_unstable();
    pairs.dedup();
    pairs.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassGroupKey, Weekday};
    use crate::scheduler::SchedulerInput;
    use crate::trace::TraceLevel;

    fn mon(hour: u8) -> TimeSlot {
        TimeSlot::new(Weekday::Monday, hour)
    }

    fn input() -> SchedulerInput {
        SchedulerInput::full_week(10)
            .with_lesson(
                Lesson::new("L1", ClassGroupKey::new("it", 10))
                    .with_weekly_hours(6)
                    .splittable()
                    .with_teacher("T1"),
            )
            .with_teacher(Teacher::new("T1").with_unavailable(mon(4)))
            .with_teacher(Teacher::new("T2"))
            .with_teacher(Teacher::new("T3"))
            .with_location(Location::classroom("R1"))
    }

    fn entries(lesson: &Lesson, teacher: &str, start: TimeSlot, duration: u32) -> Vec<ScheduleEntry> {
        start
            .block(duration)
            .map(|slot| ScheduleEntry::new(&lesson.id, teacher, "R1", slot, lesson.class_group.clone()))
            .collect()
    }

    #[test]
    fn test_commit_and_rollback_restore_state() {
        let input = input();
        let config = SchedulerConfig::default();
        let index = ProblemIndex::build(&input, &config);
        let mut ctx = SearchContext::new(&index, &config, 1, SearchTrace::new(TraceLevel::Changes));
        let lesson = index.lesson("L1").unwrap();

        let schedule_before = ctx.schedule.clone();
        let remaining_before = ctx.remaining.clone();

        let placement = ctx.commit(lesson, 3, entries(lesson, "T1", mon(1), 3)).unwrap();
        assert_eq!(ctx.remaining("L1"), 3);
        assert_eq!(ctx.schedule.len(), 3);

        ctx.rollback(placement);
        assert_eq!(ctx.schedule, schedule_before);
        assert_eq!(ctx.remaining, remaining_before);
        assert_eq!(ctx.stats.commits, 1);
        assert_eq!(ctx.stats.rollbacks, 1);
        assert!(ctx.trace.lines()[0].starts_with("commit lesson 'L1'"));
        assert!(ctx.trace.lines()[1].starts_with("rollback lesson 'L1'"));
    }

    #[test]
    fn test_commit_conflict_leaves_no_partial_block() {
        let input = input();
        let config = SchedulerConfig::default();
        let index = ProblemIndex::build(&input, &config);
        let mut ctx = SearchContext::new(&index, &config, 1, SearchTrace::new(TraceLevel::Silent));
        let lesson = index.lesson("L1").unwrap();

        let first = ctx.commit(lesson, 1, entries(lesson, "T1", mon(3), 1)).unwrap();
        let snapshot = ctx.schedule.clone();

        // Block Mon#1..3 collides with the entry at Mon#3.
        let err = ctx
            .commit(lesson, 3, entries(lesson, "T2", mon(1), 3))
            .unwrap_err();
        assert!(matches!(err, SchedulerError::Conflict(_)));
        assert_eq!(ctx.schedule, snapshot);
        assert_eq!(ctx.remaining("L1"), 5);
        ctx.rollback(first);
    }

    #[test]
    fn test_block_checks() {
        let input = input();
        let config = SchedulerConfig::default();
        let index = ProblemIndex::build(&input, &config);
        let mut ctx = SearchContext::new(&index, &config, 1, SearchTrace::new(TraceLevel::Checks));
        let lesson = index.lesson("L1").unwrap();
        let t1 = index.teacher("T1").unwrap();
        let r1 = index.location("R1").unwrap();

        assert!(ctx.block_open(lesson, mon(1), 3));
        assert!(!ctx.block_open(lesson, mon(9), 3));
        assert!(ctx.teacher_free_for(lesson, t1, mon(1), 3));
        assert!(!ctx.teacher_free_for(lesson, t1, mon(3), 3));

        let placement = ctx.commit(lesson, 3, entries(lesson, "T1", mon(1), 3)).unwrap();
        assert!(!ctx.location_free_for(lesson, r1, mon(3), 2));
        // Second half of a 6h lesson may not use Monday again.
        assert!(!ctx.block_open(lesson, mon(5), 3));
        assert!(ctx.block_open(lesson, TimeSlot::new(Weekday::Tuesday, 5), 3));
        ctx.rollback(placement);

        assert!(ctx.trace.lines().iter().any(|l| l.contains("does not fit the day")));
        assert!(ctx.trace.lines().iter().any(|l| l.contains("teacher 'T1' unavailable at Mon#4")));
    }

    #[test]
    fn test_teacher_bound() {
        let input = input();
        let config = SchedulerConfig::default();
        let index = ProblemIndex::build(&input, &config);
        let mut ctx = SearchContext::new(&index, &config, 1, SearchTrace::new(TraceLevel::Silent));
        let lesson = index.lesson("L1").unwrap();
        let (t1, t2, t3) = (
            index.teacher("T1").unwrap(),
            index.teacher("T2").unwrap(),
            index.teacher("T3").unwrap(),
        );

        let a = ctx.commit(lesson, 1, entries(lesson, "T1", mon(1), 1)).unwrap();
        let b = ctx.commit(lesson, 1, entries(lesson, "T2", mon(2), 1)).unwrap();
        assert!(ctx.teachers_fit_lesson(lesson, &[t1]));
        assert!(ctx.teachers_fit_lesson(lesson, &[t2]));
        assert!(!ctx.teachers_fit_lesson(lesson, &[t3]));
        ctx.rollback(b);
        assert!(ctx.teachers_fit_lesson(lesson, &[t3]));
        assert!(!ctx.teachers_fit_lesson(lesson, &[t2, t3]));
        ctx.rollback(a);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let input = input();
        let config = SchedulerConfig::default().with_shuffle_slots(true);
        let index = ProblemIndex::build(&input, &config);
        let mut a = SearchContext::new(&index, &config, 99, SearchTrace::new(TraceLevel::Silent));
        let mut b = SearchContext::new(&index, &config, 99, SearchTrace::new(TraceLevel::Silent));

        assert_eq!(a.slot_order(), b.slot_order());
        let items = [1, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(a.shuffled(&items), b.shuffled(&items));

        let mut sorted = a.slot_order();
        sorted.sort();
        assert_eq!(sorted, index.slots());
    }

    #[test]
    fn test_step_limit() {
        let input = input();
        let config = SchedulerConfig::default().with_max_steps(2);
        let index = ProblemIndex::build(&input, &config);
        let mut ctx = SearchContext::new(&index, &config, 1, SearchTrace::new(TraceLevel::Silent));

        assert!(ctx.tick().is_ok());
        assert!(ctx.tick().is_ok());
        assert!(matches!(
            ctx.tick(),
            Err(SchedulerError::StepLimitReached { limit: 2 })
        ));
        assert_eq!(ctx.stats.steps, 2);
    }

    #[test]
    fn test_time_limit() {
        let input = input();
        let config = SchedulerConfig::default().with_time_limit(std::time::Duration::ZERO);
        let index = ProblemIndex::build(&input, &config);
        let mut ctx = SearchContext::new(&index, &config, 1, SearchTrace::new(TraceLevel::Silent));

        assert!(matches!(
            ctx.tick(),
            Err(SchedulerError::TimeLimitReached { .. })
        ));
        assert_eq!(ctx.stats.steps, 0);
    }
}
