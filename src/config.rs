//! Configuration types for the timetable search.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::DEFAULT_HOURS_PER_DAY;
use crate::trace::TraceLevel;

/// Weekly hours above which the two halves of a split lesson must fall on
/// different days.
pub const DEFAULT_SPLIT_DAY_THRESHOLD: u32 = 5;

/// Maximum number of distinct teachers one lesson may be spread across.
pub const DEFAULT_MAX_TEACHERS_PER_LESSON: usize = 2;

/// Configuration for a scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Teaching hours per day; blocks may not run past this hour.
    pub hours_per_day: u8,
    /// Lessons with more weekly hours than this place their halves on different days.
    pub split_day_threshold: u32,
    /// Upper bound on distinct teachers per lesson.
    pub max_teachers_per_lesson: usize,
    /// RNG seed. `None` draws one from the OS; the seed used is reported back.
    pub seed: Option<u64>,
    /// Shuffle candidate teachers and locations before each attempt.
    pub shuffle_candidates: bool,
    /// Shuffle the slot enumeration order per lesson visit.
    pub shuffle_slots: bool,
    /// Abort after this many slot visits.
    pub max_steps: Option<u64>,
    /// Abort after this much wall-clock time.
    pub time_limit: Option<Duration>,
    /// How much of the search is recorded in the result trace.
    ///
    /// `Checks` records one line per failed availability check, so the trace
    /// grows with the search itself. Bound it with `max_steps` or
    /// `time_limit`, or use `Changes` for long runs.
    pub trace_level: TraceLevel,
    /// Run input validation before searching.
    pub validate_input: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            split_day_threshold: DEFAULT_SPLIT_DAY_THRESHOLD,
            max_teachers_per_lesson: DEFAULT_MAX_TEACHERS_PER_LESSON,
            seed: None,
            shuffle_candidates: true,
            shuffle_slots: false,
            max_steps: None,
            time_limit: None,
            trace_level: TraceLevel::Checks,
            validate_input: true,
        }
    }
}

impl SchedulerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hours per day.
    pub fn with_hours_per_day(mut self, hours: u8) -> Self {
        self.hours_per_day = hours;
        self
    }

    /// Sets the different-day threshold for split lessons.
    pub fn with_split_day_threshold(mut self, threshold: u32) -> Self {
        self.split_day_threshold = threshold;
        self
    }

    /// Sets the per-lesson teacher bound.
    pub fn with_max_teachers_per_lesson(mut self, max: usize) -> Self {
        self.max_teachers_per_lesson = max;
        self
    }

    /// Pins the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables candidate shuffling.
    pub fn with_shuffle_candidates(mut self, shuffle: bool) -> Self {
        self.shuffle_candidates = shuffle;
        self
    }

    /// Enables or disables slot shuffling.
    pub fn with_shuffle_slots(mut self, shuffle: bool) -> Self {
        self.shuffle_slots = shuffle;
        self
    }

    /// Sets the step limit.
    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Sets the wall-clock limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets the trace level.
    pub fn with_trace_level(mut self, level: TraceLevel) -> Self {
        self.trace_level = level;
        self
    }

    /// Enables or disables input validation.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_input = validate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = SchedulerConfig::default();
        assert_eq!(c.hours_per_day, 10);
        assert_eq!(c.split_day_threshold, 5);
        assert_eq!(c.max_teachers_per_lesson, 2);
        assert!(c.seed.is_none());
        assert!(c.shuffle_candidates);
        assert!(!c.shuffle_slots);
        assert_eq!(c.trace_level, TraceLevel::Checks);
        assert!(c.validate_input);
    }

    #[test]
    fn test_builder() {
        let c = SchedulerConfig::new()
            .with_hours_per_day(8)
            .with_split_day_threshold(4)
            .with_seed(7)
            .with_max_steps(1_000)
            .with_time_limit(Duration::from_secs(2))
            .with_trace_level(TraceLevel::Silent)
            .with_validation(false);

        assert_eq!(c.hours_per_day, 8);
        assert_eq!(c.split_day_threshold, 4);
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.max_steps, Some(1_000));
        assert_eq!(c.time_limit, Some(Duration::from_secs(2)));
        assert_eq!(c.trace_level, TraceLevel::Silent);
        assert!(!c.validate_input);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let c: SchedulerConfig =
            serde_json::from_str(r#"{"hours_per_day": 8, "seed": 42}"#).unwrap();
        assert_eq!(c.hours_per_day, 8);
        assert_eq!(c.seed, Some(42));
        assert_eq!(c.split_day_threshold, DEFAULT_SPLIT_DAY_THRESHOLD);
    }
}
