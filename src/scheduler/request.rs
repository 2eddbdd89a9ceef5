//! Scheduler input and output containers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::FailureKind;
use crate::models::{Lesson, Location, RequiredAssignments, Schedule, Teacher, TimeSlot};

/// Complete problem description for one scheduling run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerInput {
    /// Lessons to place.
    pub lessons: Vec<Lesson>,
    /// Available teachers.
    pub teachers: Vec<Teacher>,
    /// Available rooms and labs.
    pub locations: Vec<Location>,
    /// Usable slots of the week.
    pub time_slots: Vec<TimeSlot>,
    /// Required teacher hints.
    pub required: RequiredAssignments,
}

impl SchedulerInput {
    /// Creates an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty input over the full `Monday..Friday x hours_per_day` grid.
    pub fn full_week(hours_per_day: u8) -> Self {
        Self::new().with_time_slots(TimeSlot::full_week(hours_per_day))
    }

    /// Adds a lesson.
    pub fn with_lesson(mut self, lesson: Lesson) -> Self {
        self.lessons.push(lesson);
        self
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Adds a location.
    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    /// Adds a usable slot.
    pub fn with_time_slot(mut self, slot: TimeSlot) -> Self {
        self.time_slots.push(slot);
        self
    }

    /// Adds usable slots.
    pub fn with_time_slots(mut self, slots: impl IntoIterator<Item = TimeSlot>) -> Self {
        self.time_slots.extend(slots);
        self
    }

    /// Sets the required teacher relation.
    pub fn with_required(mut self, required: RequiredAssignments) -> Self {
        self.required = required;
        self
    }

    /// Total hours the scheduler has to place.
    pub fn required_hours(&self) -> u32 {
        self.lessons.iter().map(Lesson::required_hours).sum()
    }
}

/// Counters describing how a run went.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Slot visits by the driver.
    pub steps: u64,
    /// Blocks committed.
    pub commits: u64,
    /// Blocks rolled back.
    pub rollbacks: u64,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Outcome of one scheduling run.
///
/// `schedule` is empty unless `success` is true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerResult {
    /// Whether every included lesson was fully placed.
    pub success: bool,
    /// The timetable (empty on failure).
    pub schedule: Schedule,
    /// Ordered diagnostic trace.
    pub logs: Vec<String>,
    /// Failure description.
    pub error: Option<String>,
    /// Failure category.
    pub failure: Option<FailureKind>,
    /// Hours left unplaced per lesson at the end of the run.
    pub remaining_hours: HashMap<String, u32>,
    /// Search counters.
    pub stats: SearchStats,
    /// Seed the run used; pass it back via `SchedulerConfig::with_seed` to reproduce.
    pub seed: u64,
}

impl SchedulerResult {
    /// Lessons that still have hours to place.
    pub fn unplaced_lessons(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .remaining_hours
            .iter()
            .filter(|(_, &h)| h > 0)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}
