//! Lesson model.
//!
//! A lesson is one curriculum unit taught to one class-group for a fixed
//! number of contact hours per week. It names which teachers may teach it,
//! which lab types it needs, and whether its hours may be split into blocks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The cohort a lesson is taught to: vocational branch + grade level.
///
/// Two lessons with the same key can never run in the same hour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassGroupKey {
    /// Vocational branch identifier.
    pub branch_id: String,
    /// Grade level (e.g. 9..12).
    pub grade_level: u8,
}

impl ClassGroupKey {
    /// Creates a class-group key.
    pub fn new(branch_id: impl Into<String>, grade_level: u8) -> Self {
        Self {
            branch_id: branch_id.into(),
            grade_level,
        }
    }
}

impl fmt::Display for ClassGroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.branch_id, self.grade_level)
    }
}

/// A lesson to be placed in the weekly timetable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    /// Unique lesson identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Contact hours per week.
    pub weekly_hours: u32,
    /// Whether the weekly hours may be spread over several blocks.
    pub can_split: bool,
    /// Class-group attending this lesson.
    pub class_group: ClassGroupKey,
    /// Lab types the lesson may use. Empty = ordinary classroom only.
    pub eligible_lab_type_ids: Vec<String>,
    /// Teachers qualified to teach this lesson.
    pub eligible_teacher_ids: Vec<String>,
    /// Whether every hour runs as two parallel groups (two teachers, two rooms).
    pub requires_dual_resources: bool,
    /// Whether the lesson takes part in scheduling at all.
    pub include_in_schedule: bool,
}

impl Lesson {
    /// Creates an unsplittable, single-resource lesson with no hours.
    pub fn new(id: impl Into<String>, class_group: ClassGroupKey) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            weekly_hours: 0,
            can_split: false,
            class_group,
            eligible_lab_type_ids: Vec::new(),
            eligible_teacher_ids: Vec::new(),
            requires_dual_resources: false,
            include_in_schedule: true,
        }
    }

    /// Sets the lesson name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the weekly contact hours.
    pub fn with_weekly_hours(mut self, hours: u32) -> Self {
        self.weekly_hours = hours;
        self
    }

    /// Allows the weekly hours to be split into blocks.
    pub fn splittable(mut self) -> Self {
        self.can_split = true;
        self
    }

    /// Adds an eligible teacher.
    pub fn with_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.eligible_teacher_ids.push(teacher_id.into());
        self
    }

    /// Adds an eligible lab type.
    pub fn with_lab_type(mut self, lab_type_id: impl Into<String>) -> Self {
        self.eligible_lab_type_ids.push(lab_type_id.into());
        self
    }

    /// Marks the lesson as running two parallel groups.
    pub fn dual(mut self) -> Self {
        self.requires_dual_resources = true;
        self
    }

    /// Sets whether the lesson is scheduled.
    pub fn with_included(mut self, included: bool) -> Self {
        self.include_in_schedule = included;
        self
    }

    /// Whether the lesson needs a lab rather than an ordinary classroom.
    pub fn needs_lab(&self) -> bool {
        !self.eligible_lab_type_ids.is_empty()
    }

    /// Hours the scheduler must place (0 if excluded).
    pub fn required_hours(&self) -> u32 {
        if self.include_in_schedule {
            self.weekly_hours
        } else {
            0
        }
    }

    /// First and second half sizes for split lessons: `(ceil(w/2), floor(w/2))`.
    pub fn halves(&self) -> (u32, u32) {
        (self.weekly_hours.div_ceil(2), self.weekly_hours / 2)
    }
}
