//! Teacher and location models.
//!
//! Teachers and locations are the two resource kinds a lesson hour
//! consumes. Teachers carry a set of blocked slots; locations carry an
//! optional lab type that decides which lessons they can host.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{TimeSlot, Weekday};

/// A teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Slots in which the teacher cannot teach.
    pub unavailable_slots: HashSet<TimeSlot>,
}

impl Teacher {
    /// Creates a teacher who is available all week.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            unavailable_slots: HashSet::new(),
        }
    }

    /// Sets the teacher name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Blocks a single slot.
    pub fn with_unavailable(mut self, slot: TimeSlot) -> Self {
        self.unavailable_slots.insert(slot);
        self
    }

    /// Blocks every listed slot.
    pub fn with_unavailable_slots(mut self, slots: impl IntoIterator<Item = TimeSlot>) -> Self {
        self.unavailable_slots.extend(slots);
        self
    }

    /// Blocks a whole day.
    pub fn with_unavailable_day(mut self, day: Weekday, hours_per_day: u8) -> Self {
        self.unavailable_slots
            .extend(TimeSlot::full_day(day, hours_per_day));
        self
    }

    /// Whether the teacher's own calendar allows `slot`.
    #[inline]
    pub fn is_free_at(&self, slot: &TimeSlot) -> bool {
        !self.unavailable_slots.contains(slot)
    }
}

/// A physical room or lab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// Unique location identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Lab type. `None` = ordinary classroom.
    pub lab_type_id: Option<String>,
    /// Seat count.
    pub capacity: u32,
}

impl Location {
    /// Creates an ordinary classroom.
    pub fn classroom(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            lab_type_id: None,
            capacity: 0,
        }
    }

    /// Creates a lab of the given type.
    pub fn lab(id: impl Into<String>, lab_type_id: impl Into<String>) -> Self {
        Self {
            lab_type_id: Some(lab_type_id.into()),
            ..Self::classroom(id)
        }
    }

    /// Sets the location name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the seat count.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Whether this is a lab.
    pub fn is_lab(&self) -> bool {
        self.lab_type_id.is_some()
    }
}
