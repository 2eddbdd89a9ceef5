//! Weekly time grid.
//!
//! A week is a fixed set of school days, each divided into numbered
//! teaching hours starting at 1. A `TimeSlot` names one cell of that grid.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of teaching hours per day.
pub const DEFAULT_HOURS_PER_DAY: u8 = 10;

/// A school day.
///
/// Ordering follows the calendar week, so sorted slots run Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    /// All school days in calendar order.
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Short English name ("Mon", "Tue", ...).
    pub fn short_name(self) -> &'static str {
        match self {
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// One (day, hour) cell of the weekly grid.
///
/// Hours are 1-based. Identity is by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    /// School day.
    pub day: Weekday,
    /// Teaching hour within the day (1-based).
    pub hour: u8,
}

impl TimeSlot {
    /// Creates a slot.
    pub const fn new(day: Weekday, hour: u8) -> Self {
        Self { day, hour }
    }

    /// The slot `offset` hours later on the same day.
    ///
    /// Returns `None` on `u8` overflow; callers check the per-day limit.
    pub fn later(self, offset: u32) -> Option<Self> {
        let offset = u8::try_from(offset).ok()?;
        self.hour.checked_add(offset).map(|hour| Self { day: self.day, hour })
    }

    /// The consecutive slots of a block starting here.
    ///
    /// Stops early if an hour number would overflow.
    pub fn block(self, duration: u32) -> impl Iterator<Item = TimeSlot> {
        (0..duration).map_while(move |offset| self.later(offset))
    }

    /// Every slot of a `days x hours_per_day` week, in sorted order.
    pub fn full_week(hours_per_day: u8) -> Vec<TimeSlot> {
        Weekday::ALL
            .iter()
            .flat_map(|&day| (1..=hours_per_day).map(move |hour| TimeSlot::new(day, hour)))
            .collect()
    }

    /// Every slot of a single day.
    pub fn full_day(day: Weekday, hours_per_day: u8) -> Vec<TimeSlot> {
        (1..=hours_per_day).map(|hour| TimeSlot::new(day, hour)).collect()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.day, self.hour)
    }
}
