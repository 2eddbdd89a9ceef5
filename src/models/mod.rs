//! Timetabling domain models.
//!
//! Provides the input entities of a weekly school timetable (lessons,
//! teachers, locations, the slot grid, required teacher hints) and the
//! solution type (`Schedule` of `ScheduleEntry` values).
//!
//! # Domain Mappings
//!
//! | u-timetable | Vocational school | Generic scheduling |
//! |-------------|-------------------|--------------------|
//! | Lesson | Course hours per class | Task |
//! | Teacher | Instructor | Human resource |
//! | Location | Classroom / lab | Primary resource |
//! | TimeSlot | Period of a school day | Time bucket |
//! | ClassGroupKey | Branch + grade cohort | Disjunctive consumer |

mod lesson;
mod required;
mod resource;
mod schedule;
mod time_slot;

pub use lesson::{ClassGroupKey, Lesson};
pub use required::RequiredAssignments;
pub use resource::{Location, Teacher};
pub use schedule::{Schedule, ScheduleEntry, Violation, ViolationType};
pub use time_slot::{TimeSlot, Weekday, DEFAULT_HOURS_PER_DAY};
