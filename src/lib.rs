//! Weekly timetable generator for vocational schools.
//!
//! Places every lesson of a school week into (day, hour) slots with a
//! teacher and a location, honoring teacher calendars, room types,
//! class-group exclusivity, split-lesson rules and two-teacher lessons.
//! The search is a randomized, chronological backtracker with exact
//! rollback; a seed makes runs reproducible.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Lesson`, `Teacher`, `Location`, `TimeSlot`,
//!   `Schedule`, `ScheduleEntry`, `RequiredAssignments`, `Violation`
//! - **`scheduler`**: The backtracking search, its input/result types and KPIs
//! - **`validation`**: Input integrity checks and full schedule verification
//! - **`config`**: Tunable rules and search limits
//! - **`trace`**: Levelled search trace returned with every result
//! - **`error`**: Failure taxonomy
//!
//! # Example
//!
//! ```
//! use u_timetable::models::{ClassGroupKey, Lesson, Location, Teacher};
//! use u_timetable::scheduler::{Scheduler, SchedulerInput};
//! use u_timetable::{validate_schedule, SchedulerConfig};
//!
//! let input = SchedulerInput::full_week(10)
//!     .with_lesson(
//!         Lesson::new("programming", ClassGroupKey::new("it", 10))
//!             .with_weekly_hours(6)
//!             .splittable()
//!             .with_teacher("T1")
//!             .with_lab_type("computer"),
//!     )
//!     .with_teacher(Teacher::new("T1"))
//!     .with_location(Location::lab("PC1", "computer"));
//!
//! let config = SchedulerConfig::default().with_seed(1);
//! let result = Scheduler::with_config(config.clone()).schedule(&input);
//! assert!(result.success);
//! assert_eq!(result.schedule.lesson_days("programming").len(), 2);
//! assert!(validate_schedule(&result.schedule, &input, &config).is_empty());
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6

pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod trace;
pub mod validation;

pub use config::SchedulerConfig;
pub use error::{FailureKind, ScheduleConflict, SchedulerError};
pub use scheduler::{Scheduler, SchedulerInput, SchedulerResult, TimetableKpi};
pub use trace::TraceLevel;
pub use validation::{validate_input, validate_schedule, ValidationError, ValidationErrorKind};
