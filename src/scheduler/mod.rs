//! Backtracking timetable search and KPI evaluation.
//!
//! # Algorithm
//!
//! `Scheduler` runs a randomized, chronological backtracking search over
//! (lesson, block, slot, teacher, location) choices. Every commit is undone
//! exactly on failure, so a run either returns a complete timetable that
//! satisfies every hard rule or reports why it could not.
//!
//! # Layout
//!
//! - `index`: per-run lookup tables and structural feasibility
//! - `availability`: pure availability and suitability predicates
//! - `blocks`: block-size planning for split and unsplit lessons
//! - `context`: mutable run state with commit/rollback
//! - `single`, `dual`: resource assigners
//! - `driver`: the recursive search and the public entry point
//!
//! # KPI
//!
//! `TimetableKpi` computes teacher load, location utilization, class-group
//! idle gaps and days used.
//!
//! # References
//!
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6
//! - Schaerf (1999), "A Survey of Automated Timetabling"

mod availability;
mod blocks;
mod context;
mod driver;
mod dual;
mod index;
mod kpi;
mod request;
mod single;

pub use availability::{
    block_fits_day, class_group_available, location_available, location_suitable,
    teacher_available,
};
pub use blocks::{needs_new_day, plan_blocks, SMALL_LESSON_HOURS};
pub use driver::Scheduler;
pub use index::{LessonCandidates, ProblemIndex};
pub use kpi::TimetableKpi;
pub use request::{SchedulerInput, SchedulerResult, SearchStats};
