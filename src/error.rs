//! Error types.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::{ClassGroupKey, TimeSlot};
use crate::validation::ValidationError;

/// A schedule insert that would break one of the exclusivity invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleConflict {
    #[error("location '{location_id}' already hosts lesson '{lesson_id}' at {slot}")]
    LocationTaken {
        location_id: String,
        slot: TimeSlot,
        lesson_id: String,
    },
    #[error("teacher '{teacher_id}' already teaches at {slot}")]
    TeacherBusy { teacher_id: String, slot: TimeSlot },
    #[error("class-group {class_group} already attends lesson '{lesson_id}' at {slot}")]
    ClassGroupBusy {
        class_group: ClassGroupKey,
        slot: TimeSlot,
        lesson_id: String,
    },
}

/// Errors that end a scheduling run.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("invalid input: {}", join_validation(.0))]
    InvalidInput(Vec<ValidationError>),
    #[error("structurally infeasible: {}", .0.join("; "))]
    StructurallyInfeasible(Vec<String>),
    #[error("no feasible timetable found after {steps} search steps")]
    SearchExhausted { steps: u64 },
    #[error("search finished but the timetable is incomplete: {}", .0.join("; "))]
    Incomplete(Vec<String>),
    #[error("step limit of {limit} reached")]
    StepLimitReached { limit: u64 },
    #[error("time limit of {limit:?} reached")]
    TimeLimitReached { limit: Duration },
    #[error("schedule conflict: {0}")]
    Conflict(#[from] ScheduleConflict),
    #[error("scheduler fault: {0}")]
    Internal(String),
}

/// Coarse failure category, kept in results for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    InvalidInput,
    StructurallyInfeasible,
    SearchExhausted,
    Incomplete,
    LimitReached,
    Internal,
}

impl SchedulerError {
    /// The failure category of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            SchedulerError::InvalidInput(_) => FailureKind::InvalidInput,
            SchedulerError::StructurallyInfeasible(_) => FailureKind::StructurallyInfeasible,
            SchedulerError::SearchExhausted { .. } => FailureKind::SearchExhausted,
            SchedulerError::Incomplete(_) => FailureKind::Incomplete,
            SchedulerError::StepLimitReached { .. } | SchedulerError::TimeLimitReached { .. } => {
                FailureKind::LimitReached
            }
            SchedulerError::Conflict(_) | SchedulerError::Internal(_) => FailureKind::Internal,
        }
    }
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
