//! Search trace with level control.
//!
//! Every run records an ordered, human-readable trace of its decisions,
//! returned in the result for offline debugging. Lines are also forwarded
//! to the `log` facade under the `u_timetable::search` target.
//!
//! Levels:
//! - `Silent`: nothing recorded
//! - `Changes`: commits, rollbacks, lesson transitions
//! - `Checks`: additionally every failed constraint check
//!
//! The macros skip formatting entirely when the level is disabled.

use serde::{Deserialize, Serialize};

/// Trace verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TraceLevel {
    Silent,
    Changes,
    Checks,
}

/// Ordered diagnostic lines of one run.
#[derive(Debug, Clone)]
pub struct SearchTrace {
    level: TraceLevel,
    lines: Vec<String>,
}

impl SearchTrace {
    /// Creates an empty trace recording at `level`.
    pub fn new(level: TraceLevel) -> Self {
        Self {
            level,
            lines: Vec::new(),
        }
    }

    /// Whether lines at `level` are recorded.
    #[inline]
    pub fn enabled(&self, level: TraceLevel) -> bool {
        level != TraceLevel::Silent && self.level >= level
    }

    /// Appends a line.
    pub fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    /// Recorded lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consumes the trace.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Record at `Changes` level: commits, rollbacks, lesson transitions.
macro_rules! trace_changes {
    ($trace:expr, $($arg:tt)*) => {
        if $trace.enabled($crate::trace::TraceLevel::Changes) {
            let line = format!($($arg)*);
            log::debug!(target: "u_timetable::search", "{}", line);
            $trace.push(line);
        }
    };
}

/// Record at `Checks` level: failed availability and continuity checks.
macro_rules! trace_checks {
    ($trace:expr, $($arg:tt)*) => {
        if $trace.enabled($crate::trace::TraceLevel::Checks) {
            let line = format!($($arg)*);
            log::trace!(target: "u_timetable::search", "{}", line);
            $trace.push(line);
        }
    };
}

pub(crate) use trace_changes;
pub(crate) use trace_checks;
