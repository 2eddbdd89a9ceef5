//! Required teacher assignments.
//!
//! Marks teachers who must be preferred for specific lessons. When a lesson
//! has at least one eligible required teacher, only required teachers are
//! tried for it; otherwise every eligible teacher is.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Relation teacher id -> set of lesson ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredAssignments {
    by_teacher: HashMap<String, HashSet<String>>,
}

impl RequiredAssignments {
    /// Creates an empty relation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `teacher_id` as required for `lesson_id`.
    pub fn with(mut self, teacher_id: impl Into<String>, lesson_id: impl Into<String>) -> Self {
        self.require(teacher_id, lesson_id);
        self
    }

    /// Marks `teacher_id` as required for `lesson_id`.
    pub fn require(&mut self, teacher_id: impl Into<String>, lesson_id: impl Into<String>) {
        self.by_teacher
            .entry(teacher_id.into())
            .or_default()
            .insert(lesson_id.into());
    }

    /// Whether `teacher_id` is required for `lesson_id`.
    pub fn is_required(&self, teacher_id: &str, lesson_id: &str) -> bool {
        self.by_teacher
            .get(teacher_id)
            .is_some_and(|lessons| lessons.contains(lesson_id))
    }

    /// Lessons a teacher is required for.
    pub fn lessons_for(&self, teacher_id: &str) -> Option<&HashSet<String>> {
        self.by_teacher.get(teacher_id)
    }

    /// Iterates `(teacher_id, lesson_id)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_teacher.iter().flat_map(|(teacher, lessons)| {
            lessons
                .iter()
                .map(move |lesson| (teacher.as_str(), lesson.as_str()))
        })
    }

    /// Whether the relation is empty.
    pub fn is_empty(&self) -> bool {
        self.by_teacher.values().all(HashSet::is_empty)
    }
}
