//! Candidate tasks produced by the breakdown step and reconcile results.

use crate::task::domain::{NewTask, Priority};
use serde::{Deserialize, Serialize};

/// A task suggested for an idea, before the operator reviews it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTask {
    /// Suggested title.
    pub title: String,
    /// Suggested priority.
    pub priority: Priority,
    /// Suggested description.
    #[serde(default)]
    pub description: Option<String>,
    /// Titles of other candidates this one depends on.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl CandidateTask {
    /// Creates a candidate without description or dependencies.
    #[must_use]
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            priority,
            description: None,
            depends_on: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares a dependency on another candidate by title.
    #[must_use]
    pub fn depending_on(mut self, title: impl Into<String>) -> Self {
        self.depends_on.push(title.into());
        self
    }

    /// Converts into task input without dependencies.
    #[must_use]
    pub fn to_new_task(&self) -> NewTask {
        let task = NewTask::new(self.title.clone(), self.priority);
        match &self.description {
            Some(description) => task.with_description(description.clone()),
            None => task,
        }
    }
}

/// Result of applying a batch of edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Edits were applied; the list still awaits acceptance.
    Proposed {
        /// Number of mutating edits applied.
        applied: usize,
    },
    /// The list was accepted and the project moved to `TasksConfirmed`.
    Confirmed {
        /// Number of mutating edits applied before acceptance.
        applied: usize,
    },
    /// The list was already confirmed; nothing changed.
    AlreadyConfirmed,
}

impl ReconcileOutcome {
    /// Returns `true` when the task list is confirmed after the batch.
    #[must_use]
    pub const fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed { .. } | Self::AlreadyConfirmed)
    }
}
