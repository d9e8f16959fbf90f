//! Operator edits applied to a proposed task list.

use crate::task::domain::{Priority, TaskId, TaskPatch, normalize_title};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an edit names the task it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum TaskReference {
    /// A stable local identifier.
    Id(TaskId),
    /// A best-effort title match, insensitive to case and whitespace.
    Title(String),
}

impl TaskReference {
    /// References a task by title.
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self::Title(title.into())
    }

    /// Returns the title in comparison form, for title references.
    #[must_use]
    pub fn normalized_title(&self) -> Option<String> {
        match self {
            Self::Id(_) => None,
            Self::Title(title) => Some(normalize_title(title)),
        }
    }
}

impl From<TaskId> for TaskReference {
    fn from(value: TaskId) -> Self {
        Self::Id(value)
    }
}

impl fmt::Display for TaskReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Title(title) => write!(f, "\"{title}\""),
        }
    }
}

/// One operator edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOperation {
    /// Adds a new candidate task.
    Add {
        /// Task title.
        title: String,
        /// Task priority.
        priority: Priority,
        /// Optional description.
        description: Option<String>,
    },
    /// Removes a candidate task.
    Remove {
        /// Task to remove.
        target: TaskReference,
    },
    /// Changes fields of a candidate task.
    Edit {
        /// Task to change.
        target: TaskReference,
        /// Fields to replace.
        patch: TaskPatch,
    },
    /// Confirms the whole list.
    AcceptAll,
}

impl EditOperation {
    /// Adds a task without description.
    #[must_use]
    pub fn add(title: impl Into<String>, priority: Priority) -> Self {
        Self::Add {
            title: title.into(),
            priority,
            description: None,
        }
    }

    /// Adds a task with a description.
    #[must_use]
    pub fn add_described(
        title: impl Into<String>,
        priority: Priority,
        description: impl Into<String>,
    ) -> Self {
        Self::Add {
            title: title.into(),
            priority,
            description: Some(description.into()),
        }
    }

    /// Removes a task.
    #[must_use]
    pub fn remove(target: impl Into<TaskReference>) -> Self {
        Self::Remove {
            target: target.into(),
        }
    }

    /// Edits a task.
    #[must_use]
    pub fn edit(target: impl Into<TaskReference>, patch: TaskPatch) -> Self {
        Self::Edit {
            target: target.into(),
            patch,
        }
    }

    /// Returns `true` for operations that change the task list.
    #[must_use]
    pub const fn is_mutating(&self) -> bool {
        !matches!(self, Self::AcceptAll)
    }
}
