//! Errors raised while reconciling operator edits.

use super::TaskReference;
use crate::task::domain::{ErrorClass, ProjectState, TaskDomainError, TaskId};
use thiserror::Error;

/// Errors returned by the reconciler. The task list is left untouched
/// whenever one is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReconcileError {
    /// A task-model rule rejected an edit.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// A title reference matched more than one task.
    #[error("reference {reference} matches {} tasks", .candidates.len())]
    AmbiguousReference {
        /// The reference as given.
        reference: TaskReference,
        /// Every matching task.
        candidates: Vec<TaskId>,
    },

    /// A reference matched no task.
    #[error("reference {0} matches no task")]
    UnknownReference(TaskReference),

    /// Edits follow `accept-all` in the same batch.
    #[error("{remaining} edit(s) follow accept-all; resubmit them before accepting")]
    PendingEdits {
        /// Number of edits after `accept-all`.
        remaining: usize,
    },

    /// The task list is already confirmed and can no longer be edited.
    #[error("task list already confirmed (project is {0:?})")]
    AlreadyConfirmed(ProjectState),
}

impl ReconcileError {
    /// Returns the failure class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Domain(err) => err.class(),
            Self::AmbiguousReference { .. } | Self::AlreadyConfirmed(_) => ErrorClass::Structural,
            Self::UnknownReference(_) | Self::PendingEdits { .. } => ErrorClass::Validation,
        }
    }
}
