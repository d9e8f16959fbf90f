//! Error types for task domain validation, structure and lifecycle guards.

use super::{ProjectState, RemoteId, TaskId, TaskStatus};
use thiserror::Error;

/// Coarse classification of failures used by callers to decide how to react.
///
/// Validation and structural failures leave all state untouched. Conflicts
/// wait for an explicit operator decision. Transient remote failures are
/// retried with backoff and degrade to `sync-pending`. Local version-control
/// failures are fatal to the current action and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Bad input shape, rejected before anything is mutated.
    Validation,
    /// A structural rule blocked the requested transition.
    Structural,
    /// Local and remote state diverged since the last sync.
    SyncConflict,
    /// Network, rate-limit or missing-resource failure on the tracker side.
    RemoteTransient,
    /// Failure reported by the local version-control collaborator.
    LocalVcs,
}

/// Errors returned while constructing or mutating task domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// The priority value is outside the supported range.
    #[error("invalid priority '{0}', expected P0-P3 or tracker value 1-4")]
    InvalidPriority(String),

    /// The remote identifier does not match `LETTERS-DIGITS`.
    #[error("invalid remote id '{0}', expected letters, a dash and digits")]
    InvalidRemoteId(String),

    /// The commit hash is not a hexadecimal object name.
    #[error("invalid commit hash '{0}'")]
    InvalidCommitHash(String),

    /// The branch prefix cannot be used in a git ref name.
    #[error("invalid branch prefix '{0}'")]
    InvalidBranchPrefix(String),

    /// No task with the identifier exists in the project.
    #[error("task not found: {0}")]
    UnknownTask(TaskId),

    /// A dependency references a task outside the project.
    #[error("task {task_id} depends on unknown task {dependency}")]
    UnknownDependency {
        /// Dependent task.
        task_id: TaskId,
        /// Missing dependency.
        dependency: TaskId,
    },

    /// Adding the dependency edge would close a cycle.
    #[error("dependency {task_id} -> {depends_on} would create a cycle")]
    CyclicDependency {
        /// Task that would gain the dependency.
        task_id: TaskId,
        /// Task it would depend on.
        depends_on: TaskId,
    },

    /// Another task in the project already has the same normalized title.
    #[error("duplicate task title '{0}'")]
    DuplicateTask(String),

    /// A declared dependency was cancelled and still blocks activation.
    #[error("task {task_id} is blocked by cancelled dependency {dependency}")]
    BlockedByCancelledDependency {
        /// Blocked task.
        task_id: TaskId,
        /// Cancelled dependency.
        dependency: TaskId,
    },

    /// A declared dependency has not reached `Done`.
    #[error("task {task_id} waits on unfinished dependency {dependency}")]
    DependencyNotSatisfied {
        /// Blocked task.
        task_id: TaskId,
        /// Unfinished dependency.
        dependency: TaskId,
    },

    /// The requested task state transition is not permitted.
    #[error("invalid state transition for task {task_id}: {from:?} -> {to:?}")]
    InvalidStateTransition {
        /// Task identifier.
        task_id: TaskId,
        /// Current state.
        from: TaskStatus,
        /// Requested state.
        to: TaskStatus,
    },

    /// The requested project state transition is not permitted.
    #[error("invalid project transition: {from:?} -> {to:?}")]
    InvalidProjectTransition {
        /// Current project state.
        from: ProjectState,
        /// Requested project state.
        to: ProjectState,
    },

    /// The operation is not allowed while the project is in this state.
    #[error("operation not allowed while project is {0:?}")]
    ProjectStateMismatch(ProjectState),

    /// Another task already holds the project's single-focus lock.
    #[error("task {active} is already in progress")]
    FocusLocked {
        /// Task currently in progress.
        active: TaskId,
    },

    /// The task has no remote identifier yet.
    #[error("task {0} has not been synced to the tracker")]
    NotSynced(TaskId),

    /// The task already carries a remote identifier.
    #[error("task {task_id} is already bound to {remote_id}")]
    AlreadySynced {
        /// Task identifier.
        task_id: TaskId,
        /// Existing remote identifier.
        remote_id: RemoteId,
    },

    /// Version-control actions require the task to be in progress.
    #[error("task {0} is not in progress")]
    NotInProgress(TaskId),

    /// Completion requires at least one commit referencing the task.
    #[error("task {0} has no commit referencing it")]
    MissingCommit(TaskId),

    /// The commit message does not follow `[<remote-id>] <description>`.
    #[error("malformed commit reference: {0}")]
    MalformedReference(String),

    /// The commit message references a different task.
    #[error("commit references {found} but task is bound to {expected}")]
    ReferenceMismatch {
        /// Remote id of the task being committed.
        expected: RemoteId,
        /// Remote id found in the message.
        found: RemoteId,
    },

    /// Terminal tasks cannot be edited.
    #[error("task {0} is terminal and cannot be modified")]
    TaskSealed(TaskId),
}

impl TaskDomainError {
    /// Returns the failure class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::CyclicDependency { .. }
            | Self::DuplicateTask(_)
            | Self::BlockedByCancelledDependency { .. }
            | Self::DependencyNotSatisfied { .. }
            | Self::InvalidStateTransition { .. }
            | Self::InvalidProjectTransition { .. }
            | Self::ProjectStateMismatch(_)
            | Self::FocusLocked { .. }
            | Self::NotSynced(_)
            | Self::AlreadySynced { .. }
            | Self::NotInProgress(_)
            | Self::MissingCommit(_)
            | Self::TaskSealed(_) => ErrorClass::Structural,
            Self::EmptyTitle
            | Self::EmptyProjectName
            | Self::InvalidPriority(_)
            | Self::InvalidRemoteId(_)
            | Self::InvalidCommitHash(_)
            | Self::InvalidBranchPrefix(_)
            | Self::UnknownTask(_)
            | Self::UnknownDependency { .. }
            | Self::MalformedReference(_)
            | Self::ReferenceMismatch { .. } => ErrorClass::Validation,
        }
    }
}

/// Error returned while parsing task or project states from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown state: {0}")]
pub struct ParseStateError(pub String);
