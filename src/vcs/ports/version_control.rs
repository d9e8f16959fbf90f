//! Version-control port.
//!
//! Adapters run the actual version-control tool. Failures are passed
//! through verbatim and are never retried by callers.

use crate::task::domain::{BranchName, CommitHash, ErrorClass};
use crate::vcs::domain::{CommitResult, LogEntry};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for version-control operations.
pub type VcsResult<T> = Result<T, VcsError>;

/// Local version-control contract.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Switches to `branch`, creating it first when it does not exist.
    async fn create_or_checkout_branch(&self, branch: &BranchName) -> VcsResult<()>;

    /// Stages `paths` and commits them with `message`.
    async fn stage_and_commit(&self, message: &str, paths: &[String]) -> VcsResult<CommitResult>;

    /// Publishes `branch` to the configured remote.
    async fn push(&self, branch: &BranchName) -> VcsResult<()>;

    /// Lists commits whose message contains `pattern` as a fixed string,
    /// newest first.
    async fn log(&self, pattern: &str) -> VcsResult<Vec<LogEntry>>;

    /// Returns the most recent commit, or `None` on an empty history.
    async fn head(&self) -> VcsResult<Option<CommitHash>>;

    /// Rewinds the most recent commit, keeping its changes in the working
    /// tree, and returns the hash that was undone.
    async fn soft_undo(&self) -> VcsResult<CommitHash>;
}

/// Errors reported by version-control adapters.
#[derive(Debug, Clone, Error)]
pub enum VcsError {
    /// Uncommitted changes prevent the action.
    #[error("{0}")]
    DirtyTree(String),

    /// The remote refused the push.
    #[error("{0}")]
    PushRejected(String),

    /// No remote is configured for the repository.
    #[error("{0}")]
    MissingRemote(String),

    /// There is no commit to undo.
    #[error("{0}")]
    NothingToUndo(String),

    /// Any other failure, reported as the tool produced it.
    #[error("{0}")]
    Command(Arc<dyn std::error::Error + Send + Sync>),
}

impl VcsError {
    /// Wraps an arbitrary tool failure.
    pub fn command(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Command(Arc::new(err))
    }

    /// Returns the failure class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::LocalVcs
    }
}
