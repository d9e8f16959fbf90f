//! Issue-tracker port.
//!
//! The transport (HTTP, GraphQL) lives behind this trait. Adapters must
//! classify failures so the sync engine can tell retryable conditions from
//! permanent rejections.

use crate::task::domain::{CreationKey, ErrorClass, RemoteId};
use crate::tracker::domain::{
    CreateIssueRequest, CreatedIssue, IssueUpdate, RemoteIssue, WorkflowState,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for tracker operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Remote issue-tracker contract.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Creates an issue and returns its identity.
    async fn create_issue(&self, request: &CreateIssueRequest) -> TrackerResult<CreatedIssue>;

    /// Updates fields of an existing issue.
    async fn update_issue(&self, remote_id: &RemoteId, update: &IssueUpdate)
    -> TrackerResult<()>;

    /// Reads the current fields of an issue.
    async fn get_issue(&self, remote_id: &RemoteId) -> TrackerResult<RemoteIssue>;

    /// Lists the workflow states configured for a team.
    async fn list_workflow_states(&self, team: &str) -> TrackerResult<Vec<WorkflowState>>;

    /// Searches a team's issues for one created with `key`.
    async fn find_by_creation_key(
        &self,
        team: &str,
        key: &CreationKey,
    ) -> TrackerResult<Option<CreatedIssue>>;
}

/// Errors returned by tracker adapters.
#[derive(Debug, Clone, Error)]
pub enum TrackerError {
    /// Network failure, timeout or server error.
    #[error("tracker unavailable: {0}")]
    Transient(Arc<dyn std::error::Error + Send + Sync>),

    /// The tracker throttled the request.
    #[error("tracker rate limit exceeded")]
    RateLimited,

    /// A referenced label, project or workflow state does not exist.
    #[error("tracker resource missing: {0}")]
    MissingResource(String),

    /// The issue does not exist on the tracker.
    #[error("issue {0} not found on tracker")]
    NotFound(RemoteId),

    /// The tracker refused the request as invalid.
    #[error("tracker rejected request: {0}")]
    Rejected(String),
}

impl TrackerError {
    /// Wraps a transport error.
    pub fn transient(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transient(Arc::new(err))
    }

    /// Returns `true` for failures worth retrying with backoff.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transient(_) | Self::RateLimited | Self::MissingResource(_)
        )
    }

    /// Returns the failure class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        if self.is_retryable() {
            ErrorClass::RemoteTransient
        } else {
            ErrorClass::Validation
        }
    }
}
