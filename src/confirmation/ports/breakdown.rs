//! Port for the natural-language breakdown collaborator.
//!
//! The collaborator turns free text into candidate tasks. Its output is
//! treated as an unordered list; nothing about how it is produced is
//! assumed.

use crate::confirmation::domain::CandidateTask;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for breakdown operations.
pub type BreakdownResult<T> = Result<T, BreakdownError>;

/// Idea-to-candidates contract.
#[async_trait]
pub trait TaskBreakdown: Send + Sync {
    /// Breaks `idea` down into candidate tasks.
    async fn break_down(&self, idea: &str) -> BreakdownResult<Vec<CandidateTask>>;
}

/// Errors returned by breakdown adapters.
#[derive(Debug, Clone, Error)]
pub enum BreakdownError {
    /// The collaborator could not be reached.
    #[error("task breakdown unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// The collaborator answered with something that is not a task list.
    #[error("task breakdown returned unusable output: {0}")]
    Unusable(String),
}

impl BreakdownError {
    /// Wraps a transport error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
