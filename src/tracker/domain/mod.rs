//! Domain types for projecting tasks onto an issue tracker.

mod config;
mod drift;
mod issue;
mod outcome;

pub use config::{ConfigError, RetryPolicy, SyncConfig};
pub use drift::Drift;
pub use issue::{
    CreateIssueRequest, CreatedIssue, IssueUpdate, RemoteIssue, RemoteStateCategory,
    WorkflowState,
};
pub use outcome::PushOutcome;
