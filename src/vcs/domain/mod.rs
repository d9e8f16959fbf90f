//! Domain types for binding version-control actions to tasks.

mod history;
mod message;

pub use history::{CommitResult, HistoryReport, LogEntry};
pub use message::{CommitMessage, subject_reference};
