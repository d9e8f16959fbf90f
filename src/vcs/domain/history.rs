//! Commit history entries and the read-only aggregation report.

use crate::task::domain::{CommitHash, RemoteId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of staging and committing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResult {
    /// A commit was created.
    Committed(CommitHash),
    /// The given paths carried no changes; nothing was committed.
    NoChanges,
}

/// One commit as reported by the version-control log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Commit hash.
    pub hash: CommitHash,
    /// Full commit message.
    pub message: String,
}

impl LogEntry {
    /// Creates a log entry.
    #[must_use]
    pub fn new(hash: CommitHash, message: impl Into<String>) -> Self {
        Self {
            hash,
            message: message.into(),
        }
    }

    /// Returns the first line of the message.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// Which tasks the commit history says have work on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryReport {
    /// Commit hashes found per task, in log order.
    pub commits_by_task: BTreeMap<TaskId, Vec<CommitHash>>,
    /// Commits whose reference token matches no task in the project.
    pub unknown_references: BTreeMap<RemoteId, Vec<CommitHash>>,
    /// Tasks that are done locally while the tracker has not been told.
    pub done_without_tracker_update: Vec<TaskId>,
    /// Tasks with commits in history that are not yet done.
    pub committed_but_open: Vec<TaskId>,
}

impl HistoryReport {
    /// Returns `true` when every finished task reached the tracker.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.done_without_tracker_update.is_empty()
    }
}
