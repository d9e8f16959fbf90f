//! Immutable record of a commit made on behalf of a task.

use super::{CommitHash, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A commit created through the version-control lifecycle manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    hash: CommitHash,
    task_id: TaskId,
    message: String,
    committed_at: DateTime<Utc>,
    files: BTreeSet<String>,
}

impl CommitRecord {
    /// Creates a commit record.
    #[must_use]
    pub fn new(
        hash: CommitHash,
        task_id: TaskId,
        message: impl Into<String>,
        committed_at: DateTime<Utc>,
        files: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            hash,
            task_id,
            message: message.into(),
            committed_at,
            files: files.into_iter().collect(),
        }
    }

    /// Returns the commit hash.
    #[must_use]
    pub const fn hash(&self) -> &CommitHash {
        &self.hash
    }

    /// Returns the task the commit references.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the raw commit message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the commit timestamp.
    #[must_use]
    pub const fn committed_at(&self) -> DateTime<Utc> {
        self.committed_at
    }

    /// Returns the paths touched by the commit.
    #[must_use]
    pub const fn files(&self) -> &BTreeSet<String> {
        &self.files
    }
}
