//! Per-task record of the last successful tracker reconciliation.

use super::{Fingerprint, RemoteId, WorkflowCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last-pushed state of a task on the tracker.
///
/// Exists only once a task has a remote id and is owned by that task; it is
/// dropped with the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    remote_id: RemoteId,
    url: Option<String>,
    fingerprint: Fingerprint,
    category: WorkflowCategory,
    synced_at: DateTime<Utc>,
    diverged: bool,
}

impl SyncRecord {
    /// Creates a record for a successful push.
    #[must_use]
    pub const fn new(
        remote_id: RemoteId,
        fingerprint: Fingerprint,
        category: WorkflowCategory,
        synced_at: DateTime<Utc>,
    ) -> Self {
        Self {
            remote_id,
            url: None,
            fingerprint,
            category,
            synced_at,
            diverged: false,
        }
    }

    /// Attaches the tracker URL of the issue.
    #[must_use]
    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    /// Returns the remote identifier.
    #[must_use]
    pub const fn remote_id(&self) -> &RemoteId {
        &self.remote_id
    }

    /// Returns the tracker URL, if reported.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Returns the fingerprint as last pushed.
    #[must_use]
    pub const fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Returns the workflow category as last pushed.
    #[must_use]
    pub const fn category(&self) -> WorkflowCategory {
        self.category
    }

    /// Returns the time of the last successful push.
    #[must_use]
    pub const fn synced_at(&self) -> DateTime<Utc> {
        self.synced_at
    }

    /// Returns `true` when both sides changed since the last push.
    #[must_use]
    pub const fn is_diverged(&self) -> bool {
        self.diverged
    }

    pub(crate) const fn mark_diverged(&mut self) {
        self.diverged = true;
    }

    /// Records a newer successful push, clearing any divergence.
    pub(crate) fn refresh(
        &mut self,
        fingerprint: Fingerprint,
        category: WorkflowCategory,
        synced_at: DateTime<Utc>,
    ) {
        self.fingerprint = fingerprint;
        self.category = category;
        self.synced_at = synced_at;
        self.diverged = false;
    }
}
