//! Drift assessment between local fields, the last push and the tracker.

use super::RemoteIssue;
use crate::task::domain::{Fingerprint, SyncRecord};

/// Which side changed since the last successful push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Drift {
    /// Neither side changed.
    InSync,
    /// Only local fields changed; an update push is due.
    LocalAhead,
    /// Only the tracker changed; nothing is pushed.
    RemoteAhead,
    /// Both sides changed; requires force-push or force-pull.
    Diverged,
}

impl Drift {
    /// Compares the stored fingerprint with the current local fingerprint and
    /// an optional fresh remote observation.
    ///
    /// Without an observation the remote side is assumed unchanged.
    #[must_use]
    pub fn assess(
        record: &SyncRecord,
        local: Fingerprint,
        observed: Option<&RemoteIssue>,
    ) -> Self {
        let stored = record.fingerprint();
        let local_changed = local != stored;
        let remote_changed =
            observed.is_some_and(|issue| issue.fingerprint(record.category()) != stored);

        match (local_changed, remote_changed) {
            (false, false) => Self::InSync,
            (true, false) => Self::LocalAhead,
            (false, true) => Self::RemoteAhead,
            (true, true) => Self::Diverged,
        }
    }
}
