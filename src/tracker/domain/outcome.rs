//! Results of a tracker push.

use crate::task::domain::RemoteId;

/// What a push did for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// A new issue was created and bound to the task.
    Created(RemoteId),
    /// An issue left behind by an earlier, partially failed push was found
    /// by its creation key and bound instead of creating a duplicate.
    Adopted(RemoteId),
    /// Changed local fields were pushed to the existing issue.
    Updated(RemoteId),
    /// Nothing changed since the last push.
    Unchanged(RemoteId),
    /// Only the tracker changed; local state was left alone.
    RemoteAhead(RemoteId),
    /// Retries were exhausted; the task is now `sync-pending`.
    Pending {
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// Nothing to push (cancelled before ever reaching the tracker).
    Skipped,
}

impl PushOutcome {
    /// Returns `true` when the task is bound and in step with the tracker.
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        matches!(
            self,
            Self::Created(_) | Self::Adopted(_) | Self::Updated(_) | Self::Unchanged(_)
        )
    }

    /// Returns `true` when retries were exhausted.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}
