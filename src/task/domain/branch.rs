//! Branch naming derived from tracker identifiers.

use super::{RemoteId, TaskDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a branch prefix.
const MAX_PREFIX_LENGTH: usize = 64;

/// Leading segment of every task branch name, for example `feature`.
///
/// Prefixes must be non-empty after trimming and may only contain ASCII
/// alphanumerics, `-`, `_` and `/`. They must not begin or end with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchPrefix(String);

impl BranchPrefix {
    /// Creates a validated branch prefix.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidBranchPrefix`] when the value is
    /// empty, too long, or contains characters unsafe in a ref name.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if Self::is_invalid_prefix(normalized) {
            return Err(TaskDomainError::InvalidBranchPrefix(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    fn is_invalid_prefix(prefix: &str) -> bool {
        let is_empty = prefix.is_empty();
        let exceeds_length_limit = prefix.len() > MAX_PREFIX_LENGTH;
        let has_forbidden_char = !prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/'));
        let has_bad_edges = prefix.starts_with('/') || prefix.ends_with('/');

        is_empty || exceeds_length_limit || has_forbidden_char || has_bad_edges
    }

    /// Returns the prefix as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchPrefix {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchPrefix> for String {
    fn from(value: BranchPrefix) -> Self {
        value.0
    }
}

impl fmt::Display for BranchPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task branch name, always `<prefix>-<remote-id>`.
///
/// Branch names are a pure function of the prefix and the remote id and are
/// never stored on a task, so the two cannot drift apart.
///
/// # Examples
///
///     use taskbridge::task::domain::{BranchName, BranchPrefix, RemoteId};
///
///     let prefix = BranchPrefix::new("feature").expect("valid prefix");
///     let remote_id = RemoteId::new("ABC-123").expect("valid remote id");
///     let branch = BranchName::derive(&prefix, &remote_id);
///     assert_eq!(branch.as_str(), "feature-ABC-123");
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    /// Derives the branch name for a remote identifier.
    #[must_use]
    pub fn derive(prefix: &BranchPrefix, remote_id: &RemoteId) -> Self {
        Self(format!("{prefix}-{remote_id}"))
    }

    /// Returns the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
