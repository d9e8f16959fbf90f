//! Content fingerprints used for drift detection and idempotent creation.

use super::{Priority, ProjectId, WorkflowCategory};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Field separator that cannot appear in normalized titles.
const SEPARATOR: u8 = 0x1f;

/// Lowercases and collapses whitespace so that titles compare by content.
///
/// # Examples
///
///     use taskbridge::task::domain::normalize_title;
///
///     assert_eq!(normalize_title("  Add   Search "), "add search");
#[must_use]
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// SHA-256 of the sync-relevant task fields as last pushed or observed.
///
/// Covers title, description, priority and the tracker workflow category.
/// Using the category rather than the raw task status keeps the
/// fingerprint stable across `Confirmed -> Backlog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Computes the fingerprint of a set of fields.
    #[must_use]
    pub fn compute(
        title: &str,
        description: Option<&str>,
        priority: Priority,
        category: WorkflowCategory,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(title.trim().as_bytes());
        hasher.update([SEPARATOR]);
        hasher.update(description.map(str::trim).unwrap_or_default().as_bytes());
        hasher.update([SEPARATOR]);
        hasher.update([priority.tracker_value()]);
        hasher.update([SEPARATOR]);
        hasher.update(category.as_str().as_bytes());
        Self(hasher.finalize().into())
    }

    /// Returns the lowercase hexadecimal digest.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Deterministic key identifying "this project's task with this title" on
/// the tracker, independent of whether a remote id was ever recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreationKey(String);

impl CreationKey {
    /// Derives the key from the project and the task's normalized title.
    #[must_use]
    pub fn derive(project_id: ProjectId, title: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(project_id.into_inner().as_bytes());
        hasher.update([SEPARATOR]);
        hasher.update(normalize_title(title).as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Returns the key as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CreationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
