//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier! {
    /// Stable local identifier of a task, generated once at creation.
    TaskId
}

uuid_identifier! {
    /// Unique identifier of a project.
    ProjectId
}

/// Tracker-assigned human identifier such as `ABC-123`.
///
/// Only authoritative after a successful push. The format is one or more
/// ASCII letters, a single dash, then one or more ASCII digits.
///
/// # Examples
///
///     use taskbridge::task::domain::RemoteId;
///
///     let id = RemoteId::new("ABC-123").expect("valid");
///     assert_eq!(id.team_key(), "ABC");
///     assert!(RemoteId::new("ABC123").is_err());
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteId(String);

impl RemoteId {
    /// Creates a validated remote identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidRemoteId`] when the value does not
    /// match the tracker identifier pattern.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        if !Self::is_valid(&raw) {
            return Err(TaskDomainError::InvalidRemoteId(raw));
        }
        Ok(Self(raw))
    }

    /// Returns `true` when `value` matches the tracker identifier pattern.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        let Some((key, number)) = value.split_once('-') else {
            return false;
        };
        !key.is_empty()
            && !number.is_empty()
            && key.chars().all(|c| c.is_ascii_alphabetic())
            && number.chars().all(|c| c.is_ascii_digit())
    }

    /// Returns the team key portion (`ABC` in `ABC-123`).
    #[must_use]
    pub fn team_key(&self) -> &str {
        self.0.split_once('-').map_or("", |(key, _)| key)
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RemoteId {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RemoteId> for String {
    fn from(value: RemoteId) -> Self {
        value.0
    }
}

impl AsRef<str> for RemoteId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Abbreviated or full git object name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitHash(String);

impl CommitHash {
    const MIN_LENGTH: usize = 4;
    const MAX_LENGTH: usize = 64;

    /// Creates a validated commit hash, normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidCommitHash`] when the value is not
    /// 4-64 hexadecimal characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let is_valid = (Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&normalized.len())
            && normalized.chars().all(|c| c.is_ascii_hexdigit());
        if !is_valid {
            return Err(TaskDomainError::InvalidCommitHash(raw));
        }
        Ok(Self(normalized.to_ascii_lowercase()))
    }

    /// Returns the hash as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitHash {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommitHash> for String {
    fn from(value: CommitHash) -> Self {
        value.0
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
