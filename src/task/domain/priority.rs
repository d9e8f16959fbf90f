//! Four-level task priority.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Task priority, most urgent first: `P0 > P1 > P2 > P3`.
///
/// The tracker encodes priority as an integer where `0` means "no priority"
/// and is never produced by this crate; `P0` maps to `1` through `P3` to `4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Urgent.
    P0,
    /// High.
    P1,
    /// Medium.
    P2,
    /// Low.
    P3,
}

impl Priority {
    /// All priorities, most urgent first.
    pub const ALL: [Self; 4] = [Self::P0, Self::P1, Self::P2, Self::P3];

    /// Returns the canonical text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
        }
    }

    /// Returns the tracker's integer encoding (`1..=4`).
    #[must_use]
    pub const fn tracker_value(self) -> u8 {
        match self {
            Self::P0 => 1,
            Self::P1 => 2,
            Self::P2 => 3,
            Self::P3 => 4,
        }
    }

    /// Decodes the tracker's integer encoding.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidPriority`] for `0` (reserved) and
    /// values above `4`.
    pub fn from_tracker_value(value: u8) -> Result<Self, TaskDomainError> {
        match value {
            1 => Ok(Self::P0),
            2 => Ok(Self::P1),
            3 => Ok(Self::P2),
            4 => Ok(Self::P3),
            _ => Err(TaskDomainError::InvalidPriority(value.to_string())),
        }
    }

    const fn urgency(self) -> u8 {
        4 - self.tracker_value()
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.urgency().cmp(&other.urgency())
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<&str> for Priority {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "P0" => Ok(Self::P0),
            "P1" => Ok(Self::P1),
            "P2" => Ok(Self::P2),
            "P3" => Ok(Self::P3),
            _ => Err(TaskDomainError::InvalidPriority(value.to_owned())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
