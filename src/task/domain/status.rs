//! Task and project lifecycle states and the tracker status mapping.

use super::ParseStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Candidate task awaiting operator confirmation.
    Proposed,
    /// Accepted by the operator, not yet on the tracker.
    Confirmed,
    /// Present on the tracker, work not started.
    Backlog,
    /// Work is under way on the task branch.
    InProgress,
    /// Work is committed and complete.
    Done,
    /// Task was abandoned.
    Cancelled,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proposed => "proposed",
            Self::Confirmed => "confirmed",
            Self::Backlog => "backlog",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` when no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    /// Returns `true` for states in which a task branch must exist.
    #[must_use]
    pub const fn requires_branch(self) -> bool {
        matches!(self, Self::InProgress | Self::Done)
    }

    /// Returns `true` if the lifecycle permits moving to `target`.
    ///
    /// Guards that depend on the surrounding project (dependencies, focus
    /// lock, commits, remote binding) are enforced by [`super::Project`].
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Proposed, Self::Confirmed)
            | (Self::Confirmed, Self::Backlog)
            | (Self::Backlog, Self::InProgress)
            | (Self::InProgress, Self::Done) => true,
            (from, Self::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Returns the tracker workflow category this state maps to.
    #[must_use]
    pub const fn workflow_category(self) -> WorkflowCategory {
        match self {
            Self::Proposed | Self::Confirmed | Self::Backlog => WorkflowCategory::Backlog,
            Self::InProgress => WorkflowCategory::Started,
            Self::Done => WorkflowCategory::Completed,
            Self::Cancelled => WorkflowCategory::Cancelled,
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "proposed" => Ok(Self::Proposed),
            "confirmed" => Ok(Self::Confirmed),
            "backlog" => Ok(Self::Backlog),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseStateError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracker workflow-state categories that the engine reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowCategory {
    /// Not yet started.
    Backlog,
    /// Work in progress.
    Started,
    /// Finished.
    Completed,
    /// Abandoned.
    Cancelled,
}

impl WorkflowCategory {
    /// Returns the tracker's category name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a tracker category name, returning `None` for categories the
    /// engine does not map (for example `triage` or `unstarted`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "backlog" => Some(Self::Backlog),
            "started" => Some(Self::Started),
            "completed" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for WorkflowCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    /// Created, no candidate tasks yet.
    Draft,
    /// Candidate tasks await operator edits.
    TasksProposed,
    /// The operator accepted the task set.
    TasksConfirmed,
    /// The first projection onto the tracker is under way.
    Syncing,
    /// Tasks are tracked remotely and work may start.
    Active,
    /// Every non-cancelled task is done.
    Completed,
}

impl ProjectState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::TasksProposed => "tasks_proposed",
            Self::TasksConfirmed => "tasks_confirmed",
            Self::Syncing => "syncing",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Returns `true` if the project lifecycle permits moving to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::TasksProposed | Self::TasksConfirmed)
                | (Self::TasksProposed, Self::TasksConfirmed)
                | (Self::TasksConfirmed, Self::Syncing)
                | (Self::Syncing, Self::Active)
                | (Self::Active, Self::Completed)
        )
    }

    /// Returns `true` while candidate tasks may still be edited.
    #[must_use]
    pub const fn accepts_edits(self) -> bool {
        matches!(self, Self::Draft | Self::TasksProposed)
    }

    /// Returns `true` once the task set has been confirmed.
    #[must_use]
    pub const fn is_confirmed(self) -> bool {
        !self.accepts_edits()
    }
}

impl TryFrom<&str> for ProjectState {
    type Error = ParseStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "draft" => Ok(Self::Draft),
            "tasks_proposed" => Ok(Self::TasksProposed),
            "tasks_confirmed" => Ok(Self::TasksConfirmed),
            "syncing" => Ok(Self::Syncing),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseStateError(value.to_owned())),
        }
    }
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
