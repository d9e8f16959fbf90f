//! Issue payloads exchanged with the tracker.

use crate::task::domain::{
    CreationKey, Fingerprint, Priority, RemoteId, Task, WorkflowCategory,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a tracker workflow state as reported remotely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum RemoteStateCategory {
    /// One of the four categories the engine reconciles.
    Mapped(WorkflowCategory),
    /// Any other category (`triage`, `unstarted`, custom types).
    Unmapped(String),
}

impl RemoteStateCategory {
    /// Classifies a raw tracker category name.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        WorkflowCategory::parse(value)
            .map_or_else(|| Self::Unmapped(value.trim().to_owned()), Self::Mapped)
    }

    /// Returns the mapped category, if any.
    #[must_use]
    pub const fn mapped(&self) -> Option<WorkflowCategory> {
        match self {
            Self::Mapped(category) => Some(*category),
            Self::Unmapped(_) => None,
        }
    }
}

impl fmt::Display for RemoteStateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapped(category) => write!(f, "{category}"),
            Self::Unmapped(name) => write!(f, "unmapped({name})"),
        }
    }
}

/// A workflow state configured for a tracker team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Tracker-internal state identifier.
    pub id: String,
    /// Display name, for example `In Progress`.
    pub name: String,
    /// State category.
    pub category: RemoteStateCategory,
}

impl WorkflowState {
    /// Creates a workflow state from raw tracker values.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: RemoteStateCategory::parse(category),
        }
    }
}

/// Request to create an issue for a local task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIssueRequest {
    /// Tracker team identifier.
    pub team: String,
    /// Issue title.
    pub title: String,
    /// Issue description.
    pub description: Option<String>,
    /// Issue priority.
    pub priority: Priority,
    /// Tracker project the issue belongs to.
    pub project_id: Option<String>,
    /// Initial workflow state; `None` leaves the tracker default.
    pub state_id: Option<String>,
    /// Label names to apply.
    pub labels: Vec<String>,
    /// Key the tracker stores so the issue can be found again after a
    /// partially failed creation.
    pub creation_key: CreationKey,
}

impl CreateIssueRequest {
    /// Builds the creation request for a task.
    #[must_use]
    pub fn for_task(team: &str, task: &Task, creation_key: CreationKey) -> Self {
        Self {
            team: team.to_owned(),
            title: task.title().to_owned(),
            description: task.description().map(str::to_owned),
            priority: task.priority(),
            project_id: None,
            state_id: None,
            labels: Vec::new(),
            creation_key,
        }
    }

    /// Sets the tracker project.
    #[must_use]
    pub fn with_project_id(mut self, project_id: Option<String>) -> Self {
        self.project_id = project_id;
        self
    }

    /// Sets label names.
    #[must_use]
    pub fn with_labels(mut self, labels: impl IntoIterator<Item = String>) -> Self {
        self.labels = labels.into_iter().collect();
        self
    }
}

/// Issue identity returned by creation or lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    /// Human identifier, for example `ABC-123`.
    pub remote_id: RemoteId,
    /// Browser URL of the issue.
    pub url: Option<String>,
}

/// Field update pushed to an existing issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueUpdate {
    /// Replacement title.
    pub title: String,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement priority.
    pub priority: Priority,
    /// Target workflow state when the category changed.
    pub state_id: Option<String>,
}

impl IssueUpdate {
    /// Builds an update carrying the task's current fields.
    #[must_use]
    pub fn from_task(task: &Task, state_id: Option<String>) -> Self {
        Self {
            title: task.title().to_owned(),
            description: task.description().map(str::to_owned),
            priority: task.priority(),
            state_id,
        }
    }
}

/// Issue fields as currently observed on the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIssue {
    /// Human identifier.
    pub remote_id: RemoteId,
    /// Current title.
    pub title: String,
    /// Current description.
    pub description: Option<String>,
    /// Current priority.
    pub priority: Priority,
    /// Current workflow state category.
    pub state: RemoteStateCategory,
}

impl RemoteIssue {
    /// Fingerprints the observed fields.
    ///
    /// An unmapped remote state is not reconciled, so `pushed_category`
    /// stands in for it and the state alone never registers as drift.
    #[must_use]
    pub fn fingerprint(&self, pushed_category: WorkflowCategory) -> Fingerprint {
        let category = self.state.mapped().unwrap_or(pushed_category);
        Fingerprint::compute(
            &self.title,
            self.description.as_deref(),
            self.priority,
            category,
        )
    }
}
