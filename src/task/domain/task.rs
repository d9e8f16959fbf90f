//! Task entity and its editable fields.

use super::{
    BranchName, BranchPrefix, CommitHash, CommitRecord, Fingerprint, Priority, RemoteId,
    SyncRecord, TaskDomainError, TaskId, TaskStatus, normalize_title,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Input for creating a task inside a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    priority: Priority,
    description: Option<String>,
    dependencies: BTreeSet<TaskId>,
}

impl NewTask {
    /// Creates task input with the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            priority,
            description: None,
            dependencies: BTreeSet::new(),
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares dependencies on tasks already present in the project.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = TaskId>) -> Self {
        self.dependencies = dependencies.into_iter().collect();
        self
    }

    /// Returns the requested title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the requested dependencies.
    #[must_use]
    pub const fn dependencies(&self) -> &BTreeSet<TaskId> {
        &self.dependencies
    }
}

/// Partial update of a task's editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// Replacement priority.
    pub priority: Option<Priority>,
}

impl TaskPatch {
    /// Sets the replacement title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the replacement description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Clears the description.
    #[must_use]
    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    /// Sets the replacement priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Returns `true` when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.priority.is_none()
    }
}

/// Trims a title and rejects it when empty.
pub(crate) fn validated_title(title: &str) -> Result<String, TaskDomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}

fn normalized_description(description: Option<String>) -> Option<String> {
    description
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// A unit of work owned by a [`super::Project`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: Option<String>,
    priority: Priority,
    status: TaskStatus,
    dependencies: BTreeSet<TaskId>,
    sync_record: Option<SyncRecord>,
    sync_pending: bool,
    commits: Vec<CommitRecord>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a proposed task from validated input.
    pub(crate) fn create(input: NewTask, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let title = validated_title(&input.title)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            title,
            description: normalized_description(input.description),
            priority: input.priority,
            status: TaskStatus::Proposed,
            dependencies: input.dependencies,
            sync_record: None,
            sync_pending: false,
            commits: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Returns the local task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the title in comparison form.
    #[must_use]
    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the task priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the tasks this task depends on.
    #[must_use]
    pub const fn dependencies(&self) -> &BTreeSet<TaskId> {
        &self.dependencies
    }

    /// Returns the tracker identifier once the first push succeeded.
    #[must_use]
    pub fn remote_id(&self) -> Option<&RemoteId> {
        self.sync_record.as_ref().map(SyncRecord::remote_id)
    }

    /// Returns the sync record once the task is bound to the tracker.
    #[must_use]
    pub const fn sync_record(&self) -> Option<&SyncRecord> {
        self.sync_record.as_ref()
    }

    /// Returns `true` when the last tracker operation exhausted its retries.
    #[must_use]
    pub const fn is_sync_pending(&self) -> bool {
        self.sync_pending
    }

    /// Returns the commits made for this task, oldest first.
    #[must_use]
    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the fingerprint of the task's current sync-relevant fields.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(
            &self.title,
            self.description.as_deref(),
            self.priority,
            self.status.workflow_category(),
        )
    }

    /// Returns `true` when local fields differ from what was last pushed.
    #[must_use]
    pub fn has_unpushed_changes(&self) -> bool {
        self.sync_record
            .as_ref()
            .is_none_or(|record| record.fingerprint() != self.fingerprint())
    }

    /// Returns the task branch once work has started.
    #[must_use]
    pub fn branch_name(&self, prefix: &BranchPrefix) -> Option<BranchName> {
        if !self.status.requires_branch() {
            return None;
        }
        self.remote_id()
            .map(|remote_id| BranchName::derive(prefix, remote_id))
    }

    /// Returns `true` if at least one commit references the remote id.
    #[must_use]
    pub fn has_referencing_commit(&self) -> bool {
        let Some(remote_id) = self.remote_id() else {
            return false;
        };
        let token = format!("[{remote_id}]");
        self.commits
            .iter()
            .any(|commit| commit.message().starts_with(&token))
    }

    pub(crate) fn ensure_editable(&self) -> Result<(), TaskDomainError> {
        if self.status.is_terminal() {
            return Err(TaskDomainError::TaskSealed(self.id));
        }
        Ok(())
    }

    pub(crate) fn apply_patch(
        &mut self,
        patch: TaskPatch,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_editable()?;
        let title = patch
            .title
            .as_deref()
            .map(validated_title)
            .transpose()?;
        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(description) = patch.description {
            self.description = normalized_description(description);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        self.touch(clock);
        Ok(())
    }

    /// Overwrites sync-relevant fields with values observed on the tracker.
    pub(crate) fn overwrite_fields(
        &mut self,
        title: &str,
        description: Option<String>,
        priority: Priority,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.title = validated_title(title)?;
        self.description = normalized_description(description);
        self.priority = priority;
        self.touch(clock);
        Ok(())
    }

    pub(crate) fn set_status(&mut self, status: TaskStatus, clock: &impl Clock) {
        self.status = status;
        self.touch(clock);
    }

    pub(crate) fn add_dependency(&mut self, dependency: TaskId) {
        self.dependencies.insert(dependency);
    }

    pub(crate) fn remove_dependency(&mut self, dependency: TaskId) -> bool {
        self.dependencies.remove(&dependency)
    }

    /// Binds the task to the tracker after its first successful push.
    pub(crate) fn bind_remote(
        &mut self,
        record: SyncRecord,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if let Some(existing) = self.remote_id() {
            return Err(TaskDomainError::AlreadySynced {
                task_id: self.id,
                remote_id: existing.clone(),
            });
        }
        self.sync_record = Some(record);
        self.sync_pending = false;
        self.touch(clock);
        Ok(())
    }

    pub(crate) const fn sync_record_mut(&mut self) -> Option<&mut SyncRecord> {
        self.sync_record.as_mut()
    }

    pub(crate) const fn set_sync_pending(&mut self, pending: bool) {
        self.sync_pending = pending;
    }

    pub(crate) fn append_commit(&mut self, record: CommitRecord, clock: &impl Clock) {
        self.commits.push(record);
        self.touch(clock);
    }

    pub(crate) fn remove_commit(
        &mut self,
        hash: &CommitHash,
        clock: &impl Clock,
    ) -> Option<CommitRecord> {
        let position = self
            .commits
            .iter()
            .position(|commit| commit.hash() == hash)?;
        let removed = self.commits.remove(position);
        self.touch(clock);
        Some(removed)
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
