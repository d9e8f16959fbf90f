//! Maps task transitions onto branch and commit actions.

use crate::task::domain::{
    BranchName, CommitRecord, ErrorClass, Project, TaskDomainError, TaskId, TaskStatus,
    WorkflowCategory,
};
use crate::vcs::{
    domain::{CommitMessage, CommitResult, HistoryReport, subject_reference},
    ports::{VcsError, VersionControl},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fixed-string pattern matching every subject that may carry a reference
/// token.
const REFERENCE_PATTERN: &str = "[";

/// Service-level errors for version-control actions.
#[derive(Debug, Error)]
pub enum VcsLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The version-control tool failed; reported verbatim.
    #[error(transparent)]
    Vcs(#[from] VcsError),
}

impl VcsLifecycleError {
    /// Returns the failure class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Domain(err) => err.class(),
            Self::Vcs(err) => err.class(),
        }
    }
}

/// Result type for version-control lifecycle operations.
pub type VcsLifecycleResult<T> = Result<T, VcsLifecycleError>;

/// Drives the version-control collaborator on behalf of tasks.
///
/// Calls are made exactly once; failures are never retried.
#[derive(Clone)]
pub struct VcsLifecycleEngine<V, C>
where
    V: VersionControl,
    C: Clock + Send + Sync,
{
    vcs: Arc<V>,
    clock: Arc<C>,
}

impl<V, C> VcsLifecycleEngine<V, C>
where
    V: VersionControl,
    C: Clock + Send + Sync,
{
    /// Creates an engine over a version-control adapter.
    #[must_use]
    pub const fn new(vcs: Arc<V>, clock: Arc<C>) -> Self {
        Self { vcs, clock }
    }

    /// Creates or checks out the task branch.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotSynced`] when the task has no remote id
    /// and [`VcsLifecycleError::Vcs`] when the tool fails.
    pub async fn start_branch(
        &self,
        project: &Project,
        task_id: TaskId,
    ) -> VcsLifecycleResult<BranchName> {
        let task = project.require_task(task_id)?;
        let remote_id = task
            .remote_id()
            .ok_or(TaskDomainError::NotSynced(task_id))?;
        let branch = BranchName::derive(project.branch_prefix(), remote_id);
        self.vcs.create_or_checkout_branch(&branch).await?;
        info!(%task_id, branch = %branch, "checked out task branch");
        Ok(branch)
    }

    /// Validates `message`, commits `paths` and records the commit on the
    /// task.
    ///
    /// A [`CommitResult::NoChanges`] outcome records nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MalformedReference`] before touching the
    /// repository when the message breaks the grammar,
    /// [`TaskDomainError::ReferenceMismatch`] when it names another task,
    /// [`TaskDomainError::NotInProgress`] when the task is not in progress
    /// and [`VcsLifecycleError::Vcs`] when the tool fails.
    pub async fn commit(
        &self,
        project: &mut Project,
        task_id: TaskId,
        message: &str,
        paths: &[String],
    ) -> VcsLifecycleResult<CommitResult> {
        let parsed = CommitMessage::parse(message)?;
        let task = project.require_task(task_id)?;
        let remote_id = task
            .remote_id()
            .ok_or(TaskDomainError::NotSynced(task_id))?;
        if parsed.remote_id() != remote_id {
            return Err(TaskDomainError::ReferenceMismatch {
                expected: remote_id.clone(),
                found: parsed.remote_id().clone(),
            }
            .into());
        }
        if task.status() != TaskStatus::InProgress {
            return Err(TaskDomainError::NotInProgress(task_id).into());
        }

        let wire_message = parsed.to_string();
        let result = self.vcs.stage_and_commit(&wire_message, paths).await?;
        match &result {
            CommitResult::Committed(hash) => {
                let record = CommitRecord::new(
                    hash.clone(),
                    task_id,
                    wire_message,
                    self.clock.utc(),
                    paths.iter().cloned(),
                );
                project.record_commit(task_id, record, &*self.clock)?;
                info!(%task_id, commit = %hash, "recorded task commit");
            }
            CommitResult::NoChanges => {
                debug!(%task_id, "nothing to commit");
            }
        }
        Ok(result)
    }

    /// Publishes the branch of an in-progress task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotInProgress`] when the task has no
    /// branch yet and [`VcsLifecycleError::Vcs`] when the push fails.
    pub async fn push_branch(
        &self,
        project: &Project,
        task_id: TaskId,
    ) -> VcsLifecycleResult<BranchName> {
        project.require_task(task_id)?;
        let branch = project
            .branch_for(task_id)
            .ok_or(TaskDomainError::NotInProgress(task_id))?;
        self.vcs.push(&branch).await?;
        info!(%task_id, branch = %branch, "pushed task branch");
        Ok(branch)
    }

    /// Scans commit history for reference tokens and reports which tasks
    /// have commits. Nothing is mutated.
    ///
    /// # Errors
    ///
    /// Returns [`VcsLifecycleError::Vcs`] when the log cannot be read.
    pub async fn aggregate_history(&self, project: &Project) -> VcsLifecycleResult<HistoryReport> {
        let entries = self.vcs.log(REFERENCE_PATTERN).await?;
        let mut report = HistoryReport::default();

        for entry in entries {
            let Some(reference) = subject_reference(entry.subject()) else {
                continue;
            };
            match project
                .tasks()
                .iter()
                .find(|task| task.remote_id() == Some(&reference))
            {
                Some(task) => report
                    .commits_by_task
                    .entry(task.id())
                    .or_default()
                    .push(entry.hash),
                None => report
                    .unknown_references
                    .entry(reference)
                    .or_default()
                    .push(entry.hash),
            }
        }

        for task in project.tasks() {
            let has_history = report.commits_by_task.contains_key(&task.id());
            match task.status() {
                TaskStatus::Done => {
                    let tracker_completed = !task.is_sync_pending()
                        && task
                            .sync_record()
                            .is_some_and(|record| record.category() == WorkflowCategory::Completed);
                    if !tracker_completed {
                        report.done_without_tracker_update.push(task.id());
                    }
                }
                TaskStatus::Cancelled => {}
                _ if has_history => report.committed_but_open.push(task.id()),
                _ => {}
            }
        }

        if !report.is_consistent() {
            warn!(
                tasks = report.done_without_tracker_update.len(),
                "done tasks have not reached the tracker"
            );
        }
        Ok(report)
    }

    /// Rewinds the most recent commit and drops its commit record.
    ///
    /// Returns the removed record, or `None` when the undone commit was not
    /// made through this engine.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskSealed`] without touching the
    /// repository when the newest commit belongs to a done or cancelled
    /// task, and [`VcsLifecycleError::Vcs`] when the tool fails.
    pub async fn undo_last_commit(
        &self,
        project: &mut Project,
    ) -> VcsLifecycleResult<Option<CommitRecord>> {
        if let Some(head) = self.vcs.head().await? {
            project.ensure_commit_removable(&head)?;
        }
        let hash = self.vcs.soft_undo().await?;
        let removed = project.forget_commit(&hash, &*self.clock);
        match &removed {
            Some(record) => {
                info!(task_id = %record.task_id(), commit = %hash, "undid task commit");
            }
            None => warn!(commit = %hash, "undid a commit that no task recorded"),
        }
        Ok(removed)
    }
}
