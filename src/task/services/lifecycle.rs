//! Service layer driving tasks through their lifecycle.
//!
//! Each operation loads the project, mutates a working copy, calls the
//! tracker and version-control collaborators, and persists only when the
//! operation succeeds. `sync-pending` and `diverged` markers are the
//! exception: they are persisted even when the operation reports failure.
//! Every push of a bound task reads its issue back from the tracker first,
//! so tracker-side edits are never overwritten silently.

use crate::task::{
    domain::{
        BranchName, BranchPrefix, CommitRecord, ErrorClass, Project, ProjectId, ProjectState,
        TaskDomainError, TaskId, TaskPatch, TaskStatus,
    },
    ports::{ProjectRepository, ProjectRepositoryError},
};
use crate::tracker::{
    domain::{PushOutcome, RemoteIssue, SyncConfig},
    ports::IssueTracker,
    services::{TrackerSyncEngine, TrackerSyncError},
};
use crate::vcs::{
    domain::{CommitResult, HistoryReport},
    ports::VersionControl,
    services::{VcsLifecycleEngine, VcsLifecycleError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ProjectRepositoryError),
    /// Tracker synchronization failed.
    #[error(transparent)]
    Tracker(#[from] TrackerSyncError),
    /// A version-control action failed.
    #[error(transparent)]
    Vcs(#[from] VcsLifecycleError),
}

impl TaskLifecycleError {
    /// Returns the failure class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Domain(err) => err.class(),
            Self::Repository(err) => err.class(),
            Self::Tracker(err) => err.class(),
            Self::Vcs(err) => err.class(),
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// How an operator resolves a diverged task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictResolution {
    /// Overwrite the tracker with local fields.
    ForcePush,
    /// Overwrite local fields with the tracker's.
    ForcePull,
}

/// Per-task push results of a project-wide sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Push outcome for each task visited, in project order.
    pub outcomes: Vec<(TaskId, PushOutcome)>,
}

impl SyncReport {
    /// Returns the tasks left `sync-pending`.
    #[must_use]
    pub fn pending(&self) -> Vec<TaskId> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_pending())
            .map(|(task_id, _)| *task_id)
            .collect()
    }

    /// Returns the outcome recorded for `task_id`.
    #[must_use]
    pub fn outcome_for(&self, task_id: TaskId) -> Option<&PushOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == task_id)
            .map(|(_, outcome)| outcome)
    }
}

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, T, V, C>
where
    R: ProjectRepository,
    T: IssueTracker,
    V: VersionControl,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    tracker: TrackerSyncEngine<T, C>,
    vcs: VcsLifecycleEngine<V, C>,
    clock: Arc<C>,
}

impl<R, T, V, C> TaskLifecycleService<R, T, V, C>
where
    R: ProjectRepository,
    T: IssueTracker,
    V: VersionControl,
    C: Clock + Send + Sync,
{
    /// Creates a lifecycle service with default tracker configuration.
    #[must_use]
    pub fn new(repository: Arc<R>, tracker: Arc<T>, vcs: Arc<V>, clock: Arc<C>) -> Self {
        Self::with_config(repository, tracker, vcs, clock, SyncConfig::default())
    }

    /// Creates a lifecycle service with explicit tracker configuration.
    #[must_use]
    pub fn with_config(
        repository: Arc<R>,
        tracker: Arc<T>,
        vcs: Arc<V>,
        clock: Arc<C>,
        config: SyncConfig,
    ) -> Self {
        Self {
            repository,
            tracker: TrackerSyncEngine::with_config(tracker, Arc::clone(&clock), config),
            vcs: VcsLifecycleEngine::new(vcs, Arc::clone(&clock)),
            clock,
        }
    }

    /// Creates and stores an empty project.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for a blank name or invalid
    /// branch prefix and [`TaskLifecycleError::Repository`] when the name is
    /// taken.
    pub async fn create_project(
        &self,
        name: &str,
        branch_prefix: &str,
    ) -> TaskLifecycleResult<Project> {
        let prefix = BranchPrefix::new(branch_prefix)?;
        let project = Project::new(name, prefix, &*self.clock)?;
        self.repository.store(&project).await?;
        info!(project_id = %project.id(), name = project.name(), "created project");
        Ok(project)
    }

    /// Retrieves a project by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] on persistence failures.
    pub async fn find_project(
        &self,
        project_id: ProjectId,
    ) -> TaskLifecycleResult<Option<Project>> {
        Ok(self.repository.find_by_id(project_id).await?)
    }

    /// Retrieves a project by name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] on persistence failures.
    pub async fn find_project_by_name(&self, name: &str) -> TaskLifecycleResult<Option<Project>> {
        Ok(self.repository.find_by_name(name).await?)
    }

    /// Projects every task of a confirmed project onto the tracker.
    ///
    /// Moves the project `TasksConfirmed -> Syncing -> Active` and each
    /// newly bound task `Confirmed -> Backlog`. Tasks whose push exhausts
    /// its retries stay `Confirmed` and `sync-pending`. Running the sync
    /// again on a `Syncing` or `Active` project re-pushes only what changed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ProjectStateMismatch`] before the task list
    /// is confirmed and the first non-retryable push error. Bindings made
    /// before that error are kept.
    pub async fn sync_project(&self, project_id: ProjectId) -> TaskLifecycleResult<SyncReport> {
        let mut project = self.load(project_id).await?;
        match project.state() {
            ProjectState::TasksConfirmed => {
                project.transition_project(ProjectState::Syncing, &*self.clock)?;
            }
            ProjectState::Syncing | ProjectState::Active => {}
            state @ (ProjectState::Draft
            | ProjectState::TasksProposed
            | ProjectState::Completed) => {
                return Err(TaskDomainError::ProjectStateMismatch(state).into());
            }
        }

        let task_ids: Vec<TaskId> = project.tasks().iter().map(|task| task.id()).collect();
        let report = match self.push_all(&mut project, &task_ids).await {
            Ok(report) => report,
            Err(err) => {
                self.repository.update(&project).await?;
                return Err(err);
            }
        };

        if project.state() == ProjectState::Syncing {
            project.transition_project(ProjectState::Active, &*self.clock)?;
        }
        self.repository.update(&project).await?;
        info!(
            %project_id,
            tasks = report.outcomes.len(),
            pending = report.pending().len(),
            "synced project to tracker"
        );
        Ok(report)
    }

    /// Retries every `sync-pending` task.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable push error; progress made before it
    /// is kept.
    pub async fn resume_pending(&self, project_id: ProjectId) -> TaskLifecycleResult<SyncReport> {
        let mut project = self.load(project_id).await?;
        let task_ids: Vec<TaskId> = project
            .tasks()
            .iter()
            .filter(|task| task.is_sync_pending())
            .map(|task| task.id())
            .collect();
        let result = self.push_all(&mut project, &task_ids).await;
        self.repository.update(&project).await?;
        result
    }

    /// Starts work on a task: checks out its branch, takes the focus lock
    /// and tells the tracker the task started.
    ///
    /// # Errors
    ///
    /// Returns the lifecycle guard errors of [`Project::transition_task`]
    /// before any side effect, [`TrackerSyncError::SyncConflict`] for a
    /// diverged task or one whose issue was edited on the tracker,
    /// version-control failures verbatim and non-retryable tracker errors.
    /// Only the diverged flag is persisted on error.
    pub async fn start_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> TaskLifecycleResult<(BranchName, PushOutcome)> {
        let mut project = self.load(project_id).await?;
        project.check_task_transition(task_id, TaskStatus::InProgress)?;
        Self::ensure_not_diverged(&project, task_id)?;

        let branch = self.vcs.start_branch(&project, task_id).await?;
        let baseline = project.clone();
        project.transition_task(task_id, TaskStatus::InProgress, &*self.clock)?;
        let outcome = self.push_checked(&mut project, baseline, task_id).await?;
        self.repository.update(&project).await?;
        info!(%task_id, branch = %branch, "started task");
        Ok((branch, outcome))
    }

    /// Commits changes for an in-progress task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MalformedReference`] and related grammar
    /// errors before touching the repository, and version-control failures
    /// verbatim.
    pub async fn commit(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        message: &str,
        paths: &[String],
    ) -> TaskLifecycleResult<CommitResult> {
        let mut project = self.load(project_id).await?;
        let result = self.vcs.commit(&mut project, task_id, message, paths).await?;
        if matches!(result, CommitResult::Committed(_)) {
            self.repository.update(&project).await?;
        }
        Ok(result)
    }

    /// Publishes the branch of an in-progress task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotInProgress`] when the task has no
    /// branch and version-control failures verbatim.
    pub async fn push_branch(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> TaskLifecycleResult<BranchName> {
        let project = self.load(project_id).await?;
        Ok(self.vcs.push_branch(&project, task_id).await?)
    }

    /// Completes a task and tells the tracker.
    ///
    /// Completing while the tracker is unreachable succeeds with a
    /// [`PushOutcome::Pending`] outcome and a warning.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingCommit`] without a referencing
    /// commit, [`TrackerSyncError::SyncConflict`] for a diverged task or
    /// one whose issue was edited on the tracker, and non-retryable tracker
    /// errors. Only the diverged flag is persisted on error.
    pub async fn complete_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> TaskLifecycleResult<PushOutcome> {
        let mut project = self.load(project_id).await?;
        project.check_task_transition(task_id, TaskStatus::Done)?;
        Self::ensure_not_diverged(&project, task_id)?;

        let baseline = project.clone();
        project.transition_task(task_id, TaskStatus::Done, &*self.clock)?;
        let outcome = self.push_checked(&mut project, baseline, task_id).await?;
        if outcome.is_pending() {
            warn!(%task_id, "task done locally while tracker update is sync-pending");
        }
        self.repository.update(&project).await?;
        info!(%task_id, project_state = %project.state(), "completed task");
        Ok(outcome)
    }

    /// Cancels a non-terminal task and tells the tracker if it knows the
    /// task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] for terminal
    /// tasks, [`TrackerSyncError::SyncConflict`] for a diverged task or one
    /// whose issue was edited on the tracker, and non-retryable tracker
    /// errors. Only the diverged flag is persisted on error.
    pub async fn cancel_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> TaskLifecycleResult<PushOutcome> {
        let mut project = self.load(project_id).await?;
        project.check_task_transition(task_id, TaskStatus::Cancelled)?;
        Self::ensure_not_diverged(&project, task_id)?;

        let baseline = project.clone();
        project.transition_task(task_id, TaskStatus::Cancelled, &*self.clock)?;
        let outcome = if project.require_task(task_id)?.remote_id().is_some() {
            self.push_checked(&mut project, baseline, task_id).await?
        } else {
            PushOutcome::Skipped
        };
        self.repository.update(&project).await?;
        info!(%task_id, "cancelled task");
        Ok(outcome)
    }

    /// Edits a task's fields and pushes the change when the task is bound.
    ///
    /// The issue is read back from the tracker first; an edit made there
    /// since the last push turns this into a conflict instead of being
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskSealed`] for terminal tasks,
    /// duplicate-title errors, [`TrackerSyncError::SyncConflict`] when the
    /// task is diverged or its issue was edited on the tracker, and
    /// non-retryable tracker errors. The edit is not persisted on error;
    /// the diverged flag is.
    pub async fn update_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        patch: TaskPatch,
    ) -> TaskLifecycleResult<PushOutcome> {
        let mut project = self.load(project_id).await?;
        let baseline = project.clone();
        project.edit_task(task_id, patch, &*self.clock)?;
        let outcome = if project.require_task(task_id)?.remote_id().is_some() {
            self.push_checked(&mut project, baseline, task_id).await?
        } else {
            PushOutcome::Skipped
        };
        self.repository.update(&project).await?;
        Ok(outcome)
    }

    /// Pushes a bound task after comparing it with a fresh tracker
    /// observation.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerSyncError::SyncConflict`] when both sides changed;
    /// the task is flagged diverged and that flag is persisted.
    pub async fn sync_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        observed: Option<&RemoteIssue>,
    ) -> TaskLifecycleResult<PushOutcome> {
        let mut project = self.load(project_id).await?;
        let result = self.tracker.push(&mut project, task_id, observed).await;
        match result {
            Ok(outcome) => {
                self.repository.update(&project).await?;
                Ok(outcome)
            }
            Err(err @ TrackerSyncError::SyncConflict { .. }) => {
                self.repository.update(&project).await?;
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Resolves a diverged task by overwriting one side with the other.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotSynced`] for unbound tasks and tracker
    /// errors. Nothing is persisted on error.
    pub async fn resolve_conflict(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        resolution: ConflictResolution,
    ) -> TaskLifecycleResult<PushOutcome> {
        let mut project = self.load(project_id).await?;
        let remote_id = project
            .require_task(task_id)?
            .remote_id()
            .cloned()
            .ok_or(TaskDomainError::NotSynced(task_id))?;
        let outcome = match resolution {
            ConflictResolution::ForcePush => self.tracker.force_push(&mut project, task_id).await?,
            ConflictResolution::ForcePull => {
                let remote = self.tracker.fetch_remote(&remote_id).await?;
                self.tracker.force_pull(&mut project, task_id, &remote)?;
                PushOutcome::Unchanged(remote_id)
            }
        };
        self.repository.update(&project).await?;
        info!(%task_id, ?resolution, "resolved sync conflict");
        Ok(outcome)
    }

    /// Declares a dependency between two tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::CyclicDependency`] when the edge would
    /// close a cycle; nothing is stored in that case.
    pub async fn add_dependency(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        depends_on: TaskId,
    ) -> TaskLifecycleResult<()> {
        let mut project = self.load(project_id).await?;
        project.add_dependency(task_id, depends_on, &*self.clock)?;
        self.repository.update(&project).await?;
        Ok(())
    }

    /// Removes a dependency edge, for example one pointing at a cancelled
    /// task. Returns `false` when the edge did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnknownTask`] for a missing task.
    pub async fn remove_dependency(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        depends_on: TaskId,
    ) -> TaskLifecycleResult<bool> {
        let mut project = self.load(project_id).await?;
        let removed = project.remove_dependency(task_id, depends_on, &*self.clock)?;
        if removed {
            self.repository.update(&project).await?;
        }
        Ok(removed)
    }

    /// Rewinds the most recent commit and drops its commit record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskSealed`] when the commit belongs to a
    /// finished task and version-control failures verbatim.
    pub async fn undo_last_commit(
        &self,
        project_id: ProjectId,
    ) -> TaskLifecycleResult<Option<CommitRecord>> {
        let mut project = self.load(project_id).await?;
        let removed = self.vcs.undo_last_commit(&mut project).await?;
        if removed.is_some() {
            self.repository.update(&project).await?;
        }
        Ok(removed)
    }

    /// Reconstructs from commit history which tasks have work on them.
    ///
    /// # Errors
    ///
    /// Returns version-control failures verbatim.
    pub async fn history_report(
        &self,
        project_id: ProjectId,
    ) -> TaskLifecycleResult<HistoryReport> {
        let project = self.load(project_id).await?;
        Ok(self.vcs.aggregate_history(&project).await?)
    }

    async fn push_all(
        &self,
        project: &mut Project,
        task_ids: &[TaskId],
    ) -> TaskLifecycleResult<SyncReport> {
        let mut report = SyncReport::default();
        for task_id in task_ids {
            let outcome = self.tracker.push_observed(project, *task_id).await?;
            let task = project.require_task(*task_id)?;
            if task.status() == TaskStatus::Confirmed && task.remote_id().is_some() {
                project.transition_task(*task_id, TaskStatus::Backlog, &*self.clock)?;
            }
            report.outcomes.push((*task_id, outcome));
        }
        Ok(report)
    }

    /// Pushes `task_id` against a fresh tracker read. On a conflict the
    /// local change is dropped and only the diverged flag is stored on
    /// `baseline`.
    async fn push_checked(
        &self,
        project: &mut Project,
        baseline: Project,
        task_id: TaskId,
    ) -> TaskLifecycleResult<PushOutcome> {
        match self.tracker.push_observed(project, task_id).await {
            Ok(outcome) => Ok(outcome),
            Err(err @ TrackerSyncError::SyncConflict { .. }) => {
                let mut flagged = baseline;
                if let Some(record) = flagged.task_mut(task_id)?.sync_record_mut() {
                    record.mark_diverged();
                }
                self.repository.update(&flagged).await?;
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn ensure_not_diverged(project: &Project, task_id: TaskId) -> TaskLifecycleResult<()> {
        let task = project.require_task(task_id)?;
        match task.sync_record() {
            Some(record) if record.is_diverged() => Err(TrackerSyncError::SyncConflict {
                task_id,
                remote_id: record.remote_id().clone(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    async fn load(&self, project_id: ProjectId) -> TaskLifecycleResult<Project> {
        self.repository
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| ProjectRepositoryError::NotFound(project_id).into())
    }
}
