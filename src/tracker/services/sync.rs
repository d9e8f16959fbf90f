//! Tracker sync engine: idempotent projection of local tasks onto the
//! tracker with drift detection and bounded retry.

use crate::task::domain::{
    CreationKey, ErrorClass, Project, RemoteId, SyncRecord, TaskDomainError, TaskId, TaskStatus,
    WorkflowCategory,
};
use crate::tracker::{
    domain::{
        CreateIssueRequest, CreatedIssue, Drift, IssueUpdate, PushOutcome, RemoteIssue,
        RemoteStateCategory, SyncConfig,
    },
    ports::{IssueTracker, TrackerError, TrackerResult},
};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for tracker synchronization.
#[derive(Debug, Error)]
pub enum TrackerSyncError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The tracker returned a non-retryable error.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    /// Local and remote state both changed since the last push.
    #[error("task {task_id} diverged from tracker issue {remote_id}; force-push or force-pull")]
    SyncConflict {
        /// Affected task.
        task_id: TaskId,
        /// Bound tracker issue.
        remote_id: RemoteId,
    },
    /// Only confirmed tasks are pushed.
    #[error("task {0} has not been confirmed")]
    NotConfirmed(TaskId),
}

impl TrackerSyncError {
    /// Returns the failure class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Domain(err) => err.class(),
            Self::Tracker(err) => err.class(),
            Self::SyncConflict { .. } => ErrorClass::SyncConflict,
            Self::NotConfirmed(_) => ErrorClass::Structural,
        }
    }
}

/// Result type for tracker sync operations.
pub type TrackerSyncResult<T> = Result<T, TrackerSyncError>;

/// Result of a retried tracker call.
enum Attempt<T> {
    Succeeded(T),
    Exhausted { attempts: u32, last_error: TrackerError },
}

/// Projects tasks onto the tracker and keeps both sides reconciled.
///
/// The engine mutates the [`Project`] it is handed; callers persist the
/// project afterwards.
#[derive(Clone)]
pub struct TrackerSyncEngine<T, C>
where
    T: IssueTracker,
    C: Clock + Send + Sync,
{
    tracker: Arc<T>,
    clock: Arc<C>,
    config: SyncConfig,
}

impl<T, C> TrackerSyncEngine<T, C>
where
    T: IssueTracker,
    C: Clock + Send + Sync,
{
    /// Creates an engine with default configuration.
    #[must_use]
    pub fn new(tracker: Arc<T>, clock: Arc<C>) -> Self {
        Self::with_config(tracker, clock, SyncConfig::default())
    }

    /// Creates an engine with explicit configuration.
    #[must_use]
    pub const fn with_config(tracker: Arc<T>, clock: Arc<C>, config: SyncConfig) -> Self {
        Self {
            tracker,
            clock,
            config,
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Pushes one task.
    ///
    /// Unbound tasks are created (or adopted, when an earlier attempt left an
    /// issue behind). Bound tasks are checked for drift against `observed`
    /// and updated only when their fingerprint changed. Exhausting retries
    /// marks the task `sync-pending` and is reported as
    /// [`PushOutcome::Pending`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerSyncError::SyncConflict`] when both sides changed (the
    /// sync record is flagged diverged), [`TrackerSyncError::NotConfirmed`]
    /// for proposed tasks, and non-retryable tracker errors.
    pub async fn push(
        &self,
        project: &mut Project,
        task_id: TaskId,
        observed: Option<&RemoteIssue>,
    ) -> TrackerSyncResult<PushOutcome> {
        let task = project.require_task(task_id)?;
        match task.remote_id().cloned() {
            None => self.create(project, task_id).await,
            Some(remote_id) => self.reconcile(project, task_id, remote_id, observed).await,
        }
    }

    /// Pushes one task after reading its issue back from the tracker.
    ///
    /// Bound tasks are reconciled against the freshly read issue, so a
    /// tracker-side edit is either left alone or reported as a conflict,
    /// never overwritten. Unbound tasks are created as in [`Self::push`].
    /// When the read exhausts its retries the task is marked `sync-pending`
    /// and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerSyncError::SyncConflict`] when both sides changed,
    /// [`TrackerSyncError::NotConfirmed`] for proposed tasks, and
    /// non-retryable tracker errors.
    pub async fn push_observed(
        &self,
        project: &mut Project,
        task_id: TaskId,
    ) -> TrackerSyncResult<PushOutcome> {
        let task = project.require_task(task_id)?;
        let Some(record) = task.sync_record() else {
            return self.create(project, task_id).await;
        };
        let remote_id = record.remote_id().clone();
        if record.is_diverged() {
            return Err(TrackerSyncError::SyncConflict { task_id, remote_id });
        }

        let tracker: &T = &self.tracker;
        let remote_ref = &remote_id;
        match self
            .retry("get_issue", || tracker.get_issue(remote_ref))
            .await?
        {
            Attempt::Succeeded(issue) => {
                self.reconcile(project, task_id, remote_id, Some(&issue))
                    .await
            }
            Attempt::Exhausted {
                attempts,
                last_error,
            } => Ok(Self::mark_pending(project, task_id, attempts, &last_error)?),
        }
    }

    /// Pushes local fields over the tracker, discarding remote changes and
    /// clearing divergence.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotSynced`] for unbound tasks and
    /// non-retryable tracker errors.
    pub async fn force_push(
        &self,
        project: &mut Project,
        task_id: TaskId,
    ) -> TrackerSyncResult<PushOutcome> {
        let task = project.require_task(task_id)?;
        let remote_id = task
            .remote_id()
            .cloned()
            .ok_or(TaskDomainError::NotSynced(task_id))?;
        warn!(%task_id, %remote_id, "force-pushing local fields over tracker state");
        let category = task.status().workflow_category();
        self.send_update(project, task_id, remote_id, Some(category))
            .await
    }

    /// Adopts the tracker's title, description and priority locally,
    /// clearing divergence. Local status stays authoritative.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotSynced`] for unbound tasks,
    /// [`TaskDomainError::ReferenceMismatch`] when `remote` is a different
    /// issue and [`TaskDomainError::DuplicateTask`] when the remote title
    /// collides with another task.
    pub fn force_pull(
        &self,
        project: &mut Project,
        task_id: TaskId,
        remote: &RemoteIssue,
    ) -> TrackerSyncResult<()> {
        let task = project.require_task(task_id)?;
        let record = task
            .sync_record()
            .ok_or(TaskDomainError::NotSynced(task_id))?;
        if record.remote_id() != &remote.remote_id {
            return Err(TaskDomainError::ReferenceMismatch {
                expected: record.remote_id().clone(),
                found: remote.remote_id.clone(),
            }
            .into());
        }
        let pushed_category = record.category();
        let remote_category = remote.state.mapped().unwrap_or(pushed_category);

        project.pull_remote_fields(
            task_id,
            &remote.title,
            remote.description.clone(),
            remote.priority,
            &*self.clock,
        )?;
        let now = self.clock.utc();
        let pulled = project.task_mut(task_id)?;
        if let Some(pulled_record) = pulled.sync_record_mut() {
            pulled_record.refresh(remote.fingerprint(pushed_category), remote_category, now);
        }
        pulled.set_sync_pending(pulled.has_unpushed_changes());
        info!(%task_id, remote_id = %remote.remote_id, "pulled tracker fields into local task");
        Ok(())
    }

    /// Reads an issue from the tracker with retry.
    ///
    /// # Errors
    ///
    /// Returns the last tracker error when retries are exhausted or the
    /// error is not retryable.
    pub async fn fetch_remote(&self, remote_id: &RemoteId) -> TrackerSyncResult<RemoteIssue> {
        let tracker: &T = &self.tracker;
        match self
            .retry("get_issue", || tracker.get_issue(remote_id))
            .await?
        {
            Attempt::Succeeded(issue) => Ok(issue),
            Attempt::Exhausted { last_error, .. } => Err(last_error.into()),
        }
    }

    async fn create(
        &self,
        project: &mut Project,
        task_id: TaskId,
    ) -> TrackerSyncResult<PushOutcome> {
        let task = project.require_task(task_id)?;
        match task.status() {
            TaskStatus::Proposed => return Err(TrackerSyncError::NotConfirmed(task_id)),
            TaskStatus::Cancelled => {
                debug!(%task_id, "skipping cancelled task without tracker issue");
                return Ok(PushOutcome::Skipped);
            }
            TaskStatus::Confirmed
            | TaskStatus::Backlog
            | TaskStatus::InProgress
            | TaskStatus::Done => {}
        }

        let creation_key = CreationKey::derive(project.id(), task.title());
        let request = CreateIssueRequest::for_task(&self.config.team, task, creation_key.clone())
            .with_project_id(self.config.project_id.clone())
            .with_labels(self.config.labels.iter().cloned());
        let fingerprint = task.fingerprint();
        let category = task.status().workflow_category();

        let tracker: &T = &self.tracker;
        let team = self.config.team.as_str();
        let key = &creation_key;
        let request_ref = &request;
        let attempt = self
            .retry("create_issue", move || async move {
                find_or_create(tracker, team, key, request_ref).await
            })
            .await?;

        match attempt {
            Attempt::Succeeded((issue, adopted)) => {
                let remote_id = issue.remote_id.clone();
                let record =
                    SyncRecord::new(remote_id.clone(), fingerprint, category, self.clock.utc())
                        .with_url(issue.url);
                project.task_mut(task_id)?.bind_remote(record, &*self.clock)?;
                if adopted {
                    info!(%task_id, %remote_id, "adopted tracker issue left by an earlier push");
                    Ok(PushOutcome::Adopted(remote_id))
                } else {
                    info!(%task_id, %remote_id, "created tracker issue");
                    Ok(PushOutcome::Created(remote_id))
                }
            }
            Attempt::Exhausted {
                attempts,
                last_error,
            } => Ok(Self::mark_pending(project, task_id, attempts, &last_error)?),
        }
    }

    async fn reconcile(
        &self,
        project: &mut Project,
        task_id: TaskId,
        remote_id: RemoteId,
        observed: Option<&RemoteIssue>,
    ) -> TrackerSyncResult<PushOutcome> {
        let task = project.require_task(task_id)?;
        let record = task
            .sync_record()
            .ok_or(TaskDomainError::NotSynced(task_id))?;
        if record.is_diverged() {
            return Err(TrackerSyncError::SyncConflict { task_id, remote_id });
        }
        if let Some(RemoteStateCategory::Unmapped(name)) = observed.map(|issue| &issue.state) {
            warn!(
                %task_id,
                %remote_id,
                state = %name,
                "tracker state is unmapped; not reconciling status"
            );
        }

        let pushed_category = record.category();
        let local_category = task.status().workflow_category();
        match Drift::assess(record, task.fingerprint(), observed) {
            Drift::InSync => {
                debug!(%task_id, %remote_id, "task unchanged since last push");
                project.task_mut(task_id)?.set_sync_pending(false);
                Ok(PushOutcome::Unchanged(remote_id))
            }
            Drift::RemoteAhead => {
                warn!(
                    %task_id,
                    %remote_id,
                    "tracker changed since last push; local task left as is"
                );
                Ok(PushOutcome::RemoteAhead(remote_id))
            }
            Drift::Diverged => {
                warn!(%task_id, %remote_id, "local and tracker state diverged");
                if let Some(diverged) = project.task_mut(task_id)?.sync_record_mut() {
                    diverged.mark_diverged();
                }
                Err(TrackerSyncError::SyncConflict { task_id, remote_id })
            }
            Drift::LocalAhead => {
                let state_change = (local_category != pushed_category).then_some(local_category);
                self.send_update(project, task_id, remote_id, state_change)
                    .await
            }
        }
    }

    async fn send_update(
        &self,
        project: &mut Project,
        task_id: TaskId,
        remote_id: RemoteId,
        state_change: Option<WorkflowCategory>,
    ) -> TrackerSyncResult<PushOutcome> {
        let task = project.require_task(task_id)?;
        let fingerprint = task.fingerprint();
        let category = task.status().workflow_category();
        let base_update = IssueUpdate::from_task(task, None);

        let tracker: &T = &self.tracker;
        let team = self.config.team.as_str();
        let remote_ref = &remote_id;
        let update_ref = &base_update;
        let attempt = self
            .retry("update_issue", move || async move {
                let state_id = match state_change {
                    Some(target) => Some(resolve_state_id(tracker, team, target).await?),
                    None => None,
                };
                let update = IssueUpdate {
                    state_id,
                    ..update_ref.clone()
                };
                tracker.update_issue(remote_ref, &update).await
            })
            .await?;

        match attempt {
            Attempt::Succeeded(()) => {
                let now = self.clock.utc();
                let pushed = project.task_mut(task_id)?;
                if let Some(record) = pushed.sync_record_mut() {
                    record.refresh(fingerprint, category, now);
                }
                pushed.set_sync_pending(false);
                info!(%task_id, %remote_id, category = %category, "pushed task update to tracker");
                Ok(PushOutcome::Updated(remote_id))
            }
            Attempt::Exhausted {
                attempts,
                last_error,
            } => Ok(Self::mark_pending(project, task_id, attempts, &last_error)?),
        }
    }

    fn mark_pending(
        project: &mut Project,
        task_id: TaskId,
        attempts: u32,
        last_error: &TrackerError,
    ) -> Result<PushOutcome, TaskDomainError> {
        warn!(
            %task_id,
            attempts,
            error = %last_error,
            "tracker retries exhausted; task is sync-pending"
        );
        project.task_mut(task_id)?.set_sync_pending(true);
        Ok(PushOutcome::Pending { attempts })
    }

    /// Runs `call` until it succeeds, fails permanently, or the attempt
    /// budget is spent, sleeping with exponential backoff in between.
    async fn retry<R, F, Fut>(
        &self,
        operation: &'static str,
        mut call: F,
    ) -> TrackerSyncResult<Attempt<R>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TrackerResult<R>>,
    {
        let policy = self.config.retry;
        let max_attempts = policy.max_attempts();
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(Attempt::Succeeded(value)),
                Err(err) if err.is_retryable() => {
                    if attempt >= max_attempts {
                        return Ok(Attempt::Exhausted {
                            attempts: attempt,
                            last_error: err,
                        });
                    }
                    let delay = policy.backoff_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "tracker call failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Looks the issue up by creation key first so that a retried creation
/// never produces a duplicate.
async fn find_or_create<T: IssueTracker + ?Sized>(
    tracker: &T,
    team: &str,
    key: &CreationKey,
    request: &CreateIssueRequest,
) -> TrackerResult<(CreatedIssue, bool)> {
    if let Some(existing) = tracker.find_by_creation_key(team, key).await? {
        return Ok((existing, true));
    }
    let created = tracker.create_issue(request).await?;
    Ok((created, false))
}

async fn resolve_state_id<T: IssueTracker + ?Sized>(
    tracker: &T,
    team: &str,
    category: WorkflowCategory,
) -> TrackerResult<String> {
    tracker
        .list_workflow_states(team)
        .await?
        .into_iter()
        .find(|state| state.category.mapped() == Some(category))
        .map(|state| state.id)
        .ok_or_else(|| TrackerError::MissingResource(format!("{category} workflow state")))
}
