//! Service orchestrating breakdown, review and confirmation of a project's
//! task list.

use super::Reconciler;
use crate::confirmation::{
    domain::{EditOperation, ReconcileError, ReconcileOutcome, TaskReference},
    ports::{BreakdownError, TaskBreakdown},
};
use crate::task::{
    domain::{ErrorClass, Project, ProjectId, TaskDomainError, TaskId, normalize_title},
    ports::{ProjectRepository, ProjectRepositoryError},
};
use mockable::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for the confirmation workflow.
#[derive(Debug, Error)]
pub enum ConfirmationError {
    /// Reconciling the edits failed.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    /// The breakdown collaborator failed.
    #[error(transparent)]
    Breakdown(#[from] BreakdownError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ProjectRepositoryError),
}

impl From<TaskDomainError> for ConfirmationError {
    fn from(value: TaskDomainError) -> Self {
        Self::Reconcile(ReconcileError::Domain(value))
    }
}

impl ConfirmationError {
    /// Returns the failure class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Reconcile(err) => err.class(),
            Self::Breakdown(_) => ErrorClass::RemoteTransient,
            Self::Repository(err) => err.class(),
        }
    }
}

/// Result type for confirmation service operations.
pub type ConfirmationResult<T> = Result<T, ConfirmationError>;

/// Turns an idea into a reviewed, confirmed task list.
#[derive(Clone)]
pub struct ConfirmationService<R, B, C>
where
    R: ProjectRepository,
    B: TaskBreakdown,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    breakdown: Arc<B>,
    clock: Arc<C>,
}

impl<R, B, C> ConfirmationService<R, B, C>
where
    R: ProjectRepository,
    B: TaskBreakdown,
    C: Clock + Send + Sync,
{
    /// Creates a confirmation service.
    #[must_use]
    pub const fn new(repository: Arc<R>, breakdown: Arc<B>, clock: Arc<C>) -> Self {
        Self {
            repository,
            breakdown,
            clock,
        }
    }

    /// Breaks `idea` down and adds the candidates to the project as
    /// proposed tasks.
    ///
    /// Candidate dependencies are resolved by title among the candidates and
    /// existing tasks. Returns the new task identifiers in candidate order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfirmationError::Breakdown`] when the collaborator fails,
    /// [`ConfirmationError::Reconcile`] when a candidate violates the task
    /// model (duplicate title, unknown dependency, cycle) and
    /// [`ConfirmationError::Repository`] for persistence failures. No task
    /// is added when any candidate is rejected.
    pub async fn propose(
        &self,
        project_id: ProjectId,
        idea: &str,
    ) -> ConfirmationResult<Vec<TaskId>> {
        let mut project = self.load(project_id).await?;
        let candidates = self.breakdown.break_down(idea).await?;

        let mut ids = Vec::with_capacity(candidates.len());
        let mut by_title: BTreeMap<String, TaskId> = project
            .tasks()
            .iter()
            .map(|task| (task.normalized_title(), task.id()))
            .collect();
        for candidate in &candidates {
            let id = project.add_task(candidate.to_new_task(), &*self.clock)?;
            by_title.insert(normalize_title(&candidate.title), id);
            ids.push(id);
        }
        let mut edges = Vec::new();
        for (candidate, id) in candidates.iter().zip(&ids) {
            for dependency in &candidate.depends_on {
                let depends_on = by_title
                    .get(&normalize_title(dependency))
                    .copied()
                    .ok_or_else(|| {
                        ReconcileError::UnknownReference(TaskReference::title(dependency.clone()))
                    })?;
                edges.push((*id, depends_on));
            }
        }
        project.add_dependencies(&edges, &*self.clock)?;

        self.repository.update(&project).await?;
        info!(project_id = %project.id(), proposed = ids.len(), "proposed tasks from idea");
        Ok(ids)
    }

    /// Applies a batch of operator edits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfirmationError::Reconcile`] when the batch is rejected
    /// (the stored project is unchanged) and
    /// [`ConfirmationError::Repository`] for persistence failures.
    pub async fn reconcile(
        &self,
        project_id: ProjectId,
        edits: &[EditOperation],
    ) -> ConfirmationResult<ReconcileOutcome> {
        let mut project = self.load(project_id).await?;
        let outcome = Reconciler::apply(&mut project, edits, &*self.clock)?;
        match outcome {
            ReconcileOutcome::AlreadyConfirmed => {
                debug!(%project_id, "task list already confirmed");
            }
            ReconcileOutcome::Proposed { applied } => {
                self.repository.update(&project).await?;
                debug!(%project_id, applied, "applied task list edits");
            }
            ReconcileOutcome::Confirmed { applied } => {
                self.repository.update(&project).await?;
                info!(%project_id, applied, tasks = project.tasks().len(), "confirmed task list");
            }
        }
        Ok(outcome)
    }

    async fn load(&self, project_id: ProjectId) -> ConfirmationResult<Project> {
        self.repository
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| ProjectRepositoryError::NotFound(project_id).into())
    }
}
