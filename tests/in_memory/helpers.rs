//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskbridge::confirmation::{
    adapters::memory::ScriptedBreakdown, domain::EditOperation, services::ConfirmationService,
};
use taskbridge::task::{
    adapters::memory::InMemoryProjectRepository,
    domain::{ProjectId, RemoteId, TaskId},
    ports::ProjectRepository,
    services::TaskLifecycleService,
};
use taskbridge::tracker::{
    adapters::memory::InMemoryIssueTracker,
    domain::{RetryPolicy, SyncConfig},
};
use taskbridge::vcs::adapters::memory::InMemoryVersionControl;

/// Idea answered by the scripted breakdown.
pub const IDEA: &str = "Ship full-text search";

/// Breakdown answer: an index task and an API task depending on it.
pub const BREAKDOWN: &str = r#"[
    {"title": "Add search index", "priority": "P1"},
    {"title": "Add search API", "priority": "P2", "depends_on": ["Add search index"]}
]"#;

/// Lifecycle service over the in-memory adapters.
pub type Lifecycle = TaskLifecycleService<
    InMemoryProjectRepository,
    InMemoryIssueTracker,
    InMemoryVersionControl,
    DefaultClock,
>;

/// Confirmation service over the in-memory adapters.
pub type Confirmation =
    ConfirmationService<InMemoryProjectRepository, ScriptedBreakdown, DefaultClock>;

/// Every service and adapter of one in-memory installation.
pub struct Stack {
    pub lifecycle: Lifecycle,
    pub confirmation: Confirmation,
    pub repository: Arc<InMemoryProjectRepository>,
    pub tracker: Arc<InMemoryIssueTracker>,
    pub vcs: Arc<InMemoryVersionControl>,
}

impl Stack {
    /// Builds fresh services over existing adapters, as after a restart.
    #[must_use]
    pub fn restarted(&self) -> Self {
        Self::over(
            Arc::clone(&self.repository),
            Arc::clone(&self.tracker),
            Arc::clone(&self.vcs),
        )
    }

    fn over(
        repository: Arc<InMemoryProjectRepository>,
        tracker: Arc<InMemoryIssueTracker>,
        vcs: Arc<InMemoryVersionControl>,
    ) -> Self {
        let config = SyncConfig::for_team("ENG").with_retry(RetryPolicy::immediate(3));
        let lifecycle = TaskLifecycleService::with_config(
            Arc::clone(&repository),
            Arc::clone(&tracker),
            Arc::clone(&vcs),
            Arc::new(DefaultClock),
            config,
        );
        let breakdown = ScriptedBreakdown::new().with_response(IDEA, BREAKDOWN);
        let confirmation = ConfirmationService::new(
            Arc::clone(&repository),
            Arc::new(breakdown),
            Arc::new(DefaultClock),
        );
        Self {
            lifecycle,
            confirmation,
            repository,
            tracker,
            vcs,
        }
    }

    /// Creates a project, proposes the scripted breakdown and accepts it.
    ///
    /// # Errors
    ///
    /// Returns an error if any service call fails.
    pub async fn confirmed_project(&self) -> eyre::Result<(ProjectId, Vec<TaskId>)> {
        let project = self
            .lifecycle
            .create_project("Search rollout", "feature")
            .await?;
        let ids = self.confirmation.propose(project.id(), IDEA).await?;
        self.confirmation
            .reconcile(project.id(), &[EditOperation::AcceptAll])
            .await?;
        Ok((project.id(), ids))
    }

    /// Returns the remote id bound to a task.
    ///
    /// # Errors
    ///
    /// Returns an error if the project or binding is missing.
    pub async fn remote_id(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> eyre::Result<RemoteId> {
        let project = self
            .repository
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| eyre::eyre!("project {project_id} not stored"))?;
        project
            .require_task(task_id)?
            .remote_id()
            .cloned()
            .ok_or_else(|| eyre::eyre!("task {task_id} is not bound"))
    }
}

/// Provides a fresh in-memory installation for each test.
#[fixture]
pub fn stack() -> Stack {
    Stack::over(
        Arc::new(InMemoryProjectRepository::new()),
        Arc::new(InMemoryIssueTracker::new("ENG")),
        Arc::new(InMemoryVersionControl::new()),
    )
}

/// Splits a two-task id list.
///
/// # Errors
///
/// Returns an error if the list does not hold exactly two ids.
pub fn two(ids: &[TaskId]) -> eyre::Result<(TaskId, TaskId)> {
    match ids {
        [first, second] => Ok((*first, *second)),
        _ => Err(eyre::eyre!("expected two tasks, found {}", ids.len())),
    }
}
