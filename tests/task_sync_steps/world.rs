//! Shared world state for task synchronization BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskbridge::task::{
    adapters::memory::InMemoryProjectRepository,
    domain::{Project, ProjectId, TaskId},
    ports::ProjectRepository,
    services::{TaskLifecycleError, TaskLifecycleService},
};
use taskbridge::tracker::{
    adapters::memory::InMemoryIssueTracker,
    domain::{RetryPolicy, SyncConfig},
};
use taskbridge::vcs::adapters::memory::InMemoryVersionControl;

/// Service type used by the BDD world.
pub type TestLifecycleService = TaskLifecycleService<
    InMemoryProjectRepository,
    InMemoryIssueTracker,
    InMemoryVersionControl,
    DefaultClock,
>;

/// Scenario world for task synchronization behaviour tests.
pub struct TaskSyncWorld {
    pub service: TestLifecycleService,
    pub repository: Arc<InMemoryProjectRepository>,
    pub tracker: Arc<InMemoryIssueTracker>,
    pub vcs: Arc<InMemoryVersionControl>,
    pub project_id: Option<ProjectId>,
    pub mutations_before: Option<u64>,
    pub last_error: Option<TaskLifecycleError>,
}

impl TaskSyncWorld {
    /// Creates a world over fresh in-memory adapters.
    #[must_use]
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryProjectRepository::new());
        let tracker = Arc::new(InMemoryIssueTracker::new("ENG"));
        let vcs = Arc::new(InMemoryVersionControl::new());
        let service = TaskLifecycleService::with_config(
            Arc::clone(&repository),
            Arc::clone(&tracker),
            Arc::clone(&vcs),
            Arc::new(DefaultClock),
            SyncConfig::for_team("ENG").with_retry(RetryPolicy::immediate(3)),
        );

        Self {
            service,
            repository,
            tracker,
            vcs,
            project_id: None,
            mutations_before: None,
            last_error: None,
        }
    }

    /// Returns the scenario project identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if no project has been created yet.
    pub fn project_id(&self) -> Result<ProjectId, eyre::Report> {
        self.project_id
            .ok_or_else(|| eyre::eyre!("missing project in scenario world"))
    }

    /// Loads the scenario project.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is missing.
    pub fn project(&self) -> Result<Project, eyre::Report> {
        let project_id = self.project_id()?;
        run_async(self.repository.find_by_id(project_id))?
            .ok_or_else(|| eyre::eyre!("project {project_id} not stored"))
    }

    /// Finds a task by exact title.
    ///
    /// # Errors
    ///
    /// Returns an error if no task has the title.
    pub fn task_id(&self, title: &str) -> Result<TaskId, eyre::Report> {
        self.project()?
            .tasks()
            .iter()
            .find(|task| task.title() == title)
            .map(|task| task.id())
            .ok_or_else(|| eyre::eyre!("no task titled {title:?}"))
    }
}

impl Default for TaskSyncWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskSyncWorld {
    TaskSyncWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
