//! Project builders shared by tracker tests.

use crate::task::domain::{
    BranchPrefix, NewTask, Priority, Project, ProjectState, TaskDomainError, TaskId, TaskStatus,
};
use crate::tracker::domain::{RetryPolicy, SyncConfig};
use mockable::DefaultClock;

/// Sync configuration for team `ENG` that retries three times without
/// sleeping.
pub fn fast_config() -> SyncConfig {
    SyncConfig::for_team("ENG").with_retry(RetryPolicy::immediate(3))
}

/// Builds a project in `Syncing` whose tasks are confirmed but unbound.
pub fn syncing_project(titles: &[&str]) -> Result<(Project, Vec<TaskId>), TaskDomainError> {
    let clock = DefaultClock;
    let mut project = Project::new("Search rollout", BranchPrefix::new("feature")?, &clock)?;
    let mut ids = Vec::with_capacity(titles.len());
    for title in titles {
        ids.push(project.add_task(NewTask::new(*title, Priority::P2), &clock)?);
    }
    project.confirm_all(&clock)?;
    project.transition_project(ProjectState::Syncing, &clock)?;
    Ok((project, ids))
}

/// Moves bound tasks to `Backlog` and activates the project.
pub fn activate(project: &mut Project, ids: &[TaskId]) -> Result<(), TaskDomainError> {
    let clock = DefaultClock;
    for id in ids {
        project.transition_task(*id, TaskStatus::Backlog, &clock)?;
    }
    project.transition_project(ProjectState::Active, &clock)
}
