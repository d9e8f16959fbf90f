//! Project builders shared by version-control tests.

use crate::task::domain::{
    BranchPrefix, NewTask, Priority, Project, ProjectState, RemoteId, SyncRecord,
    TaskDomainError, TaskId, TaskStatus,
};
use mockable::{Clock, DefaultClock};

/// Builds an active project with tasks bound to `ENG-1`, `ENG-2`, ... in
/// `Backlog`.
pub fn active_project(titles: &[&str]) -> Result<(Project, Vec<TaskId>), TaskDomainError> {
    let clock = DefaultClock;
    let mut project = Project::new("Search rollout", BranchPrefix::new("feature")?, &clock)?;
    let mut ids = Vec::with_capacity(titles.len());
    for title in titles {
        ids.push(project.add_task(NewTask::new(*title, Priority::P2), &clock)?);
    }
    project.confirm_all(&clock)?;
    project.transition_project(ProjectState::Syncing, &clock)?;
    for (number, id) in (1_u32..).zip(&ids) {
        let task = project.require_task(*id)?;
        let record = SyncRecord::new(
            RemoteId::new(format!("ENG-{number}"))?,
            task.fingerprint(),
            task.status().workflow_category(),
            clock.utc(),
        );
        project.task_mut(*id)?.bind_remote(record, &clock)?;
        project.transition_task(*id, TaskStatus::Backlog, &clock)?;
    }
    project.transition_project(ProjectState::Active, &clock)?;
    Ok((project, ids))
}
