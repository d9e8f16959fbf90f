//! Builders shared by task module tests.

use crate::task::domain::{
    BranchPrefix, CommitHash, CommitRecord, NewTask, Priority, Project, ProjectState, RemoteId,
    SyncRecord, TaskDomainError, TaskId, TaskStatus,
};
use mockable::{Clock, DefaultClock};

/// Creates a draft project with prefix `feature`.
pub fn draft_project(clock: &DefaultClock) -> Result<Project, TaskDomainError> {
    Project::new("Search rollout", BranchPrefix::new("feature")?, clock)
}

/// Binds a task to `remote_id` as if the first push succeeded.
pub fn bind(
    project: &mut Project,
    task_id: TaskId,
    remote_id: &str,
    clock: &DefaultClock,
) -> Result<(), TaskDomainError> {
    let task = project.require_task(task_id)?;
    let record = SyncRecord::new(
        RemoteId::new(remote_id)?,
        task.fingerprint(),
        task.status().workflow_category(),
        clock.utc(),
    );
    project.task_mut(task_id)?.bind_remote(record, clock)
}

/// Builds an active project whose tasks are bound to `ENG-1`, `ENG-2`, ...
/// and sit in `Backlog`.
pub fn active_project(
    clock: &DefaultClock,
    titles: &[&str],
) -> Result<(Project, Vec<TaskId>), TaskDomainError> {
    let mut project = draft_project(clock)?;
    let mut ids = Vec::with_capacity(titles.len());
    for title in titles {
        ids.push(project.add_task(NewTask::new(*title, Priority::P2), clock)?);
    }
    project.confirm_all(clock)?;
    project.transition_project(ProjectState::Syncing, clock)?;
    for (number, id) in (1_u32..).zip(&ids) {
        bind(&mut project, *id, &format!("ENG-{number}"), clock)?;
        project.transition_task(*id, TaskStatus::Backlog, clock)?;
    }
    project.transition_project(ProjectState::Active, clock)?;
    Ok((project, ids))
}

/// Records a commit whose message references the task's remote id.
pub fn record_referencing_commit(
    project: &mut Project,
    task_id: TaskId,
    hash: &str,
    clock: &DefaultClock,
) -> Result<(), TaskDomainError> {
    let remote_id = project
        .require_task(task_id)?
        .remote_id()
        .cloned()
        .ok_or(TaskDomainError::NotSynced(task_id))?;
    let record = CommitRecord::new(
        CommitHash::new(hash)?,
        task_id,
        format!("[{remote_id}] Implement change"),
        clock.utc(),
        vec!["src/lib.rs".to_owned()],
    );
    project.record_commit(task_id, record, clock)
}
