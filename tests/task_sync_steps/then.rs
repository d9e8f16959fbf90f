//! Then steps for task synchronization BDD scenarios.

use super::world::TaskSyncWorld;
use rstest_bdd_macros::then;
use taskbridge::task::{
    domain::{TaskDomainError, WorkflowCategory},
    services::TaskLifecycleError,
};
use taskbridge::vcs::services::VcsLifecycleError;

#[then("the tracker holds {count:usize} issues")]
fn tracker_holds(world: &TaskSyncWorld, count: usize) -> Result<(), eyre::Report> {
    let found = world.tracker.issue_count();
    if found != count {
        return Err(eyre::eyre!("expected {count} tracker issues, found {found}"));
    }
    Ok(())
}

#[then(r#"task "{title}" is in "{category}""#)]
fn task_is_in(world: &TaskSyncWorld, title: String, category: String) -> Result<(), eyre::Report> {
    let expected = WorkflowCategory::parse(&category)
        .ok_or_else(|| eyre::eyre!("invalid expected category in scenario: {category}"))?;
    let project = world.project()?;
    let task = project.require_task(world.task_id(&title)?)?;
    if task.status().workflow_category() != expected {
        return Err(eyre::eyre!(
            "expected {title:?} in {expected}, found status {}",
            task.status().as_str()
        ));
    }
    Ok(())
}

#[then("no tracker mutation was made")]
fn no_tracker_mutation(world: &TaskSyncWorld) -> Result<(), eyre::Report> {
    let before = world
        .mutations_before
        .ok_or_else(|| eyre::eyre!("missing mutation count"))?;
    let after = world.tracker.mutation_count();
    if after != before {
        return Err(eyre::eyre!("expected no mutation, count went {before} -> {after}"));
    }
    Ok(())
}

fn pending_flag(world: &TaskSyncWorld, title: &str) -> Result<bool, eyre::Report> {
    let project = world.project()?;
    Ok(project.require_task(world.task_id(title)?)?.is_sync_pending())
}

#[then(r#"task "{title}" is sync-pending"#)]
fn task_is_pending(world: &TaskSyncWorld, title: String) -> Result<(), eyre::Report> {
    if !pending_flag(world, &title)? {
        return Err(eyre::eyre!("expected {title:?} to be sync-pending"));
    }
    Ok(())
}

#[then(r#"task "{title}" is not sync-pending"#)]
fn task_is_not_pending(world: &TaskSyncWorld, title: String) -> Result<(), eyre::Report> {
    if pending_flag(world, &title)? {
        return Err(eyre::eyre!("expected {title:?} to be synced"));
    }
    Ok(())
}

#[then("the operation fails with a malformed reference error")]
fn fails_with_malformed_reference(world: &TaskSyncWorld) -> Result<(), eyre::Report> {
    let error = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing operation error"))?;
    if !matches!(
        error,
        TaskLifecycleError::Vcs(VcsLifecycleError::Domain(
            TaskDomainError::MalformedReference(_)
        ))
    ) {
        return Err(eyre::eyre!("expected MalformedReference error, got {error:?}"));
    }
    Ok(())
}

#[then("no commit was recorded")]
fn no_commit_recorded(world: &TaskSyncWorld) -> Result<(), eyre::Report> {
    if !world.vcs.commits().is_empty() {
        return Err(eyre::eyre!("expected an empty repository"));
    }
    let project = world.project()?;
    if project.tasks().iter().any(|task| !task.commits().is_empty()) {
        return Err(eyre::eyre!("expected no commit records"));
    }
    Ok(())
}
