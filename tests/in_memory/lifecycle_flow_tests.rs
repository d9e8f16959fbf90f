//! End-to-end lifecycle flows across confirmation, tracker and VCS.

use super::helpers::{Stack, stack, two};
use eyre::ensure;
use rstest::rstest;
use taskbridge::task::{
    domain::{ProjectState, TaskDomainError, TaskStatus},
    ports::ProjectRepository,
    services::TaskLifecycleError,
};
use taskbridge::tracker::domain::PushOutcome;
use taskbridge::vcs::domain::CommitResult;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn idea_becomes_a_completed_project(stack: Stack) -> eyre::Result<()> {
    let (project_id, ids) = stack.confirmed_project().await?;
    let (index, api) = two(&ids)?;

    let report = stack.lifecycle.sync_project(project_id).await?;
    ensure!(report.pending().is_empty());
    ensure!(stack.tracker.issue_count() == 2);

    for task_id in [index, api] {
        let remote_id = stack.remote_id(project_id, task_id).await?;
        let (branch, _) = stack.lifecycle.start_task(project_id, task_id).await?;
        ensure!(branch.as_str() == format!("feature-{remote_id}"));
        let commit = stack
            .lifecycle
            .commit(
                project_id,
                task_id,
                &format!("[{remote_id}] Implement\n\nEnd-to-end flow."),
                &[format!("src/{remote_id}.rs")],
            )
            .await?;
        ensure!(matches!(commit, CommitResult::Committed(_)));
        stack.lifecycle.push_branch(project_id, task_id).await?;
        let done = stack.lifecycle.complete_task(project_id, task_id).await?;
        ensure!(matches!(done, PushOutcome::Updated(_)));
        let issue = stack
            .tracker
            .issue(&remote_id)
            .ok_or_else(|| eyre::eyre!("issue {remote_id} missing"))?;
        ensure!(issue.state_id == "state-done");
    }

    let project = stack
        .repository
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| eyre::eyre!("project missing"))?;
    ensure!(project.state() == ProjectState::Completed);
    ensure!(project.active_task().is_none());

    let history = stack.lifecycle.history_report(project_id).await?;
    ensure!(history.is_consistent());
    ensure!(history.commits_by_task.len() == 2);
    ensure!(history.committed_but_open.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dependent_task_waits_for_its_dependency(stack: Stack) -> eyre::Result<()> {
    let (project_id, ids) = stack.confirmed_project().await?;
    let (index, api) = two(&ids)?;
    stack.lifecycle.sync_project(project_id).await?;

    let blocked = stack.lifecycle.start_task(project_id, api).await;

    ensure!(matches!(
        blocked,
        Err(TaskLifecycleError::Domain(TaskDomainError::DependencyNotSatisfied { dependency, .. }))
            if dependency == index
    ));
    ensure!(stack.vcs.current_branch().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelled_dependency_must_be_released(stack: Stack) -> eyre::Result<()> {
    let (project_id, ids) = stack.confirmed_project().await?;
    let (index, api) = two(&ids)?;
    stack.lifecycle.sync_project(project_id).await?;

    let cancelled = stack.lifecycle.cancel_task(project_id, index).await?;
    ensure!(matches!(cancelled, PushOutcome::Updated(_)));

    let blocked = stack.lifecycle.start_task(project_id, api).await;
    ensure!(matches!(
        blocked,
        Err(TaskLifecycleError::Domain(
            TaskDomainError::BlockedByCancelledDependency { .. }
        ))
    ));

    ensure!(stack.lifecycle.remove_dependency(project_id, api, index).await?);
    stack.lifecycle.start_task(project_id, api).await?;
    let project = stack
        .lifecycle
        .find_project(project_id)
        .await?
        .ok_or_else(|| eyre::eyre!("project missing"))?;
    ensure!(project.require_task(api)?.status() == TaskStatus::InProgress);
    ensure!(project.active_task() == Some(api));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_is_found_by_name(stack: Stack) -> eyre::Result<()> {
    let (project_id, _) = stack.confirmed_project().await?;

    let found = stack.lifecycle.find_project_by_name("Search rollout").await?;

    ensure!(found.map(|project| project.id()) == Some(project_id));
    let duplicate = stack
        .lifecycle
        .create_project("Search rollout", "feature")
        .await;
    ensure!(matches!(duplicate, Err(TaskLifecycleError::Repository(_))));
    Ok(())
}
