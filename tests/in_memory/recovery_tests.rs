//! Recovery from tracker outages, restarts and divergent edits.

use super::helpers::{Stack, stack, two};
use eyre::ensure;
use rstest::rstest;
use taskbridge::task::{
    domain::{Priority, ProjectState, TaskPatch, TaskStatus},
    services::{ConflictResolution, TaskLifecycleError},
};
use taskbridge::tracker::{domain::PushOutcome, services::TrackerSyncError};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outage_during_sync_is_resumed_after_restart(stack: Stack) -> eyre::Result<()> {
    let (project_id, ids) = stack.confirmed_project().await?;
    let (index, api) = two(&ids)?;
    stack.tracker.fail_next(3);

    let report = stack.lifecycle.sync_project(project_id).await?;

    ensure!(report.pending() == vec![index]);
    ensure!(matches!(report.outcome_for(api), Some(PushOutcome::Created(_))));

    let restarted = stack.restarted();
    let resumed = restarted.lifecycle.resume_pending(project_id).await?;

    ensure!(matches!(resumed.outcome_for(index), Some(PushOutcome::Created(_))));
    ensure!(stack.tracker.issue_count() == 2);
    let project = restarted
        .lifecycle
        .find_project(project_id)
        .await?
        .ok_or_else(|| eyre::eyre!("project missing"))?;
    ensure!(project.state() == ProjectState::Active);
    ensure!(project
        .tasks()
        .iter()
        .all(|task| task.status() == TaskStatus::Backlog && !task.is_sync_pending()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_sync_never_duplicates_issues(stack: Stack) -> eyre::Result<()> {
    let (project_id, _) = stack.confirmed_project().await?;
    stack.tracker.lose_next_create_response();

    stack.lifecycle.sync_project(project_id).await?;
    let mutations = stack.tracker.mutation_count();
    stack.restarted().lifecycle.sync_project(project_id).await?;

    ensure!(stack.tracker.issue_count() == 2);
    ensure!(stack.tracker.mutation_count() == mutations);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn divergent_edit_is_resolved_by_pulling(stack: Stack) -> eyre::Result<()> {
    let (project_id, ids) = stack.confirmed_project().await?;
    let (index, _) = two(&ids)?;
    stack.lifecycle.sync_project(project_id).await?;
    let remote_id = stack.remote_id(project_id, index).await?;

    stack.tracker.fail_next(3);
    let pending = stack
        .lifecycle
        .update_task(project_id, index, TaskPatch::default().priority(Priority::P0))
        .await?;
    ensure!(pending.is_pending());
    ensure!(stack.tracker.edit_remotely(&remote_id, |issue| {
        issue.title = "Add trigram search index".to_owned();
    }));
    let observed = stack
        .tracker
        .observe(&remote_id)
        .ok_or_else(|| eyre::eyre!("issue {remote_id} missing"))?;

    let conflict = stack
        .lifecycle
        .sync_task(project_id, index, Some(&observed))
        .await;
    ensure!(matches!(
        conflict,
        Err(TaskLifecycleError::Tracker(TrackerSyncError::SyncConflict { .. }))
    ));
    let start_blocked = stack.lifecycle.start_task(project_id, index).await;
    ensure!(matches!(
        start_blocked,
        Err(TaskLifecycleError::Tracker(TrackerSyncError::SyncConflict { .. }))
    ));

    stack
        .lifecycle
        .resolve_conflict(project_id, index, ConflictResolution::ForcePull)
        .await?;

    let project = stack
        .lifecycle
        .find_project(project_id)
        .await?
        .ok_or_else(|| eyre::eyre!("project missing"))?;
    let task = project.require_task(index)?;
    ensure!(task.title() == "Add trigram search index");
    ensure!(task.priority() == Priority::P1);
    ensure!(!task.is_sync_pending());
    stack.lifecycle.start_task(project_id, index).await?;
    Ok(())
}
