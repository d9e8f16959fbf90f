//! Version-control lifecycle engine tests.

use std::sync::Arc;

use super::support::active_project;
use crate::task::domain::{
    BranchPrefix, NewTask, Priority, Project, TaskDomainError, TaskId, TaskStatus,
};
use crate::vcs::{
    adapters::memory::InMemoryVersionControl,
    domain::CommitResult,
    ports::VcsError,
    services::{VcsLifecycleEngine, VcsLifecycleError},
};
use eyre::{OptionExt, bail, ensure};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

struct Setup {
    engine: VcsLifecycleEngine<InMemoryVersionControl, DefaultClock>,
    vcs: Arc<InMemoryVersionControl>,
}

fn setup_with(memory: InMemoryVersionControl) -> Setup {
    let vcs = Arc::new(memory);
    let engine = VcsLifecycleEngine::new(Arc::clone(&vcs), Arc::new(DefaultClock));
    Setup { engine, vcs }
}

#[fixture]
fn setup() -> Setup {
    setup_with(InMemoryVersionControl::new())
}

fn paths(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_owned()).collect()
}

fn pair(ids: &[TaskId]) -> eyre::Result<(TaskId, TaskId)> {
    match ids {
        [first, second] => Ok((*first, *second)),
        _ => bail!("fixture should create two tasks"),
    }
}

/// Starts `task_id` the way the lifecycle service does.
async fn start(setup: &Setup, project: &mut Project, task_id: TaskId) -> eyre::Result<()> {
    setup.engine.start_branch(project, task_id).await?;
    project.transition_task(task_id, TaskStatus::InProgress, &DefaultClock)?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn branch_is_derived_from_prefix_and_remote_id(setup: Setup) -> eyre::Result<()> {
    let (project, ids) = active_project(&["Add search"])?;
    let task_id = ids.first().copied().ok_or_eyre("task")?;

    let branch = setup.engine.start_branch(&project, task_id).await?;

    ensure!(branch.as_str() == "feature-ENG-1");
    ensure!(setup.vcs.current_branch().as_deref() == Some("feature-ENG-1"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unsynced_task_gets_no_branch(setup: Setup) -> eyre::Result<()> {
    let clock = DefaultClock;
    let mut project = Project::new("Search rollout", BranchPrefix::new("feature")?, &clock)?;
    let task_id = project.add_task(NewTask::new("Add search", Priority::P1), &clock)?;

    let result = setup.engine.start_branch(&project, task_id).await;

    ensure!(matches!(
        result,
        Err(VcsLifecycleError::Domain(TaskDomainError::NotSynced(id))) if id == task_id
    ));
    ensure!(setup.vcs.current_branch().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commit_is_recorded_on_the_task(setup: Setup) -> eyre::Result<()> {
    let (mut project, ids) = active_project(&["Add search"])?;
    let task_id = ids.first().copied().ok_or_eyre("task")?;
    start(&setup, &mut project, task_id).await?;

    let result = setup
        .engine
        .commit(&mut project, task_id, "[ENG-1] Add index", &paths(&["src/index.rs"]))
        .await?;

    let CommitResult::Committed(hash) = result else {
        bail!("expected a commit, got {result:?}");
    };
    let task = project.require_task(task_id)?;
    let record = task.commits().first().ok_or_eyre("commit should be recorded")?;
    ensure!(record.hash() == &hash);
    ensure!(record.message() == "[ENG-1] Add index");
    ensure!(record.files().contains("src/index.rs"));
    ensure!(task.has_referencing_commit());
    let stored = setup.vcs.commits();
    ensure!(stored.len() == 1);
    ensure!(stored.first().and_then(|commit| commit.branch.as_deref()) == Some("feature-ENG-1"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_change_set_records_nothing(setup: Setup) -> eyre::Result<()> {
    let (mut project, ids) = active_project(&["Add search"])?;
    let task_id = ids.first().copied().ok_or_eyre("task")?;
    start(&setup, &mut project, task_id).await?;

    let result = setup
        .engine
        .commit(&mut project, task_id, "[ENG-1] Nothing", &[])
        .await?;

    ensure!(result == CommitResult::NoChanges);
    ensure!(project.require_task(task_id)?.commits().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commit_naming_another_task_is_rejected(setup: Setup) -> eyre::Result<()> {
    let (mut project, ids) = active_project(&["Task A", "Task B"])?;
    let (task_a, _) = pair(&ids)?;
    start(&setup, &mut project, task_a).await?;

    let result = setup
        .engine
        .commit(&mut project, task_a, "[ENG-2] Wrong task", &paths(&["a.rs"]))
        .await;

    ensure!(matches!(
        result,
        Err(VcsLifecycleError::Domain(TaskDomainError::ReferenceMismatch { .. }))
    ));
    ensure!(setup.vcs.commits().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commit_requires_task_in_progress(setup: Setup) -> eyre::Result<()> {
    let (mut project, ids) = active_project(&["Add search"])?;
    let task_id = ids.first().copied().ok_or_eyre("task")?;

    let result = setup
        .engine
        .commit(&mut project, task_id, "[ENG-1] Early work", &paths(&["a.rs"]))
        .await;

    ensure!(matches!(
        result,
        Err(VcsLifecycleError::Domain(TaskDomainError::NotInProgress(_)))
    ));
    ensure!(setup.vcs.commits().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tool_failures_are_reported_verbatim(setup: Setup) -> eyre::Result<()> {
    let (mut project, ids) = active_project(&["Add search"])?;
    let task_id = ids.first().copied().ok_or_eyre("task")?;
    start(&setup, &mut project, task_id).await?;
    let output = "error: Your local changes to the following files would be overwritten";
    setup.vcs.fail_next(VcsError::DirtyTree(output.to_owned()));

    let result = setup
        .engine
        .commit(&mut project, task_id, "[ENG-1] Add index", &paths(&["a.rs"]))
        .await;

    let Err(err) = result else {
        bail!("commit should fail");
    };
    ensure!(err.to_string() == output);
    ensure!(project.require_task(task_id)?.commits().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn push_without_remote_fails() -> eyre::Result<()> {
    let setup = setup_with(InMemoryVersionControl::without_remote());
    let (mut project, ids) = active_project(&["Add search"])?;
    let task_id = ids.first().copied().ok_or_eyre("task")?;
    start(&setup, &mut project, task_id).await?;

    let result = setup.engine.push_branch(&project, task_id).await;

    ensure!(matches!(
        result,
        Err(VcsLifecycleError::Vcs(VcsError::MissingRemote(_)))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn push_requires_a_task_branch(setup: Setup) -> eyre::Result<()> {
    let (project, ids) = active_project(&["Add search"])?;
    let task_id = ids.first().copied().ok_or_eyre("task")?;

    let result = setup.engine.push_branch(&project, task_id).await;

    ensure!(matches!(
        result,
        Err(VcsLifecycleError::Domain(TaskDomainError::NotInProgress(_)))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn undo_drops_the_matching_record(setup: Setup) -> eyre::Result<()> {
    let (mut project, ids) = active_project(&["Add search"])?;
    let task_id = ids.first().copied().ok_or_eyre("task")?;
    start(&setup, &mut project, task_id).await?;
    setup
        .engine
        .commit(&mut project, task_id, "[ENG-1] First", &paths(&["a.rs"]))
        .await?;
    setup
        .engine
        .commit(&mut project, task_id, "[ENG-1] Second", &paths(&["b.rs"]))
        .await?;

    let removed = setup.engine.undo_last_commit(&mut project).await?;

    ensure!(removed.map(|record| record.message().to_owned()) == Some("[ENG-1] Second".to_owned()));
    let remaining = project.require_task(task_id)?.commits();
    ensure!(remaining.len() == 1);
    ensure!(setup.vcs.commits().len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn undo_leaves_a_finished_task_alone(setup: Setup) -> eyre::Result<()> {
    let (mut project, ids) = active_project(&["Add search"])?;
    let task_id = ids.first().copied().ok_or_eyre("task")?;
    start(&setup, &mut project, task_id).await?;
    setup
        .engine
        .commit(&mut project, task_id, "[ENG-1] Only step", &paths(&["a.rs"]))
        .await?;
    project.transition_task(task_id, TaskStatus::Done, &DefaultClock)?;

    let result = setup.engine.undo_last_commit(&mut project).await;

    ensure!(matches!(
        result,
        Err(VcsLifecycleError::Domain(TaskDomainError::TaskSealed(sealed))) if sealed == task_id
    ));
    ensure!(setup.vcs.commits().len() == 1);
    let task = project.require_task(task_id)?;
    ensure!(task.status() == TaskStatus::Done);
    ensure!(task.commits().len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn undo_of_foreign_commit_changes_no_task(setup: Setup) -> eyre::Result<()> {
    let (mut project, _) = active_project(&["Add search"])?;
    setup.vcs.record_external_commit("Initial commit")?;

    let removed = setup.engine.undo_last_commit(&mut project).await?;

    ensure!(removed.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn undo_on_empty_history_fails(setup: Setup) -> eyre::Result<()> {
    let (mut project, _) = active_project(&["Add search"])?;

    let result = setup.engine.undo_last_commit(&mut project).await;

    ensure!(matches!(
        result,
        Err(VcsLifecycleError::Vcs(VcsError::NothingToUndo(_)))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_groups_commits_by_task(setup: Setup) -> eyre::Result<()> {
    let (mut project, ids) = active_project(&["Task A", "Task B"])?;
    let (task_a, task_b) = pair(&ids)?;
    start(&setup, &mut project, task_a).await?;
    setup
        .engine
        .commit(&mut project, task_a, "[ENG-1] Part one", &paths(&["a.rs"]))
        .await?;
    setup.vcs.record_external_commit("[ENG-1] Part two by hand")?;
    setup.vcs.record_external_commit("[OPS-5] Unrelated fix")?;
    setup.vcs.record_external_commit("Merge branch 'main'")?;

    let report = setup.engine.aggregate_history(&project).await?;

    ensure!(report.commits_by_task.get(&task_a).map(Vec::len) == Some(2));
    ensure!(!report.commits_by_task.contains_key(&task_b));
    ensure!(report.unknown_references.len() == 1);
    ensure!(report.committed_but_open == vec![task_a]);
    ensure!(report.is_consistent());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn done_task_without_tracker_update_is_flagged(setup: Setup) -> eyre::Result<()> {
    let (mut project, ids) = active_project(&["Add search"])?;
    let task_id = ids.first().copied().ok_or_eyre("task")?;
    start(&setup, &mut project, task_id).await?;
    setup
        .engine
        .commit(&mut project, task_id, "[ENG-1] Finish", &paths(&["a.rs"]))
        .await?;
    project.transition_task(task_id, TaskStatus::Done, &DefaultClock)?;

    let report = setup.engine.aggregate_history(&project).await?;

    ensure!(report.done_without_tracker_update == vec![task_id]);
    ensure!(report.committed_but_open.is_empty());
    ensure!(!report.is_consistent());
    Ok(())
}
