//! When steps for task synchronization BDD scenarios.

use super::world::{TaskSyncWorld, run_async};
use rstest_bdd_macros::when;

#[when("the project is synced")]
fn project_is_synced(world: &mut TaskSyncWorld) -> Result<(), eyre::Report> {
    let project_id = world.project_id()?;
    world.mutations_before = Some(world.tracker.mutation_count());
    if let Err(err) = run_async(world.service.sync_project(project_id)) {
        world.last_error = Some(err);
    }
    Ok(())
}

#[when("pending tasks are resumed")]
fn pending_tasks_are_resumed(world: &mut TaskSyncWorld) -> Result<(), eyre::Report> {
    let project_id = world.project_id()?;
    if let Err(err) = run_async(world.service.resume_pending(project_id)) {
        world.last_error = Some(err);
    }
    Ok(())
}

#[when(r#"task "{title}" is committed with message "{message}""#)]
fn task_is_committed(
    world: &mut TaskSyncWorld,
    title: String,
    message: String,
) -> Result<(), eyre::Report> {
    let project_id = world.project_id()?;
    let task_id = world.task_id(&title)?;
    let paths = ["src/search.rs".to_owned()];
    if let Err(err) = run_async(world.service.commit(project_id, task_id, &message, &paths)) {
        world.last_error = Some(err);
    }
    Ok(())
}
