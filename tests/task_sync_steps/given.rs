//! Given steps for task synchronization BDD scenarios.

use super::world::{TaskSyncWorld, run_async};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::given;
use taskbridge::task::{
    domain::{NewTask, Priority},
    ports::ProjectRepository,
};

fn confirmed_project(world: &mut TaskSyncWorld, titles: &[&str]) -> Result<(), eyre::Report> {
    let mut project = run_async(world.service.create_project("Search rollout", "feature"))
        .wrap_err("create project for sync scenario")?;
    for title in titles {
        project.add_task(NewTask::new(*title, Priority::P1), &DefaultClock)?;
    }
    project.confirm_all(&DefaultClock)?;
    run_async(world.repository.update(&project)).wrap_err("store confirmed project")?;
    world.project_id = Some(project.id());
    Ok(())
}

#[given(r#"a confirmed project with task "{title}""#)]
fn confirmed_project_with_task(
    world: &mut TaskSyncWorld,
    title: String,
) -> Result<(), eyre::Report> {
    confirmed_project(world, &[title.as_str()])
}

#[given(r#"a confirmed project with tasks "{first}" and "{second}""#)]
fn confirmed_project_with_tasks(
    world: &mut TaskSyncWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    confirmed_project(world, &[first.as_str(), second.as_str()])
}

#[given("the project has been synced")]
fn project_has_been_synced(world: &mut TaskSyncWorld) -> Result<(), eyre::Report> {
    let project_id = world.project_id()?;
    run_async(world.service.sync_project(project_id)).wrap_err("sync project in setup")?;
    Ok(())
}

#[given("the tracker fails the next {count:u32} calls")]
fn tracker_fails_next(world: &mut TaskSyncWorld, count: u32) {
    world.tracker.fail_next(count);
}

#[given(r#"task "{title}" has been started"#)]
fn task_has_been_started(world: &mut TaskSyncWorld, title: String) -> Result<(), eyre::Report> {
    let project_id = world.project_id()?;
    let task_id = world.task_id(&title)?;
    run_async(world.service.start_task(project_id, task_id)).wrap_err("start task in setup")?;
    Ok(())
}
