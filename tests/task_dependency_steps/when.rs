//! When steps for task dependency BDD scenarios.

use super::world::{DependencyWorld, run_async};
use rstest_bdd_macros::when;
use taskboard::task::{domain::TaskStatus, services::UpdateTaskStatusRequest};

fn record_update(
    world: &mut DependencyWorld,
    name: &str,
    status: TaskStatus,
) -> Result<(), eyre::Report> {
    let company = world.company()?.clone();
    let request = UpdateTaskStatusRequest::new(world.task_id(name)?, status, "Scenario");
    world.last_update_result = Some(run_async(world.tasks.update_task_status(&company, request)));
    Ok(())
}

#[when(r#""{name}" is marked completed"#)]
fn mark_completed(world: &mut DependencyWorld, name: String) -> Result<(), eyre::Report> {
    record_update(world, &name, TaskStatus::Completed)
}

#[when(r#""{name}" is started"#)]
fn mark_started(world: &mut DependencyWorld, name: String) -> Result<(), eyre::Report> {
    record_update(world, &name, TaskStatus::InProgress)
}

#[when("priorities are escalated twice")]
fn escalate_twice(world: &mut DependencyWorld) -> Result<(), eyre::Report> {
    let company = world.company()?.clone();
    for _ in 0..2 {
        run_async(world.tasks.escalate_priorities(&company))
            .map_err(|err| eyre::eyre!("escalation failed: {err}"))?;
    }
    Ok(())
}
