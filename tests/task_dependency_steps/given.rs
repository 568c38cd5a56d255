//! Given steps for task dependency BDD scenarios.

use super::world::{DependencyWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::account::{domain::Role, services::CreateUserRequest};
use taskboard::task::{
    domain::TaskStatus,
    services::{CreateTaskRequest, UpdateTaskStatusRequest},
};
use taskboard::tenancy::CompanyName;

#[given(r#"a company "{company}" with user "{email}" named "{name}""#)]
fn company_with_user(
    world: &mut DependencyWorld,
    company: String,
    email: String,
    name: String,
) -> Result<(), eyre::Report> {
    let company_name = CompanyName::new(company).wrap_err("construct company name")?;
    let request = CreateUserRequest::new(email, name, "initial-password", Role::User);
    run_async(world.auth.create_user(&company_name, request, false))
        .wrap_err("create scenario user")?;
    world.company = Some(company_name);
    Ok(())
}

#[given(r#"a task "{name}" assigned to "{email}""#)]
fn independent_task(
    world: &mut DependencyWorld,
    name: String,
    email: String,
) -> Result<(), eyre::Report> {
    let company = world.company()?.clone();
    let request = CreateTaskRequest::new(name.clone(), format!("{name} work"), [email]);
    let task = run_async(world.tasks.create_task(&company, request))
        .wrap_err("create independent task")?;
    world.task_ids.insert(name, task.id());
    Ok(())
}

#[given(r#"a dependent task "{name}" assigned to "{email}" blocked by "{dependency}""#)]
fn dependent_task(
    world: &mut DependencyWorld,
    name: String,
    email: String,
    dependency: String,
) -> Result<(), eyre::Report> {
    let company = world.company()?.clone();
    let dependency_id = world.task_id(&dependency)?;
    let request = CreateTaskRequest::new(name.clone(), format!("{name} work"), [email])
        .depending_on(dependency_id);
    let task = run_async(world.tasks.create_task(&company, request))
        .wrap_err("create dependent task")?;
    world.task_ids.insert(name, task.id());
    Ok(())
}

#[given(r#""{name}" has been completed"#)]
fn task_completed(world: &mut DependencyWorld, name: String) -> Result<(), eyre::Report> {
    let company = world.company()?.clone();
    let request =
        UpdateTaskStatusRequest::new(world.task_id(&name)?, TaskStatus::Completed, "Scenario");
    run_async(world.tasks.update_task_status(&company, request))
        .wrap_err("complete prerequisite task")?;
    Ok(())
}
