//! `PostgreSQL` task repository behaviour: round trips, stale writes and
//! company partitioning.

use crate::postgres::helpers::{
    CleanupGuard, PostgresCluster, clock, company, email, emails, ensure_template,
    postgres_cluster, test_runtime,
};
use mockable::DefaultClock;
use rstest::rstest;
use taskboard::task::adapters::postgres::PostgresTaskRepository;
use taskboard::task::domain::{
    Priority, StatusUpdate, Subtask, Task, TaskId, TaskStatus, WorkItem, WorkItemDetails, WorkLog,
};
use taskboard::task::ports::{TaskRepository, TaskRepositoryError};

fn sample_task(clock: &DefaultClock, name: &str, depends_on: Option<TaskId>) -> Task {
    let details = WorkItemDetails::new(name, "Collect field data", emails(&["ada@acme.test"]))
        .expect("valid details")
        .with_admins(emails(&["grace@acme.test"]))
        .with_priority(Priority::Moderate);
    Task::new(details, depends_on, clock)
}

#[rstest]
fn stored_tasks_round_trip(clock: DefaultClock, postgres_cluster: PostgresCluster) {
    let cluster = postgres_cluster;
    ensure_template(cluster).expect("template setup");
    let (guard, pool) = CleanupGuard::create(cluster, "task_round_trip").expect("database");
    let repo = PostgresTaskRepository::new(pool);
    let acme = company("Acme");
    let rt = test_runtime().expect("tokio runtime");

    let survey = sample_task(&clock, "Survey", None);
    let mut report = sample_task(&clock, "Report", Some(survey.id()));
    let subtask_details =
        WorkItemDetails::new("Draft", "Write the draft", emails(&["ada@acme.test"]))
            .expect("subtask details");
    report.add_subtask(Subtask::new(subtask_details, report.id(), &clock));
    rt.block_on(repo.store(&acme, &survey)).expect("store survey");
    rt.block_on(repo.store(&acme, &report)).expect("store report");

    let loaded = rt
        .block_on(repo.find_by_id(&acme, report.id()))
        .expect("find report")
        .expect("report exists");
    assert_eq!(loaded.id(), report.id());
    assert_eq!(loaded.name(), "Report");
    assert_eq!(loaded.depends_on(), Some(survey.id()));
    assert_eq!(loaded.priority(), Priority::Moderate);
    assert_eq!(loaded.version(), 0);
    assert_eq!(loaded.subtasks().len(), 1);
    assert!(loaded.subtask_named("Draft").is_some());
    assert!(loaded.assigned_to().contains(&email("ada@acme.test")));

    let by_names = rt
        .block_on(repo.find_by_names(&acme, &["Survey".to_owned(), "Missing".to_owned()]))
        .expect("find by names");
    assert_eq!(by_names.len(), 1);
    assert_eq!(by_names[0].id(), survey.id());

    drop(repo);
    guard.cleanup().expect("cleanup database");
}

#[rstest]
fn stale_updates_report_a_version_conflict(
    clock: DefaultClock,
    postgres_cluster: PostgresCluster,
) {
    let cluster = postgres_cluster;
    ensure_template(cluster).expect("template setup");
    let (guard, pool) = CleanupGuard::create(cluster, "task_stale_write").expect("database");
    let repo = PostgresTaskRepository::new(pool);
    let acme = company("Acme");
    let rt = test_runtime().expect("tokio runtime");

    let task = sample_task(&clock, "Survey", None);
    rt.block_on(repo.store(&acme, &task)).expect("store");

    let mut first = task.clone();
    let mut second = task;
    let work = WorkLog::new(Some("started".to_owned()), 30).expect("work log");
    first.apply_status_update(StatusUpdate::new(
        TaskStatus::InProgress,
        work,
        "Ada Lovelace",
        &clock,
    ));
    let version = rt.block_on(repo.update(&acme, &first)).expect("first update");
    assert_eq!(version, 1);

    second.apply_status_update(StatusUpdate::new(
        TaskStatus::Cancelled,
        WorkLog::default(),
        "Grace Hopper",
        &clock,
    ));
    let result = rt.block_on(repo.update(&acme, &second));
    assert!(
        matches!(
            result,
            Err(TaskRepositoryError::VersionConflict { task_id, expected: 0 })
                if task_id == second.id()
        ),
        "expected VersionConflict, got: {result:?}"
    );

    let stored = rt
        .block_on(repo.find_by_id(&acme, second.id()))
        .expect("find")
        .expect("task exists");
    assert_eq!(stored.status(), TaskStatus::InProgress);
    assert_eq!(stored.version(), 1);
    assert_eq!(stored.status_updates().len(), 1);

    drop(repo);
    guard.cleanup().expect("cleanup database");
}

#[rstest]
fn updating_an_unknown_task_is_not_found(clock: DefaultClock, postgres_cluster: PostgresCluster) {
    let cluster = postgres_cluster;
    ensure_template(cluster).expect("template setup");
    let (guard, pool) = CleanupGuard::create(cluster, "task_update_missing").expect("database");
    let repo = PostgresTaskRepository::new(pool);
    let rt = test_runtime().expect("tokio runtime");

    let task = sample_task(&clock, "Survey", None);
    let result = rt.block_on(repo.update(&company("Acme"), &task));
    assert!(
        matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == task.id()),
        "expected NotFound, got: {result:?}"
    );

    drop(repo);
    guard.cleanup().expect("cleanup database");
}

#[rstest]
fn duplicate_task_ids_are_rejected(clock: DefaultClock, postgres_cluster: PostgresCluster) {
    let cluster = postgres_cluster;
    ensure_template(cluster).expect("template setup");
    let (guard, pool) = CleanupGuard::create(cluster, "task_duplicate").expect("database");
    let repo = PostgresTaskRepository::new(pool);
    let acme = company("Acme");
    let rt = test_runtime().expect("tokio runtime");

    let task = sample_task(&clock, "Survey", None);
    rt.block_on(repo.store(&acme, &task)).expect("first store");
    let result = rt.block_on(repo.store(&acme, &task));
    assert!(
        matches!(result, Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()),
        "expected DuplicateTask, got: {result:?}"
    );

    drop(repo);
    guard.cleanup().expect("cleanup database");
}

#[rstest]
fn tasks_stay_inside_their_company(clock: DefaultClock, postgres_cluster: PostgresCluster) {
    let cluster = postgres_cluster;
    ensure_template(cluster).expect("template setup");
    let (guard, pool) = CleanupGuard::create(cluster, "task_partition").expect("database");
    let repo = PostgresTaskRepository::new(pool);
    let acme = company("Acme");
    let globex = company("Globex");
    let rt = test_runtime().expect("tokio runtime");

    let task = sample_task(&clock, "Survey", None);
    rt.block_on(repo.store(&acme, &task)).expect("store");

    let found = rt
        .block_on(repo.find_by_id(&globex, task.id()))
        .expect("lookup in other company");
    assert!(found.is_none());

    let listed = rt.block_on(repo.find_all(&globex)).expect("list other company");
    assert!(listed.is_empty());
    let pending = rt
        .block_on(repo.find_by_status(&globex, TaskStatus::Pending))
        .expect("status lookup in other company");
    assert!(pending.is_empty());

    let result = rt.block_on(repo.update(&globex, &task));
    assert!(
        matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == task.id()),
        "expected NotFound, got: {result:?}"
    );

    let own = rt.block_on(repo.find_all(&acme)).expect("list own company");
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].version(), 0);

    drop(repo);
    guard.cleanup().expect("cleanup database");
}
