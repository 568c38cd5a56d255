//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::database::DbPool;
use crate::task::{
    domain::{
        PersistedTaskData, Priority, StatusUpdate, Subtask, Task, TaskId, TaskStatus, WorkItem,
        WorkItemDetails,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::tenancy::{CompanyName, EmailAddress};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: DbPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }

    async fn load_rows<F>(&self, query: F) -> TaskRepositoryResult<Vec<Task>>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<Vec<TaskRow>> + Send + 'static,
    {
        self.run_blocking(move |connection| {
            let rows = query(connection).map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, company: &CompanyName, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = task_to_row(company, task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, company: &CompanyName, task: &Task) -> TaskRepositoryResult<u64> {
        let task_id = task.id();
        let expected = task.version();
        let next_version = expected + 1;
        let mut row = task_to_row(company, task)?;
        row.version = to_db_version(next_version)?;
        let expected_db = to_db_version(expected)?;
        let company_key = company.as_str().to_owned();
        let changeset = TaskChangeset::from(row);

        self.run_blocking(move |connection| {
            let affected = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .filter(tasks::company_name.eq(company_key.as_str()))
                    .filter(tasks::version.eq(expected_db)),
            )
            .set(&changeset)
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;

            if affected == 1 {
                return Ok(next_version);
            }

            let exists = diesel::select(diesel::dsl::exists(
                tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .filter(tasks::company_name.eq(company_key.as_str())),
            ))
            .get_result::<bool>(connection)
            .map_err(TaskRepositoryError::persistence)?;

            if exists {
                Err(TaskRepositoryError::VersionConflict { task_id, expected })
            } else {
                Err(TaskRepositoryError::NotFound(task_id))
            }
        })
        .await
    }

    async fn find_by_id(
        &self,
        company: &CompanyName,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<Task>> {
        let company_key = company.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .filter(tasks::company_name.eq(company_key))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_status(
        &self,
        company: &CompanyName,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let company_key = company.as_str().to_owned();
        self.load_rows(move |connection| {
            tasks::table
                .filter(tasks::company_name.eq(company_key))
                .filter(tasks::status.eq(status.as_str()))
                .order(tasks::created_at.asc())
                .select(TaskRow::as_select())
                .load(connection)
        })
        .await
    }

    async fn find_by_names(
        &self,
        company: &CompanyName,
        names: &[String],
    ) -> TaskRepositoryResult<Vec<Task>> {
        let company_key = company.as_str().to_owned();
        let lookup_names = names.to_vec();
        self.load_rows(move |connection| {
            tasks::table
                .filter(tasks::company_name.eq(company_key))
                .filter(tasks::name.eq_any(lookup_names))
                .order(tasks::created_at.asc())
                .select(TaskRow::as_select())
                .load(connection)
        })
        .await
    }

    async fn find_all(&self, company: &CompanyName) -> TaskRepositoryResult<Vec<Task>> {
        let company_key = company.as_str().to_owned();
        self.load_rows(move |connection| {
            tasks::table
                .filter(tasks::company_name.eq(company_key))
                .order(tasks::created_at.asc())
                .select(TaskRow::as_select())
                .load(connection)
        })
        .await
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> TaskRepositoryResult<serde_json::Value> {
    serde_json::to_value(value).map_err(TaskRepositoryError::persistence)
}

fn from_json<T: DeserializeOwned>(value: serde_json::Value) -> TaskRepositoryResult<T> {
    serde_json::from_value(value).map_err(TaskRepositoryError::persistence)
}

fn to_db_version(version: u64) -> TaskRepositoryResult<i64> {
    i64::try_from(version).map_err(TaskRepositoryError::persistence)
}

fn task_to_row(company: &CompanyName, task: &Task) -> TaskRepositoryResult<TaskRow> {
    Ok(TaskRow {
        id: task.id().into_inner(),
        company_name: company.as_str().to_owned(),
        name: task.name().to_owned(),
        description: task.description().to_owned(),
        assigned_to: to_json(task.assigned_to())?,
        task_admin: to_json(task.task_admin())?,
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        created_at: task.created_at(),
        due_date: task.due_date(),
        depends_on: task.depends_on().map(TaskId::into_inner),
        dependent_tasks: to_json(task.dependent_tasks())?,
        subtasks: to_json(task.subtasks())?,
        status_updates: to_json(task.status_updates())?,
        version: to_db_version(task.version())?,
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        company_name: _,
        name,
        description,
        assigned_to,
        task_admin,
        status,
        priority,
        created_at,
        due_date,
        depends_on,
        dependent_tasks,
        subtasks,
        status_updates,
        version,
    } = row;

    let assignees: BTreeSet<EmailAddress> = from_json(assigned_to)?;
    let admins: BTreeSet<EmailAddress> = from_json(task_admin)?;
    let parsed_status =
        TaskStatus::try_from(status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let parsed_priority =
        Priority::try_from(priority.as_str()).map_err(TaskRepositoryError::persistence)?;

    let mut details = WorkItemDetails::new(name, description, assignees)
        .map_err(TaskRepositoryError::persistence)?
        .with_admins(admins)
        .with_status(parsed_status)
        .with_priority(parsed_priority);
    if let Some(date) = due_date {
        details = details.with_due_date(date);
    }

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        details,
        created_at,
        depends_on: depends_on.map(TaskId::from_uuid),
        dependent_tasks: from_json::<Vec<String>>(dependent_tasks)?,
        subtasks: from_json::<Vec<Subtask>>(subtasks)?,
        status_updates: from_json::<Vec<StatusUpdate>>(status_updates)?,
        version: u64::try_from(version).map_err(TaskRepositoryError::persistence)?,
    };
    Ok(Task::from_persisted(data))
}
