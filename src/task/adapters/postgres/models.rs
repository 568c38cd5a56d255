//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Full task row, used for both queries and inserts.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning company partition.
    pub company_name: String,
    /// Task name.
    pub name: String,
    /// Task description.
    pub description: String,
    /// Assigned user emails.
    pub assigned_to: Value,
    /// Administrator emails.
    pub task_admin: Value,
    /// Lifecycle status.
    pub status: String,
    /// Priority label.
    pub priority: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Optional dependency target.
    pub depends_on: Option<uuid::Uuid>,
    /// Names of dependent tasks.
    pub dependent_tasks: Value,
    /// Embedded subtasks.
    pub subtasks: Value,
    /// Status history.
    pub status_updates: Value,
    /// Optimistic concurrency version.
    pub version: i64,
}

/// Mutable task columns written by updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Task name.
    pub name: String,
    /// Task description.
    pub description: String,
    /// Assigned user emails.
    pub assigned_to: Value,
    /// Administrator emails.
    pub task_admin: Value,
    /// Lifecycle status.
    pub status: String,
    /// Priority label.
    pub priority: String,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Optional dependency target.
    pub depends_on: Option<uuid::Uuid>,
    /// Names of dependent tasks.
    pub dependent_tasks: Value,
    /// Embedded subtasks.
    pub subtasks: Value,
    /// Status history.
    pub status_updates: Value,
    /// Version after this write.
    pub version: i64,
}

impl From<TaskRow> for TaskChangeset {
    fn from(row: TaskRow) -> Self {
        Self {
            name: row.name,
            description: row.description,
            assigned_to: row.assigned_to,
            task_admin: row.task_admin,
            status: row.status,
            priority: row.priority,
            due_date: row.due_date,
            depends_on: row.depends_on,
            dependent_tasks: row.dependent_tasks,
            subtasks: row.subtasks,
            status_updates: row.status_updates,
            version: row.version,
        }
    }
}
