//! Subtasks embedded in a parent task document.

use super::{TaskId, TaskStatus, WorkItem, WorkItemDetails, WorkLog};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Unit of work embedded in a parent [`Task`](super::Task).
///
/// Unlike tasks, subtasks keep no status history: each update overwrites the
/// status, minutes worked and comment in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    #[serde(flatten)]
    details: WorkItemDetails,
    created_at: DateTime<Utc>,
    parent_task_id: TaskId,
    minutes_worked: u32,
    comment: Option<String>,
}

impl Subtask {
    /// Creates a subtask belonging to `parent_task_id`.
    #[must_use]
    pub fn new(details: WorkItemDetails, parent_task_id: TaskId, clock: &impl Clock) -> Self {
        Self {
            details,
            created_at: clock.utc(),
            parent_task_id,
            minutes_worked: 0,
            comment: None,
        }
    }

    /// Returns the identifier of the parent task.
    #[must_use]
    pub const fn parent_task_id(&self) -> TaskId {
        self.parent_task_id
    }

    /// Returns the minutes recorded by the latest update.
    #[must_use]
    pub const fn minutes_worked(&self) -> u32 {
        self.minutes_worked
    }

    /// Returns the comment recorded by the latest update.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Overwrites the status and work fields.
    pub fn apply_work(&mut self, status: TaskStatus, work: WorkLog) {
        self.details.set_status(status);
        self.minutes_worked = work.minutes_worked();
        self.comment = work.comment().map(str::to_owned);
    }
}

impl WorkItem for Subtask {
    fn details(&self) -> &WorkItemDetails {
        &self.details
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
