//! Fields and behaviour shared by tasks and subtasks.

use super::{Priority, TaskDomainError, TaskStatus};
use crate::tenancy::EmailAddress;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Validated descriptive fields common to every unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemDetails {
    name: String,
    description: String,
    assigned_to: BTreeSet<EmailAddress>,
    task_admin: BTreeSet<EmailAddress>,
    status: TaskStatus,
    priority: Priority,
    due_date: Option<NaiveDate>,
}

impl WorkItemDetails {
    /// Creates details with the required fields and default status and
    /// priority (`pending`, `Low`).
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyName`], [`TaskDomainError::EmptyDescription`]
    /// or [`TaskDomainError::NoAssignees`] when a required field is missing.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        assigned_to: BTreeSet<EmailAddress>,
    ) -> Result<Self, TaskDomainError> {
        let raw_name = name.into();
        let raw_description = description.into();
        let trimmed_name = raw_name.trim();
        if trimmed_name.is_empty() {
            return Err(TaskDomainError::EmptyName);
        }
        let trimmed_description = raw_description.trim();
        if trimmed_description.is_empty() {
            return Err(TaskDomainError::EmptyDescription);
        }
        if assigned_to.is_empty() {
            return Err(TaskDomainError::NoAssignees);
        }

        Ok(Self {
            name: trimmed_name.to_owned(),
            description: trimmed_description.to_owned(),
            assigned_to,
            task_admin: BTreeSet::new(),
            status: TaskStatus::Pending,
            priority: Priority::default(),
            due_date: None,
        })
    }

    /// Sets the administrators responsible for the work.
    #[must_use]
    pub fn with_admins(mut self, admins: BTreeSet<EmailAddress>) -> Self {
        self.task_admin = admins;
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the initial priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub(super) const fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    pub(super) const fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }
}

/// Common read interface over [`Task`](super::Task) and
/// [`Subtask`](super::Subtask).
pub trait WorkItem {
    /// Returns the shared descriptive fields.
    fn details(&self) -> &WorkItemDetails;

    /// Returns the creation timestamp.
    fn created_at(&self) -> DateTime<Utc>;

    /// Returns the item name.
    fn name(&self) -> &str {
        &self.details().name
    }

    /// Returns the item description.
    fn description(&self) -> &str {
        &self.details().description
    }

    /// Returns the emails of the assigned users.
    fn assigned_to(&self) -> &BTreeSet<EmailAddress> {
        &self.details().assigned_to
    }

    /// Returns the emails of the item administrators.
    fn task_admin(&self) -> &BTreeSet<EmailAddress> {
        &self.details().task_admin
    }

    /// Returns the current status.
    fn status(&self) -> TaskStatus {
        self.details().status
    }

    /// Returns the current priority.
    fn priority(&self) -> Priority {
        self.details().priority
    }

    /// Returns the due date, if set.
    fn due_date(&self) -> Option<NaiveDate> {
        self.details().due_date
    }

    /// Returns the number of whole days since creation.
    fn days_open(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at()).num_days()
    }

    /// Returns `true` when the due date has passed and the item is still open.
    fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status().is_terminal() && self.due_date().is_some_and(|due| due < today)
    }
}
