//! Work logs and the append-only status update audit entries.

use super::{TaskDomainError, TaskStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Author recorded for updates made by the system rather than a user.
pub const SYSTEM_AUTHOR: &str = "System";

/// Comment recorded when a task is escalated to high priority.
pub const ESCALATION_COMMENT: &str = "2+ tasks dependent on this task, raising priority";

/// Time spent on a work item together with its explanation.
///
/// A non-zero number of minutes always carries a non-empty comment. Blank
/// comments are normalized to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkLog {
    comment: Option<String>,
    minutes_worked: u32,
}

impl WorkLog {
    /// Creates a validated work log.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingWorkComment`] when `minutes_worked`
    /// is non-zero and the comment is absent or blank.
    pub fn new(comment: Option<String>, minutes_worked: u32) -> Result<Self, TaskDomainError> {
        let trimmed = comment
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        if trimmed.is_none() && minutes_worked != 0 {
            return Err(TaskDomainError::MissingWorkComment(minutes_worked));
        }
        Ok(Self {
            comment: trimmed,
            minutes_worked,
        })
    }

    /// Returns the trimmed comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the minutes worked.
    #[must_use]
    pub const fn minutes_worked(&self) -> u32 {
        self.minutes_worked
    }

    fn into_parts(self) -> (Option<String>, u32) {
        (self.comment, self.minutes_worked)
    }
}

/// One immutable entry in a task's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    status: TaskStatus,
    comment: Option<String>,
    timestamp: DateTime<Utc>,
    minutes_worked: u32,
    updated_by: String,
}

impl StatusUpdate {
    /// Records a user-authored status change.
    #[must_use]
    pub fn new(
        status: TaskStatus,
        work: WorkLog,
        updated_by: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        let (comment, minutes_worked) = work.into_parts();
        Self {
            status,
            comment,
            timestamp: clock.utc(),
            minutes_worked,
            updated_by: updated_by.into(),
        }
    }

    /// Records the system entry written when priority is escalated.
    #[must_use]
    pub fn escalation(status: TaskStatus, clock: &impl Clock) -> Self {
        Self {
            status,
            comment: Some(ESCALATION_COMMENT.to_owned()),
            timestamp: clock.utc(),
            minutes_worked: 0,
            updated_by: SYSTEM_AUTHOR.to_owned(),
        }
    }

    /// Returns the status recorded by this entry.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns when the entry was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the minutes worked.
    #[must_use]
    pub const fn minutes_worked(&self) -> u32 {
        self.minutes_worked
    }

    /// Returns the display string of the author.
    #[must_use]
    pub fn updated_by(&self) -> &str {
        &self.updated_by
    }

    /// Returns `true` when the entry was written by the system.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.updated_by == SYSTEM_AUTHOR
    }
}
