//! Error types for task domain validation and parsing.

use crate::tenancy::TenancyError;
use thiserror::Error;

/// Errors returned while constructing or mutating task domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task or subtask name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyName,

    /// The task or subtask description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// No assignee was given.
    #[error("task must be assigned to at least one user")]
    NoAssignees,

    /// An assignee or admin email is malformed.
    #[error(transparent)]
    InvalidUserReference(#[from] TenancyError),

    /// Minutes were logged without an explanatory comment.
    #[error("a comment is required when logging {0} minutes of work")]
    MissingWorkComment(u32),
}

/// Error returned while parsing task statuses from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing priorities from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);
