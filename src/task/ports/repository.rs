//! Repository port for per-company task persistence.

use crate::task::domain::{Task, TaskId, TaskStatus};
use crate::tenancy::CompanyName;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Every operation is scoped to one company partition; a task stored for one
/// company is invisible to every other.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists in the partition.
    async fn store(&self, company: &CompanyName, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task and returns the new version.
    ///
    /// The write only succeeds when the stored version equals
    /// [`Task::version`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// or [`TaskRepositoryError::VersionConflict`] when it was modified since
    /// it was read.
    async fn update(&self, company: &CompanyName, task: &Task) -> TaskRepositoryResult<u64>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(
        &self,
        company: &CompanyName,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<Task>>;

    /// Returns all tasks with the given status, oldest first.
    async fn find_by_status(
        &self,
        company: &CompanyName,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns all tasks whose name is in `names`, oldest first.
    async fn find_by_names(
        &self,
        company: &CompanyName,
        names: &[String],
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns every task in the partition, oldest first.
    async fn find_all(&self, company: &CompanyName) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task was modified after it was read.
    #[error("task {task_id} was modified concurrently (expected version {expected})")]
    VersionConflict {
        /// Task being written.
        task_id: TaskId,
        /// Version the writer read.
        expected: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
