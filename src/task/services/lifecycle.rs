//! Service layer for task creation, status updates and dependency rules.

use crate::task::{
    domain::{
        Priority, StatusUpdate, Subtask, Task, TaskDomainError, TaskId, TaskStatus, WorkItem,
        WorkItemDetails, WorkLog,
    },
    ports::{TaskRepository, TaskRepositoryError, UserDirectory, UserDirectoryError},
};
use crate::tenancy::{CompanyName, EmailAddress};
use chrono::NaiveDate;
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    name: String,
    description: String,
    assigned_to: Vec<String>,
    task_admin: Vec<String>,
    status: TaskStatus,
    priority: Priority,
    due_date: Option<NaiveDate>,
    depends_on: Option<TaskId>,
}

impl CreateTaskRequest {
    /// Creates a request with the required task fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        assigned_to: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            assigned_to: assigned_to.into_iter().map(Into::into).collect(),
            task_admin: Vec::new(),
            status: TaskStatus::Pending,
            priority: Priority::default(),
            due_date: None,
            depends_on: None,
        }
    }

    /// Sets the task administrators.
    #[must_use]
    pub fn with_admins(mut self, admins: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.task_admin = admins.into_iter().map(Into::into).collect();
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

    /// Makes the new task depend on an existing task.
    #[must_use]
    pub const fn depending_on(mut self, task_id: TaskId) -> Self {
        self.depends_on = Some(task_id);
        self
    }
}

/// Request payload for adding a subtask to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSubtaskRequest {
    name: String,
    description: String,
    assigned_to: Vec<String>,
    task_admin: Vec<String>,
    status: TaskStatus,
    priority: Priority,
    due_date: Option<NaiveDate>,
}

impl CreateSubtaskRequest {
    /// Creates a request with the required subtask fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        assigned_to: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            assigned_to: assigned_to.into_iter().map(Into::into).collect(),
            task_admin: Vec::new(),
            status: TaskStatus::Pending,
            priority: Priority::default(),
            due_date: None,
        }
    }

    /// Sets the subtask administrators.
    #[must_use]
    pub fn with_admins(mut self, admins: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.task_admin = admins.into_iter().map(Into::into).collect();
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
}

/// Request payload for changing a task's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskStatusRequest {
    task_id: TaskId,
    status: TaskStatus,
    comment: Option<String>,
    minutes_worked: u32,
    updated_by: String,
}

impl UpdateTaskStatusRequest {
    /// Creates a request with no comment and no time logged.
    #[must_use]
    pub fn new(task_id: TaskId, status: TaskStatus, updated_by: impl Into<String>) -> Self {
        Self {
            task_id,
            status,
            comment: None,
            minutes_worked: 0,
            updated_by: updated_by.into(),
        }
    }

    /// Sets the progress comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the minutes worked since the last update.
    #[must_use]
    pub const fn with_minutes_worked(mut self, minutes_worked: u32) -> Self {
        self.minutes_worked = minutes_worked;
        self
    }

    /// Returns the target task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the requested status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the author label.
    #[must_use]
    pub fn updated_by(&self) -> &str {
        &self.updated_by
    }
}

/// Request payload for changing a subtask's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSubtaskStatusRequest {
    task_id: TaskId,
    subtask_name: String,
    status: TaskStatus,
    comment: Option<String>,
    minutes_worked: u32,
}

impl UpdateSubtaskStatusRequest {
    /// Creates a request with no comment and no time logged.
    #[must_use]
    pub fn new(task_id: TaskId, subtask_name: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            task_id,
            subtask_name: subtask_name.into(),
            status,
            comment: None,
            minutes_worked: 0,
        }
    }

    /// Sets the progress comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the minutes worked.
    #[must_use]
    pub const fn with_minutes_worked(mut self, minutes_worked: u32) -> Self {
        self.minutes_worked = minutes_worked;
        self
    }
}

/// Outcome of a priority escalation sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscalationReport {
    escalated: Vec<TaskId>,
}

impl EscalationReport {
    /// Returns the tasks whose priority was raised, in partition order.
    #[must_use]
    pub fn escalated(&self) -> &[TaskId] {
        &self.escalated
    }

    /// Returns `true` when the sweep changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.escalated.is_empty()
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The task does not exist in the company partition.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The parent task has no subtask with the name.
    #[error("task {task_id} has no subtask named '{name}'")]
    SubtaskNotFound {
        /// Parent task.
        task_id: TaskId,
        /// Subtask name that was looked up.
        name: String,
    },

    /// The task depends on a task that is not completed yet.
    #[error("{message}")]
    DependencyNotSatisfied {
        /// The incomplete dependency.
        blocking_task: TaskId,
        /// Human-readable explanation naming the dependency and its assignees.
        message: String,
    },

    /// The task was modified by another writer since it was read.
    #[error("task {0} was modified concurrently; reload and retry")]
    ConcurrentModification(TaskId),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),

    /// User directory lookup failed.
    #[error(transparent)]
    Directory(#[from] UserDirectoryError),
}

impl From<TaskRepositoryError> for TaskLifecycleError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(task_id) => Self::NotFound(task_id),
            TaskRepositoryError::VersionConflict { task_id, .. } => {
                Self::ConcurrentModification(task_id)
            }
            other => Self::Repository(other),
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, D, C>
where
    R: TaskRepository,
    D: UserDirectory,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<D>,
    clock: Arc<C>,
}

impl<R, D, C> TaskLifecycleService<R, D, C>
where
    R: TaskRepository,
    D: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, directory: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            repository,
            directory,
            clock,
        }
    }

    /// Creates a task in the company partition.
    ///
    /// The task starts `pending` unless the request sets another status.
    /// When the request names a dependency, the new task's name is appended
    /// to the dependency's `dependent_tasks` before the task is inserted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when validation fails and
    /// [`TaskLifecycleError::NotFound`] when the dependency does not exist.
    pub async fn create_task(
        &self,
        company: &CompanyName,
        request: CreateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let details = build_details(
            request.name,
            request.description,
            request.assigned_to,
            request.task_admin,
            request.status,
            request.priority,
            request.due_date,
        )?;
        let task = Task::new(details, request.depends_on, &*self.clock);

        if let Some(dependency_id) = request.depends_on {
            let mut dependency = self.load(company, dependency_id).await?;
            dependency.record_dependent(task.name());
            self.persist(company, &mut dependency).await?;
            debug!(
                task = %task.name(),
                dependency = %dependency_id,
                dependents = dependency.dependent_tasks().len(),
                "recorded task dependency"
            );
        }

        self.repository.store(company, &task).await?;
        info!(task_id = %task.id(), company = %company, name = %task.name(), "task created");
        Ok(task)
    }

    /// Appends a subtask to an existing task and returns the updated task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when validation fails and
    /// [`TaskLifecycleError::NotFound`] when the parent does not exist.
    pub async fn create_subtask(
        &self,
        company: &CompanyName,
        task_id: TaskId,
        request: CreateSubtaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let details = build_details(
            request.name,
            request.description,
            request.assigned_to,
            request.task_admin,
            request.status,
            request.priority,
            request.due_date,
        )?;
        let mut task = self.load(company, task_id).await?;
        task.add_subtask(Subtask::new(details, task_id, &*self.clock));
        self.persist(company, &mut task).await?;
        info!(task_id = %task_id, subtasks = task.subtasks().len(), "subtask created");
        Ok(task)
    }

    /// Changes a task's status and appends an entry to its history.
    ///
    /// Any status change is refused while the task it depends on exists and
    /// is not completed. The dependency is read without isolation, so it may
    /// be reopened between the check and the write.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when minutes are logged without
    /// a comment, [`TaskLifecycleError::NotFound`] when the task does not
    /// exist, [`TaskLifecycleError::DependencyNotSatisfied`] while the task
    /// it depends on is not completed, and
    /// [`TaskLifecycleError::ConcurrentModification`] when the task changed
    /// since it was read.
    pub async fn update_task_status(
        &self,
        company: &CompanyName,
        request: UpdateTaskStatusRequest,
    ) -> TaskLifecycleResult<Task> {
        let work = WorkLog::new(request.comment, request.minutes_worked)?;
        let mut task = self.load(company, request.task_id).await?;

        self.ensure_dependency_completed(company, &task).await?;

        let previous = task.status();
        task.apply_status_update(StatusUpdate::new(
            request.status,
            work,
            request.updated_by,
            &*self.clock,
        ));
        self.persist(company, &mut task).await?;
        info!(
            task_id = %task.id(),
            from = %previous,
            to = %request.status,
            "task status updated"
        );
        Ok(task)
    }

    /// Overwrites the status, minutes and comment of the first subtask with
    /// the requested name. Subtasks keep no history.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when minutes are logged without
    /// a comment, [`TaskLifecycleError::NotFound`] when the parent does not
    /// exist and [`TaskLifecycleError::SubtaskNotFound`] when no subtask has
    /// the name.
    pub async fn update_subtask_status(
        &self,
        company: &CompanyName,
        request: UpdateSubtaskStatusRequest,
    ) -> TaskLifecycleResult<Task> {
        let work = WorkLog::new(request.comment, request.minutes_worked)?;
        let mut task = self.load(company, request.task_id).await?;
        let subtask = task
            .subtask_named_mut(&request.subtask_name)
            .ok_or_else(|| TaskLifecycleError::SubtaskNotFound {
                task_id: request.task_id,
                name: request.subtask_name.clone(),
            })?;
        subtask.apply_work(request.status, work);

        self.persist(company, &mut task).await?;
        info!(
            task_id = %request.task_id,
            subtask = %request.subtask_name,
            status = %request.status,
            "subtask status updated"
        );
        Ok(task)
    }

    /// Raises every task with two or more dependents to high priority.
    ///
    /// Each escalation appends one system-authored status update. Tasks that
    /// are already high are skipped, so repeated sweeps are no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::ConcurrentModification`] when a task
    /// changed during the sweep and [`TaskLifecycleError::Repository`] on
    /// persistence failures. Tasks escalated before the failure stay
    /// escalated.
    pub async fn escalate_priorities(
        &self,
        company: &CompanyName,
    ) -> TaskLifecycleResult<EscalationReport> {
        let mut report = EscalationReport::default();
        for mut task in self.repository.find_all(company).await? {
            if !task.escalate_priority(&*self.clock) {
                continue;
            }
            self.persist(company, &mut task).await?;
            info!(
                task_id = %task.id(),
                dependents = task.dependent_tasks().len(),
                "task priority escalated"
            );
            report.escalated.push(task.id());
        }
        debug!(company = %company, escalated = report.escalated.len(), "escalation sweep finished");
        Ok(report)
    }

    /// Returns the tasks with the given status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_tasks_by_status(
        &self,
        company: &CompanyName,
        status: TaskStatus,
    ) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_by_status(company, status).await?)
    }

    /// Returns a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist.
    pub async fn get_task(&self, company: &CompanyName, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.load(company, task_id).await
    }

    /// Returns display names for the given emails in input order.
    ///
    /// Emails without a matching user resolve to the email itself.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Directory`] when the lookup fails.
    pub async fn resolve_user_names(
        &self,
        company: &CompanyName,
        emails: &[EmailAddress],
    ) -> TaskLifecycleResult<Vec<String>> {
        let names = self.directory.display_names(company, emails).await?;
        Ok(emails
            .iter()
            .map(|email| {
                names
                    .get(email)
                    .cloned()
                    .unwrap_or_else(|| email.as_str().to_owned())
            })
            .collect())
    }

    /// Returns the tasks that depend on the given task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist.
    pub async fn list_dependent_tasks(
        &self,
        company: &CompanyName,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Vec<Task>> {
        let task = self.load(company, task_id).await?;
        if task.dependent_tasks().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .repository
            .find_by_names(company, task.dependent_tasks())
            .await?)
    }

    async fn load(&self, company: &CompanyName, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(company, task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    async fn persist(&self, company: &CompanyName, task: &mut Task) -> TaskLifecycleResult<()> {
        let version = self.repository.update(company, task).await.inspect_err(|err| {
            if matches!(err, TaskRepositoryError::VersionConflict { .. }) {
                warn!(task_id = %task.id(), version = task.version(), "stale task write rejected");
            }
        })?;
        task.mark_persisted(version);
        Ok(())
    }

    async fn ensure_dependency_completed(
        &self,
        company: &CompanyName,
        task: &Task,
    ) -> TaskLifecycleResult<()> {
        let Some(dependency_id) = task.depends_on() else {
            return Ok(());
        };
        let Some(dependency) = self.repository.find_by_id(company, dependency_id).await? else {
            return Ok(());
        };
        if dependency.status() == TaskStatus::Completed {
            return Ok(());
        }

        let assignees: Vec<EmailAddress> = dependency.assigned_to().iter().cloned().collect();
        let names = self.resolve_user_names(company, &assignees).await?;
        let message = format!(
            "Cannot complete task. Dependent task '{}' is not completed yet. It is assigned to {}.",
            dependency.name(),
            names.join(", ")
        );
        warn!(
            task_id = %task.id(),
            blocking_task = %dependency_id,
            "task completion blocked by dependency"
        );
        Err(TaskLifecycleError::DependencyNotSatisfied {
            blocking_task: dependency_id,
            message,
        })
    }
}

fn parse_emails(raw: Vec<String>) -> Result<BTreeSet<EmailAddress>, TaskDomainError> {
    raw.into_iter()
        .map(|email| EmailAddress::new(email).map_err(TaskDomainError::from))
        .collect()
}

fn build_details(
    name: String,
    description: String,
    assigned_to: Vec<String>,
    task_admin: Vec<String>,
    status: TaskStatus,
    priority: Priority,
    due_date: Option<NaiveDate>,
) -> Result<WorkItemDetails, TaskDomainError> {
    let mut details = WorkItemDetails::new(name, description, parse_emails(assigned_to)?)?
        .with_admins(parse_emails(task_admin)?)
        .with_status(status)
        .with_priority(priority);
    if let Some(date) = due_date {
        details = details.with_due_date(date);
    }
    Ok(details)
}
