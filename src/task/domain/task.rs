//! Task aggregate root with dependency links and status history.

use super::{Priority, StatusUpdate, Subtask, TaskId, WorkItem, WorkItemDetails};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Number of dependent tasks at which priority is raised to
/// [`Priority::High`].
pub const ESCALATION_THRESHOLD: usize = 2;

/// Task aggregate root.
///
/// `dependent_tasks` mirrors the `depends_on` links of other tasks and is
/// written when those tasks are created. `version` counts successful writes
/// and is checked by repositories to reject stale updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    #[serde(flatten)]
    details: WorkItemDetails,
    created_at: DateTime<Utc>,
    depends_on: Option<TaskId>,
    dependent_tasks: Vec<String>,
    subtasks: Vec<Subtask>,
    status_updates: Vec<StatusUpdate>,
    version: u64,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted descriptive fields.
    pub details: WorkItemDetails,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted dependency target, if any.
    pub depends_on: Option<TaskId>,
    /// Persisted names of tasks depending on this one.
    pub dependent_tasks: Vec<String>,
    /// Persisted embedded subtasks.
    pub subtasks: Vec<Subtask>,
    /// Persisted status history.
    pub status_updates: Vec<StatusUpdate>,
    /// Persisted write version.
    pub version: u64,
}

impl Task {
    /// Creates a new task, optionally depending on another task.
    #[must_use]
    pub fn new(details: WorkItemDetails, depends_on: Option<TaskId>, clock: &impl Clock) -> Self {
        Self {
            id: TaskId::new(),
            details,
            created_at: clock.utc(),
            depends_on,
            dependent_tasks: Vec::new(),
            subtasks: Vec::new(),
            status_updates: Vec::new(),
            version: 0,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            details: data.details,
            created_at: data.created_at,
            depends_on: data.depends_on,
            dependent_tasks: data.dependent_tasks,
            subtasks: data.subtasks,
            status_updates: data.status_updates,
            version: data.version,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task this one depends on, if any.
    #[must_use]
    pub const fn depends_on(&self) -> Option<TaskId> {
        self.depends_on
    }

    /// Returns the names of tasks that depend on this one, in creation order.
    #[must_use]
    pub fn dependent_tasks(&self) -> &[String] {
        &self.dependent_tasks
    }

    /// Returns the embedded subtasks in insertion order.
    #[must_use]
    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    /// Returns the status history in insertion order.
    #[must_use]
    pub fn status_updates(&self) -> &[StatusUpdate] {
        &self.status_updates
    }

    /// Returns the write version last read from or written to storage.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Records that a task named `name` depends on this one.
    pub fn record_dependent(&mut self, name: impl Into<String>) {
        self.dependent_tasks.push(name.into());
    }

    /// Sets the status and appends the update to the history.
    pub fn apply_status_update(&mut self, update: StatusUpdate) {
        self.details.set_status(update.status());
        self.status_updates.push(update);
    }

    /// Returns `true` when enough tasks depend on this one to warrant
    /// escalation and priority is not yet high.
    #[must_use]
    pub fn needs_escalation(&self) -> bool {
        self.dependent_tasks.len() >= ESCALATION_THRESHOLD && self.priority() != Priority::High
    }

    /// Raises priority to high and logs a system update when
    /// [`Self::needs_escalation`] holds.
    ///
    /// Returns `true` when the task changed.
    pub fn escalate_priority(&mut self, clock: &impl Clock) -> bool {
        if !self.needs_escalation() {
            return false;
        }
        let current_status = self.status();
        self.details.set_priority(Priority::High);
        self.status_updates
            .push(StatusUpdate::escalation(current_status, clock));
        true
    }

    /// Appends a subtask.
    pub fn add_subtask(&mut self, subtask: Subtask) {
        self.subtasks.push(subtask);
    }

    /// Returns the first subtask with the given name.
    #[must_use]
    pub fn subtask_named(&self, name: &str) -> Option<&Subtask> {
        self.subtasks.iter().find(|subtask| subtask.name() == name)
    }

    /// Returns the first subtask with the given name for mutation.
    pub fn subtask_named_mut(&mut self, name: &str) -> Option<&mut Subtask> {
        self.subtasks.iter_mut().find(|subtask| subtask.name() == name)
    }

    /// Records the version assigned by storage after a successful write.
    pub const fn mark_persisted(&mut self, version: u64) {
        self.version = version;
    }
}

impl WorkItem for Task {
    fn details(&self) -> &WorkItemDetails {
        &self.details
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
