//! Domain model for task lifecycle management.
//!
//! Tasks and their embedded subtasks share the [`WorkItem`] interface. Tasks
//! additionally carry dependency links and an append-only status history.
//! Infrastructure concerns stay outside of this boundary.

mod error;
mod ids;
mod status;
mod status_update;
mod subtask;
mod task;
mod work_item;

pub use error::{ParsePriorityError, ParseTaskStatusError, TaskDomainError};
pub use ids::TaskId;
pub use status::{Priority, TaskStatus};
pub use status_update::{ESCALATION_COMMENT, SYSTEM_AUTHOR, StatusUpdate, WorkLog};
pub use subtask::Subtask;
pub use task::{ESCALATION_THRESHOLD, PersistedTaskData, Task};
pub use work_item::{WorkItem, WorkItemDetails};
