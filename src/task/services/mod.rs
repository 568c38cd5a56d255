//! Application services for task lifecycle orchestration.

mod lifecycle;

pub use lifecycle::{
    CreateSubtaskRequest, CreateTaskRequest, EscalationReport, TaskLifecycleError,
    TaskLifecycleResult, TaskLifecycleService, UpdateSubtaskStatusRequest,
    UpdateTaskStatusRequest,
};
