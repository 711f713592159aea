use thiserror::Error;

/// Domain errors raised by task and session operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FocusError {
    #[error("task {0} not found")]
    TaskNotFound(String),

    #[error("subtask {subtask_id} not found in task {task_id}")]
    SubTaskNotFound { task_id: String, subtask_id: String },

    #[error("subtask {0} is locked until the previous steps are completed")]
    SubTaskLocked(String),

    #[error("subtask {0} is already completed")]
    SubTaskAlreadyDone(String),

    #[error("a focus session is already in progress")]
    SessionAlreadyActive,

    #[error("no focus session is in progress")]
    NoActiveSession,

    #[error("estimate must be at least 1 pomodoro, got {0}")]
    InvalidEstimate(u32),

    #[error("task description is empty")]
    EmptyDescription,
}
