use thiserror::Error;

use crate::core::task::TaskId;

/// Local form rule violations. These never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required (min 2 chars)")]
    TitleTooShort,
    #[error("Description is required")]
    MissingDescription,
    #[error("Due date is required")]
    MissingDueDate,
    #[error("Completed status is required")]
    MissingCompleted,
}

/// Failures reported by a task gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Transport failure, or a non-success status on a read or delete.
    #[error("{0}")]
    Network(String),
    /// The server refused a create or update payload.
    #[error("{0}")]
    Rejected(String),
    /// A success response whose body could not be decoded.
    #[error("{0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("Task {0} is not loaded")]
    UnknownTask(TaskId),
}

pub type TaskResult<T> = Result<T, TaskError>;
