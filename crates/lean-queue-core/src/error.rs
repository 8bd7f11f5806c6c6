use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    #[error("Unsupported operation type: {0}")]
    UnsupportedOperation(String),

    #[error("Task does not declare an operation type")]
    MissingOperation,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result of {operation} is not a finite number")]
    NonFiniteResult { operation: String },

    #[error("Invalid priority value: {0} (expected 1-10)")]
    InvalidPriority(u8),

    #[error("Tag filter requires at least one tag")]
    EmptyTags,
}

impl TaskError {
    /// Faults raised by the arithmetic itself rather than by the task's shape.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            TaskError::DivisionByZero | TaskError::NonFiniteResult { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TaskError>;
