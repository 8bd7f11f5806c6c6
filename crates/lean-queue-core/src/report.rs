use crate::TaskError;
use serde::{Deserialize, Serialize};

/// Error message attached to zero results under [`ZeroResultPolicy::Error`]
pub const ZERO_RESULT_ERROR: &str = "result is zero";

/// How a successful result of exactly zero is reported.
///
/// Early workers reported any falsy result as an error. Nothing on the
/// service side depends on that, so the default reports zero as a success;
/// `Error` is kept for deployments that still expect the old shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroResultPolicy {
    #[default]
    Success,
    Error,
}

/// Outcome of one task, as it will be submitted to the queue service
#[derive(Debug, Clone, PartialEq)]
pub enum TaskReport {
    /// Numeric result, no error
    Success(f64),

    /// Error message, no result
    Failure(String),

    /// Legacy zero-as-error report: carries both `result: 0` and
    /// [`ZERO_RESULT_ERROR`]
    ZeroFlagged,
}

impl TaskReport {
    /// Classify an execution outcome under the given zero policy
    pub fn classify(outcome: Result<f64, TaskError>, policy: ZeroResultPolicy) -> Self {
        match outcome {
            Ok(value) if value == 0.0 && policy == ZeroResultPolicy::Error => {
                TaskReport::ZeroFlagged
            }
            Ok(value) => TaskReport::Success(value),
            Err(e) => TaskReport::Failure(e.to_string()),
        }
    }

    pub fn result(&self) -> Option<f64> {
        match self {
            TaskReport::Success(value) => Some(*value),
            TaskReport::ZeroFlagged => Some(0.0),
            TaskReport::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TaskReport::Success(_) => None,
            TaskReport::Failure(message) => Some(message),
            TaskReport::ZeroFlagged => Some(ZERO_RESULT_ERROR),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskReport::Success(_))
    }
}
