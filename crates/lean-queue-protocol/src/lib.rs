mod codec;
mod message;

pub use codec::{decode_next_task, NextTaskResponse};
pub use message::{NextTaskRequest, SubmitResultsRequest};

use thiserror::Error;

/// Endpoint that hands out the next matching task
pub const NEXT_TASK_PATH: &str = "get-next-available-task";

/// Endpoint that records a task's result or error
pub const SUBMIT_RESULTS_PATH: &str = "submit-results";

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
