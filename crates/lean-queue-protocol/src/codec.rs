use crate::{ProtocolError, Result};
use lean_queue_core::Task;
use serde_json::Value;

/// A decoded `get-next-available-task` response
#[derive(Debug, Clone, PartialEq)]
pub enum NextTaskResponse {
    /// A task was assigned to this worker
    Task(Task),

    /// The service says nothing matches the filter right now
    Empty { message: String },
}

/// Classify a `get-next-available-task` response body.
///
/// The HTTP status is not consulted: the service answers an empty queue with
/// status 400 and a `message` body. A body with an `id` is a task;
/// a body with only a `message` is the empty sentinel; anything else
/// (service `error` payloads included) is malformed.
pub fn decode_next_task(body: &[u8]) -> Result<NextTaskResponse> {
    let value: Value = serde_json::from_slice(body)?;

    let object = value
        .as_object()
        .ok_or_else(|| ProtocolError::Malformed(format!("expected a JSON object, got {value}")))?;

    if object.get("id").is_some_and(|id| !id.is_null()) {
        let task = serde_json::from_value(value.clone())
            .map_err(|e| ProtocolError::Malformed(format!("invalid task payload: {e}")))?;
        return Ok(NextTaskResponse::Task(task));
    }

    if let Some(message) = object.get("message") {
        let message = match message {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Ok(NextTaskResponse::Empty { message });
    }

    match object.get("error") {
        Some(error) => Err(ProtocolError::Malformed(format!("service error: {error}"))),
        None => Err(ProtocolError::Malformed(format!(
            "neither a task nor an empty-queue message: {value}"
        ))),
    }
}
