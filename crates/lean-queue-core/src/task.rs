use crate::{OperationType, Result, TaskError, TaskFilter};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Server-assigned task identifier.
///
/// The worker never interprets it; it is echoed back in the same JSON form
/// (number or string) it was received in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl From<i64> for TaskId {
    fn from(id: i64) -> Self {
        TaskId::Number(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        TaskId::Text(id.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskId::Number(id) => write!(f, "{id}"),
            TaskId::Text(id) => f.write_str(id),
        }
    }
}

/// The two operands of an arithmetic task
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskParams {
    #[serde(deserialize_with = "operand")]
    pub num1: f64,
    #[serde(deserialize_with = "operand")]
    pub num2: f64,
}

/// Accepts a JSON number or a numeric string.
fn operand<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("operand is not a number: {s:?}"))),
    }
}

/// A task as handed out by the queue service. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,

    pub params: TaskParams,

    /// Raw operation name; the service omits it when the worker fetched by type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, operation: OperationType, num1: f64, num2: f64) -> Self {
        Task {
            id: id.into(),
            params: TaskParams { num1, num2 },
            task_type: Some(operation.as_str().to_string()),
        }
    }

    /// Operation name to run: the task's own type, else the one the filter pinned
    pub fn operation_name(&self, filter: &TaskFilter) -> Result<String> {
        match (&self.task_type, filter.operation_type()) {
            (Some(name), _) => Ok(name.clone()),
            (None, Some(op)) => Ok(op.as_str().to_string()),
            (None, None) => Err(TaskError::MissingOperation),
        }
    }

    /// Execute this task's operation over its operands
    pub fn run(&self, filter: &TaskFilter) -> Result<f64> {
        let name = self.operation_name(filter)?;
        crate::execute(&name, self.params.num1, self.params.num2)
    }
}
