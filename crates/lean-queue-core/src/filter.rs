use crate::{OperationType, Priority, Result, TaskError};
use serde::{Deserialize, Serialize};

/// Selection criteria sent with every "get next task" request.
///
/// Exactly one selector is active per filter. Priority only refines the
/// queue and tag selectors; the service does not accept it for type lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    /// Tasks from one queue
    Queue {
        id: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        priority: Option<Priority>,
    },

    /// Tasks from any queue carrying all of these tags
    Tags {
        tags: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        priority: Option<Priority>,
    },

    /// Tasks of one operation type, from any queue
    Type(OperationType),
}

impl TaskFilter {
    pub fn queue(id: u64) -> Self {
        TaskFilter::Queue { id, priority: None }
    }

    pub fn queue_with_priority(id: u64, priority: Priority) -> Self {
        TaskFilter::Queue {
            id,
            priority: Some(priority),
        }
    }

    /// Tag selector; at least one tag is required
    pub fn tags<I, S>(tags: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filter = TaskFilter::Tags {
            tags: tags.into_iter().map(Into::into).collect(),
            priority: None,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Tag selector with a priority refinement
    pub fn tags_with_priority<I, S>(tags: I, priority: Priority) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filter = TaskFilter::Tags {
            tags: tags.into_iter().map(Into::into).collect(),
            priority: Some(priority),
        };
        filter.validate()?;
        Ok(filter)
    }

    pub fn operation(operation: OperationType) -> Self {
        TaskFilter::Type(operation)
    }

    /// Check invariants that deserialization alone cannot enforce
    pub fn validate(&self) -> Result<()> {
        match self {
            TaskFilter::Tags { tags, .. } if tags.iter().all(|t| t.trim().is_empty()) => {
                Err(TaskError::EmptyTags)
            }
            _ => Ok(()),
        }
    }

    pub fn priority(&self) -> Option<Priority> {
        match self {
            TaskFilter::Queue { priority, .. } | TaskFilter::Tags { priority, .. } => *priority,
            TaskFilter::Type(_) => None,
        }
    }

    /// The operation pinned by a type selector, if any
    pub fn operation_type(&self) -> Option<OperationType> {
        match self {
            TaskFilter::Type(op) => Some(*op),
            _ => None,
        }
    }

    /// Wire name of the active selector
    pub fn selector(&self) -> &'static str {
        match self {
            TaskFilter::Queue { .. } => "queue",
            TaskFilter::Tags { .. } => "tags",
            TaskFilter::Type(_) => "type",
        }
    }
}

impl std::fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskFilter::Queue { id, .. } => write!(f, "queue={id}")?,
            TaskFilter::Tags { tags, .. } => write!(f, "tags={}", tags.join(","))?,
            TaskFilter::Type(op) => write!(f, "type={op}")?,
        }
        if let Some(priority) = self.priority() {
            write!(f, " priority={priority}")?;
        }
        Ok(())
    }
}
