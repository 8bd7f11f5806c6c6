use crate::{Result, TaskError};
use serde::{Deserialize, Serialize};

/// Priority refinement for a fetch filter.
/// The queue service accepts values 1-10, higher is served first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Create a priority, rejecting values outside 1-10
    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Priority(value))
        } else {
            Err(TaskError::InvalidPriority(value))
        }
    }

    /// Highest priority (10)
    pub fn highest() -> Self {
        Priority(Self::MAX)
    }

    /// Lowest priority (1)
    pub fn lowest() -> Self {
        Priority(Self::MIN)
    }

    /// Get the raw priority value
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Priority {
    type Error = TaskError;

    fn try_from(value: u8) -> Result<Self> {
        Priority::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> u8 {
        priority.0
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
