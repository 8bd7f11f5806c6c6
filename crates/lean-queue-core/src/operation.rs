use crate::{Result, TaskError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Arithmetic operations a worker knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl OperationType {
    pub const ALL: [OperationType; 4] = [
        OperationType::Addition,
        OperationType::Subtraction,
        OperationType::Multiplication,
        OperationType::Division,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Addition => "addition",
            OperationType::Subtraction => "subtraction",
            OperationType::Multiplication => "multiplication",
            OperationType::Division => "division",
        }
    }

    /// Apply the operation. Division is true division and refuses a zero divisor.
    pub fn apply(&self, num1: f64, num2: f64) -> Result<f64> {
        let value = match self {
            OperationType::Addition => num1 + num2,
            OperationType::Subtraction => num1 - num2,
            OperationType::Multiplication => num1 * num2,
            OperationType::Division => {
                if num2 == 0.0 {
                    return Err(TaskError::DivisionByZero);
                }
                num1 / num2
            }
        };

        if !value.is_finite() {
            return Err(TaskError::NonFiniteResult {
                operation: self.as_str().to_string(),
            });
        }

        Ok(value)
    }
}

impl FromStr for OperationType {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "addition" => Ok(OperationType::Addition),
            "subtraction" => Ok(OperationType::Subtraction),
            "multiplication" => Ok(OperationType::Multiplication),
            "division" => Ok(OperationType::Division),
            other => Err(TaskError::UnsupportedOperation(other.to_string())),
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run the named operation over two operands.
///
/// Unknown operation names fail with [`TaskError::UnsupportedOperation`];
/// arithmetic faults are returned to the caller, never folded into a value.
pub fn execute(operation: &str, num1: f64, num2: f64) -> Result<f64> {
    operation.parse::<OperationType>()?.apply(num1, num2)
}
