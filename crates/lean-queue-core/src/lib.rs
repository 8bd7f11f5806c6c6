mod error;
mod filter;
mod operation;
mod priority;
mod report;
mod task;

pub use error::{TaskError, Result};
pub use filter::TaskFilter;
pub use operation::{execute, OperationType};
pub use priority::Priority;
pub use report::{TaskReport, ZeroResultPolicy, ZERO_RESULT_ERROR};
pub use task::{Task, TaskId, TaskParams};
