pub mod config;
pub mod executor;
pub mod metrics;
pub mod step;
pub mod worker;

pub use config::WorkerConfig;
pub use executor::TaskExecutor;
pub use metrics::WorkerMetrics;
pub use step::{AutoConfirm, Checkpoint, Confirm, StdinConfirm, StepMode};
pub use worker::{IdleReason, StepOutcome, Worker};
