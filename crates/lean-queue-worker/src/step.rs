//! Manual step-through support.
//!
//! In [`StepMode::ManualConfirm`] the worker pauses at each [`Checkpoint`]
//! until the injected [`Confirm`] capability lets it continue.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    #[default]
    Automatic,
    ManualConfirm,
}

/// Points in one loop iteration where a manual run waits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Checkpoint {
    /// Before requesting the next task
    Fetch,
    /// After the fetch response arrived
    Continue,
    /// Before running the task's operation
    Execute,
    /// Before submitting the outcome
    Submit,
}

impl Checkpoint {
    pub fn prompt(&self) -> &'static str {
        match self {
            Checkpoint::Fetch => "Press Enter to get next task",
            Checkpoint::Continue => "Press Enter to continue",
            Checkpoint::Execute => "Press Enter to execute",
            Checkpoint::Submit => "Press Enter to submit",
        }
    }
}

#[async_trait]
pub trait Confirm: Send + Sync {
    /// Wait until the operator lets the worker pass `checkpoint`.
    /// `context` describes what is about to happen.
    async fn confirm(&self, checkpoint: Checkpoint, context: &str);
}

/// Never waits
pub struct AutoConfirm;

#[async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, _checkpoint: Checkpoint, _context: &str) {}
}

/// Waits for a line on standard input.
///
/// If stdin is closed or unreadable the worker keeps going rather than
/// stalling forever.
pub struct StdinConfirm {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl StdinConfirm {
    pub fn new() -> Self {
        StdinConfirm {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for StdinConfirm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, checkpoint: Checkpoint, context: &str) {
        if context.is_empty() {
            println!("{}...", checkpoint.prompt());
        } else {
            println!("{} ({})...", checkpoint.prompt(), context);
        }

        match self.lines.lock().await.next_line().await {
            Ok(Some(_)) => {}
            Ok(None) => warn!(?checkpoint, "stdin closed, continuing without confirmation"),
            Err(e) => warn!(?checkpoint, error = %e, "failed to read confirmation"),
        }
    }
}
