use crate::{
    config::WorkerConfig,
    executor::TaskExecutor,
    metrics::WorkerMetrics,
    step::{AutoConfirm, Checkpoint, Confirm, StdinConfirm, StepMode},
};
use lean_queue_client::{FetchOutcome, HttpTransport, Reporter, RetryPolicy, TaskFetcher};
use lean_queue_core::{TaskId, TaskReport};

use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Why an iteration ended without a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleReason {
    /// The service said no task matches the filter
    Empty,
    /// The fetch exhausted its retries
    FetchFailed,
}

/// What one loop iteration did
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Idle(IdleReason),
    Processed {
        task_id: TaskId,
        report: TaskReport,
        submitted: bool,
    },
}

/// Single-threaded polling worker: fetch, execute, report, repeat
pub struct Worker {
    config: WorkerConfig,
    worker_id: String,
    retry_policy: RetryPolicy,
    fetcher: TaskFetcher,
    executor: TaskExecutor,
    reporter: Reporter,
    confirm: Arc<dyn Confirm>,
    metrics: Arc<WorkerMetrics>,
}

impl Worker {
    pub fn new(config: WorkerConfig, transport: Arc<dyn HttpTransport>) -> anyhow::Result<Self> {
        config.validate()?;

        let worker_id = config.generate_worker_id();
        let confirm: Arc<dyn Confirm> = match config.step_mode {
            StepMode::Automatic => Arc::new(AutoConfirm),
            StepMode::ManualConfirm => Arc::new(StdinConfirm::new()),
        };

        Ok(Worker {
            retry_policy: config.retry_policy(),
            fetcher: TaskFetcher::new(transport.clone()),
            executor: TaskExecutor::new(config.filter.clone(), config.zero_result_policy),
            reporter: Reporter::new(transport, config.request_timeout())
                .with_end_time(config.include_end_time),
            confirm,
            metrics: Arc::new(WorkerMetrics::new()?),
            worker_id,
            config,
        })
    }

    /// Replace the confirmation capability used in manual step mode
    pub fn with_confirm(mut self, confirm: Arc<dyn Confirm>) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn id(&self) -> &str {
        &self.worker_id
    }

    pub fn metrics(&self) -> Arc<WorkerMetrics> {
        self.metrics.clone()
    }

    /// Run the worker. Never returns; stop it by dropping the future.
    pub async fn run(&self) {
        info!(
            worker_id = %self.worker_id,
            filter = %self.config.filter,
            step_mode = ?self.config.step_mode,
            "Starting worker"
        );

        loop {
            self.step().await;
        }
    }

    /// One iteration: fetch, then either idle or execute and report.
    pub async fn step(&self) -> StepOutcome {
        let filter = &self.config.filter;

        self.checkpoint(Checkpoint::Fetch, &filter.to_string()).await;
        info!(%filter, "Fetching tasks...");

        let outcome = self
            .fetcher
            .fetch(filter, self.config.request_timeout(), &self.retry_policy)
            .await;

        self.checkpoint(Checkpoint::Continue, "").await;

        let task = match outcome {
            FetchOutcome::Task(task) => {
                self.metrics.inc_fetch("task");
                task
            }
            FetchOutcome::Empty { message } => {
                self.metrics.inc_fetch("empty");
                info!(%message, "No tasks found, worker going to sleep mode");
                self.idle().await;
                return StepOutcome::Idle(IdleReason::Empty);
            }
            FetchOutcome::Failed { attempts, last_error } => {
                self.metrics.inc_fetch("failed");
                self.metrics.failed_fetch_attempts_total.inc_by(u64::from(attempts));
                warn!(attempts, error = %last_error, "Could not reach queue service, worker going to sleep mode");
                self.idle().await;
                return StepOutcome::Idle(IdleReason::FetchFailed);
            }
        };

        info!(task_id = %task.id, task_type = ?task.task_type, params = ?task.params, "Task found");

        let started = Instant::now();
        self.checkpoint(Checkpoint::Execute, &task.id.to_string()).await;
        let report = self.executor.execute(&task);
        self.metrics.task_duration.observe(started.elapsed().as_secs_f64());
        self.metrics.inc_task(&report);

        self.checkpoint(Checkpoint::Submit, &format!("{report:?}")).await;
        let submitted = match self.reporter.report(&task.id, &report).await {
            Ok(()) => {
                info!(task_id = %task.id, "Results submitted successfully");
                true
            }
            Err(_) => {
                self.metrics.report_failures_total.inc();
                false
            }
        };

        StepOutcome::Processed {
            task_id: task.id,
            report,
            submitted,
        }
    }

    async fn checkpoint(&self, checkpoint: Checkpoint, context: &str) {
        if self.config.step_mode == StepMode::ManualConfirm {
            self.confirm.confirm(checkpoint, context).await;
        }
    }

    async fn idle(&self) {
        let delay = self.idle_delay();
        debug!(?delay, "sleeping");
        tokio::time::sleep(delay).await;
    }

    fn idle_delay(&self) -> Duration {
        let jitter = self.config.idle_jitter();
        if jitter.is_zero() {
            return self.config.idle_interval();
        }
        let extra_ms = rand::thread_rng().gen_range(0..=jitter.as_millis() as u64);
        self.config.idle_interval() + Duration::from_millis(extra_ms)
    }
}
