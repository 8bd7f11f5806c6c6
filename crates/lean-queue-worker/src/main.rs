use clap::{ArgGroup, Parser};
use lean_queue_client::ReqwestTransport;
use lean_queue_core::{OperationType, Priority, TaskFilter, ZeroResultPolicy};
use lean_queue_worker::{StepMode, Worker, WorkerConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "lq-worker")]
#[command(about = "Lean Queue arithmetic worker", long_about = None)]
#[command(group(ArgGroup::new("selector").args(["queue", "tags", "task_type"])))]
struct Args {
    /// Queue service root URL
    #[arg(long, env = "LQ_API_ROOT")]
    api: Option<String>,

    /// Path to configuration file
    #[arg(long)]
    config: Option<String>,

    /// Fetch tasks from this queue
    #[arg(long)]
    queue: Option<u64>,

    /// Fetch tasks carrying these tags
    #[arg(long, value_delimiter = ',')]
    tags: Option<Vec<String>>,

    /// Fetch tasks of this operation type
    #[arg(long = "type")]
    task_type: Option<OperationType>,

    /// Priority (1-10) for queue and tag selection
    #[arg(long, conflicts_with = "task_type")]
    priority: Option<u8>,

    /// Pause for Enter before each fetch, execution and submission
    #[arg(long)]
    step: bool,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Retries after a failed fetch attempt
    #[arg(long)]
    retries: Option<u32>,

    /// Seconds to sleep when no task was obtained
    #[arg(long)]
    idle: Option<u64>,

    /// Upper bound in seconds of random extra idle time
    #[arg(long)]
    idle_jitter: Option<u64>,

    /// Report a zero result as an error
    #[arg(long)]
    zero_as_error: bool,

    /// Include endTime in submitted results
    #[arg(long)]
    end_time: bool,

    /// Worker ID (auto-generated if not provided)
    #[arg(long)]
    worker_id: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    /// Filter selected on the command line, if any
    fn filter(&self) -> anyhow::Result<Option<TaskFilter>> {
        let priority = self.priority.map(Priority::new).transpose()?;

        let filter = match (&self.queue, &self.tags, &self.task_type) {
            (Some(id), _, _) => match priority {
                Some(p) => TaskFilter::queue_with_priority(*id, p),
                None => TaskFilter::queue(*id),
            },
            (_, Some(tags), _) => match priority {
                Some(p) => TaskFilter::tags_with_priority(tags, p)?,
                None => TaskFilter::tags(tags)?,
            },
            (_, _, Some(operation)) => TaskFilter::operation(*operation),
            (None, None, None) => {
                if priority.is_some() {
                    anyhow::bail!("--priority requires --queue or --tags");
                }
                return Ok(None);
            }
        };
        Ok(Some(filter))
    }

    fn apply(self, config: &mut WorkerConfig) -> anyhow::Result<()> {
        if let Some(filter) = self.filter()? {
            config.filter = filter;
        }
        if let Some(api) = self.api {
            config.api_root = api;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }
        if let Some(retries) = self.retries {
            config.max_retries = retries;
        }
        if let Some(idle) = self.idle {
            config.idle_interval_secs = idle;
        }
        if let Some(jitter) = self.idle_jitter {
            config.idle_jitter_secs = jitter;
        }
        if self.step {
            config.step_mode = StepMode::ManualConfirm;
        }
        if self.zero_as_error {
            config.zero_result_policy = ZeroResultPolicy::Error;
        }
        if self.end_time {
            config.include_end_time = true;
        }
        if let Some(worker_id) = self.worker_id {
            config.worker_id = Some(worker_id);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
    );
    if args.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        WorkerConfig::from_file(config_path)?
    } else {
        WorkerConfig::default()
    };

    // Override with CLI args
    args.apply(&mut config)?;

    let transport = Arc::new(ReqwestTransport::new(&config.api_root)?);
    tracing::info!(api_root = %transport.root(), "Using queue service");

    let worker = Worker::new(config, transport)?;
    let metrics = worker.metrics();

    tokio::select! {
        _ = worker.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Received shutdown signal");
        }
    }

    tracing::debug!(metrics = %metrics.render(), "Final metrics");
    tracing::info!(worker_id = %worker.id(), "Worker stopped");

    Ok(())
}
