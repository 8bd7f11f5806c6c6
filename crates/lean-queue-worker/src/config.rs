use crate::step::StepMode;
use lean_queue_client::RetryPolicy;
use lean_queue_core::{OperationType, TaskFilter, ZeroResultPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub api_root: String,
    pub worker_id: Option<String>,
    pub filter: TaskFilter,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    /// Zero means retry immediately
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub idle_interval_secs: u64,
    /// Upper bound of a random extra delay added to each idle sleep
    pub idle_jitter_secs: u64,
    pub step_mode: StepMode,
    pub zero_result_policy: ZeroResultPolicy,
    pub include_end_time: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            api_root: "http://127.0.0.1:8383/".to_string(),
            worker_id: None,
            filter: TaskFilter::operation(OperationType::Addition),
            request_timeout_secs: 10,
            max_retries: 3,
            retry_base_delay_ms: 0,
            retry_max_delay_ms: 30_000,
            idle_interval_secs: 20,
            idle_jitter_secs: 0,
            step_mode: StepMode::Automatic,
            zero_result_policy: ZeroResultPolicy::Success,
            include_end_time: false,
        }
    }
}

impl WorkerConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: WorkerConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        self.filter.validate()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_secs(self.idle_interval_secs)
    }

    pub fn idle_jitter(&self) -> Duration {
        Duration::from_secs(self.idle_jitter_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        if self.retry_base_delay_ms == 0 {
            RetryPolicy::immediate(self.max_retries)
        } else {
            RetryPolicy::exponential(
                self.max_retries,
                Duration::from_millis(self.retry_base_delay_ms),
                Duration::from_millis(self.retry_max_delay_ms),
            )
        }
    }

    pub fn generate_worker_id(&self) -> String {
        use std::process;
        use uuid::Uuid;

        if let Some(id) = &self.worker_id {
            return id.clone();
        }

        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());

        let pid = process::id();
        let mut random = Uuid::new_v4().simple().to_string();
        random.truncate(8);

        format!("{}-{}-{}", hostname, pid, random)
    }
}
