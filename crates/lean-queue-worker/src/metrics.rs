use lean_queue_core::TaskReport;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Prometheus metrics for one worker process
pub struct WorkerMetrics {
    pub registry: Registry,

    // Fetch outcomes: task, empty, failed
    pub fetch_total: IntCounterVec,
    pub failed_fetch_attempts_total: IntCounter,

    // Reported tasks by status
    pub tasks_total: IntCounterVec,
    pub report_failures_total: IntCounter,

    pub task_duration: Histogram,
}

impl WorkerMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let fetch_total = IntCounterVec::new(
            Opts::new("lq_fetch_total", "Fetch calls by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(fetch_total.clone()))?;

        let failed_fetch_attempts_total = IntCounter::new(
            "lq_failed_fetch_attempts_total",
            "Requests spent on fetches that exhausted their retries",
        )?;
        registry.register(Box::new(failed_fetch_attempts_total.clone()))?;

        let tasks_total = IntCounterVec::new(
            Opts::new("lq_tasks_total", "Tasks executed by reported status"),
            &["status"],
        )?;
        registry.register(Box::new(tasks_total.clone()))?;

        let report_failures_total = IntCounter::new(
            "lq_report_failures_total",
            "Result submissions that did not reach the queue service",
        )?;
        registry.register(Box::new(report_failures_total.clone()))?;

        let task_duration = Histogram::with_opts(HistogramOpts::new(
            "lq_task_duration_seconds",
            "Time from task receipt to outcome classification",
        ))?;
        registry.register(Box::new(task_duration.clone()))?;

        Ok(WorkerMetrics {
            registry,
            fetch_total,
            failed_fetch_attempts_total,
            tasks_total,
            report_failures_total,
            task_duration,
        })
    }

    pub fn inc_fetch(&self, outcome: &str) {
        self.fetch_total.with_label_values(&[outcome]).inc();
    }

    pub fn fetch_count(&self, outcome: &str) -> u64 {
        self.fetch_total.with_label_values(&[outcome]).get()
    }

    pub fn inc_task(&self, report: &TaskReport) {
        let status = if report.is_success() { "success" } else { "error" };
        self.tasks_total.with_label_values(&[status]).inc();
    }

    pub fn task_count(&self, status: &str) -> u64 {
        self.tasks_total.with_label_values(&[status]).get()
    }

    /// Text exposition of every registered metric
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            return format!("# failed to encode metrics: {e}");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
