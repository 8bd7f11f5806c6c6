use crate::{ClientError, HttpTransport, RetryPolicy};
use lean_queue_core::{Task, TaskFilter};
use lean_queue_protocol::{decode_next_task, NextTaskRequest, NextTaskResponse, ProtocolError, NEXT_TASK_PATH};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Result of one fetch call
#[derive(Debug)]
pub enum FetchOutcome {
    /// The service assigned a task
    Task(Task),

    /// The service reported that nothing matches the filter
    Empty { message: String },

    /// Every attempt failed; nothing is known about the queue
    Failed { attempts: u32, last_error: ClientError },
}

/// Asks the queue service for the next task matching a filter
pub struct TaskFetcher {
    transport: Arc<dyn HttpTransport>,
}

impl TaskFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        TaskFetcher { transport }
    }

    /// Fetch the next task.
    ///
    /// An empty-queue answer is returned at once and never retried. Timeouts,
    /// connection failures and malformed bodies are retried per `policy`;
    /// when retries run out the outcome is `Failed`.
    pub async fn fetch(&self, filter: &TaskFilter, timeout: Duration, policy: &RetryPolicy) -> FetchOutcome {
        let body = match serde_json::to_value(NextTaskRequest::from(filter)) {
            Ok(body) => body,
            Err(e) => {
                return FetchOutcome::Failed {
                    attempts: 0,
                    last_error: ProtocolError::from(e).into(),
                }
            }
        };

        let mut attempts = 0;
        loop {
            attempts += 1;
            debug!(%filter, attempt = attempts, "requesting next task");

            let error = match self.attempt(&body, timeout).await {
                Ok(NextTaskResponse::Task(task)) => return FetchOutcome::Task(task),
                Ok(NextTaskResponse::Empty { message }) => return FetchOutcome::Empty { message },
                Err(e) => e,
            };

            let retries_used = attempts - 1;
            if !policy.should_retry(retries_used) {
                error!(%filter, attempts, error = %error, "giving up on fetch");
                return FetchOutcome::Failed {
                    attempts,
                    last_error: error,
                };
            }

            let delay = policy.calculate_delay(retries_used);
            warn!(
                %filter,
                attempt = attempts,
                max_retries = policy.max_retries,
                error = %error,
                "fetch failed, retrying in {:?}",
                delay
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    async fn attempt(&self, body: &serde_json::Value, timeout: Duration) -> Result<NextTaskResponse, ClientError> {
        let response = self.transport.post_json(NEXT_TASK_PATH, body, timeout).await?;
        debug!(status = response.status, "next task response");
        Ok(decode_next_task(&response.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedTransport;
    use crate::TransportError;
    use lean_queue_core::{OperationType, Priority, TaskId};
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn empty_body() -> serde_json::Value {
        json!({"message": "No available task found"})
    }

    fn task_body() -> serde_json::Value {
        json!({"id": "t1", "params": {"num1": 4, "num2": 5}, "type": "addition"})
    }

    fn fetcher(transport: &Arc<ScriptedTransport>) -> TaskFetcher {
        TaskFetcher::new(transport.clone())
    }

    #[tokio::test]
    async fn test_task_found() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(NEXT_TASK_PATH, 200, task_body());

        let outcome = fetcher(&transport)
            .fetch(&TaskFilter::queue(63), TIMEOUT, &RetryPolicy::default())
            .await;

        match outcome {
            FetchOutcome::Task(task) => assert_eq!(task.id, TaskId::from("t1")),
            other => panic!("expected task, got {other:?}"),
        }
        assert_eq!(transport.requests()[0].timeout, TIMEOUT);
    }

    #[tokio::test]
    async fn test_empty_is_never_retried() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(NEXT_TASK_PATH, 400, empty_body());
        transport.respond(NEXT_TASK_PATH, 200, task_body());

        let outcome = fetcher(&transport)
            .fetch(&TaskFilter::queue(63), TIMEOUT, &RetryPolicy::immediate(5))
            .await;

        assert!(matches!(outcome, FetchOutcome::Empty { ref message } if message == "No available task found"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .fail(NEXT_TASK_PATH, TransportError::Timeout(TIMEOUT))
            .fail(NEXT_TASK_PATH, TransportError::Connection("refused".into()))
            .respond_raw(NEXT_TASK_PATH, 502, "<html>bad gateway</html>")
            .respond(NEXT_TASK_PATH, 200, task_body());

        // Three failures, three retries allowed: the fourth attempt wins
        let outcome = fetcher(&transport)
            .fetch(&TaskFilter::queue(63), TIMEOUT, &RetryPolicy::immediate(3))
            .await;

        assert!(matches!(outcome, FetchOutcome::Task(_)));
        assert_eq!(transport.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let transport = Arc::new(ScriptedTransport::new());
        for _ in 0..3 {
            transport.fail(NEXT_TASK_PATH, TransportError::Timeout(TIMEOUT));
        }
        transport.respond(NEXT_TASK_PATH, 200, task_body());

        let outcome = fetcher(&transport)
            .fetch(&TaskFilter::queue(63), TIMEOUT, &RetryPolicy::immediate(2))
            .await;

        match outcome {
            FetchOutcome::Failed { attempts, last_error } => {
                assert_eq!(attempts, 3);
                assert!(matches!(last_error, ClientError::Transport(TransportError::Timeout(_))));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        // No request beyond the cap
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(NEXT_TASK_PATH, 500, json!({"error": "Internal server error"}));

        let outcome = fetcher(&transport)
            .fetch(&TaskFilter::queue(1), TIMEOUT, &RetryPolicy::immediate(0))
            .await;

        match outcome {
            FetchOutcome::Failed { attempts, last_error } => {
                assert_eq!(attempts, 1);
                assert!(matches!(last_error, ClientError::Protocol(ProtocolError::Malformed(_))));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_between_attempts() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .fail(NEXT_TASK_PATH, TransportError::Connection("refused".into()))
            .fail(NEXT_TASK_PATH, TransportError::Connection("refused".into()))
            .respond(NEXT_TASK_PATH, 400, empty_body());

        let policy = RetryPolicy::exponential(3, Duration::from_secs(1), Duration::from_secs(60));
        let start = tokio::time::Instant::now();
        let outcome = fetcher(&transport)
            .fetch(&TaskFilter::queue(1), TIMEOUT, &policy)
            .await;

        assert!(matches!(outcome, FetchOutcome::Empty { .. }));
        // 1s after the first failure, 2s after the second
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_request_body_per_selector() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fallback(NEXT_TASK_PATH, 400, empty_body());
        let client = fetcher(&transport);
        let policy = RetryPolicy::default();

        let p = Priority::new(7).unwrap();
        client.fetch(&TaskFilter::queue_with_priority(63, p), TIMEOUT, &policy).await;
        client.fetch(&TaskFilter::tags(["math"]).unwrap(), TIMEOUT, &policy).await;
        client
            .fetch(&TaskFilter::operation(OperationType::Multiplication), TIMEOUT, &policy)
            .await;

        assert_eq!(
            transport.bodies(NEXT_TASK_PATH),
            vec![
                json!({"queue": 63, "priority": 7}),
                json!({"tags": ["math"]}),
                json!({"type": "multiplication"}),
            ]
        );
    }
}
