use crate::{ClientError, HttpTransport, Result};
use chrono::Utc;
use lean_queue_core::{TaskId, TaskReport};
use lean_queue_protocol::{ProtocolError, SubmitResultsRequest, SUBMIT_RESULTS_PATH};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Submits task outcomes to the queue service.
///
/// Submission is fire-and-forget: one request per report, never retried.
/// The returned error exists for accounting only.
pub struct Reporter {
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
    include_end_time: bool,
}

impl Reporter {
    pub fn new(transport: Arc<dyn HttpTransport>, timeout: Duration) -> Self {
        Reporter {
            transport,
            timeout,
            include_end_time: false,
        }
    }

    /// Attach an `endTime` timestamp to every submission
    pub fn with_end_time(mut self, enabled: bool) -> Self {
        self.include_end_time = enabled;
        self
    }

    pub async fn report(&self, task_id: &TaskId, report: &TaskReport) -> Result<()> {
        let mut request = SubmitResultsRequest::new(task_id.clone(), report);
        if self.include_end_time {
            request = request.with_end_time(Utc::now());
        }

        let body = serde_json::to_value(&request).map_err(ProtocolError::from)?;

        let response = match self.transport.post_json(SUBMIT_RESULTS_PATH, &body, self.timeout).await {
            Ok(response) => response,
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "failed to submit results");
                return Err(e.into());
            }
        };

        if !response.is_success() {
            let err = ClientError::Rejected {
                status: response.status,
                body: response.body_text(),
            };
            warn!(task_id = %task_id, error = %err, "failed to submit results");
            return Err(err);
        }

        debug!(task_id = %task_id, "results submitted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedTransport;
    use crate::TransportError;
    use lean_queue_core::{TaskError, ZeroResultPolicy};
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn test_success_report() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(SUBMIT_RESULTS_PATH, 200, json!({"ok": true}));

        let reporter = Reporter::new(transport.clone(), TIMEOUT);
        reporter
            .report(&TaskId::from("t1"), &TaskReport::Success(9.0))
            .await
            .unwrap();

        assert_eq!(
            transport.bodies(SUBMIT_RESULTS_PATH),
            vec![json!({"id": "t1", "result": 9, "error": null})]
        );
    }

    #[tokio::test]
    async fn test_error_report() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(SUBMIT_RESULTS_PATH, 200, json!({"ok": true}));

        let report = TaskReport::classify(Err(TaskError::DivisionByZero), ZeroResultPolicy::Success);
        Reporter::new(transport.clone(), TIMEOUT)
            .report(&TaskId::Number(2), &report)
            .await
            .unwrap();

        assert_eq!(
            transport.bodies(SUBMIT_RESULTS_PATH),
            vec![json!({"id": 2, "result": null, "error": "Division by zero"})]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_not_retried() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail(SUBMIT_RESULTS_PATH, TransportError::Timeout(TIMEOUT));
        transport.respond(SUBMIT_RESULTS_PATH, 200, json!({"ok": true}));

        let err = Reporter::new(transport.clone(), TIMEOUT)
            .report(&TaskId::Number(1), &TaskReport::Success(1.0))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Transport(TransportError::Timeout(_))));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_server_rejection() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(SUBMIT_RESULTS_PATH, 500, json!({"error": "Internal server error"}));

        let err = Reporter::new(transport.clone(), TIMEOUT)
            .report(&TaskId::Number(1), &TaskReport::Success(1.0))
            .await
            .unwrap_err();

        match err {
            ClientError::Rejected { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("Internal server error"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_end_time_attached() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(SUBMIT_RESULTS_PATH, 200, json!({"ok": true}));

        Reporter::new(transport.clone(), TIMEOUT)
            .with_end_time(true)
            .report(&TaskId::Number(1), &TaskReport::Success(1.0))
            .await
            .unwrap();

        let body = &transport.bodies(SUBMIT_RESULTS_PATH)[0];
        let end_time = body["endTime"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(end_time).is_ok());
    }
}
