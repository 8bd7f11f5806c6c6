use chrono::{DateTime, Utc};
use lean_queue_core::{OperationType, Priority, TaskFilter, TaskId, TaskReport};
use serde::{Serialize, Serializer};

/// Body of `POST /get-next-available-task`.
///
/// Only constructible from a [`TaskFilter`], so exactly one of
/// `queue`/`tags`/`type` is ever present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    queue: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    task_type: Option<OperationType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,
}

impl From<&TaskFilter> for NextTaskRequest {
    fn from(filter: &TaskFilter) -> Self {
        let empty = NextTaskRequest {
            queue: None,
            tags: None,
            task_type: None,
            priority: filter.priority(),
        };

        match filter {
            TaskFilter::Queue { id, .. } => NextTaskRequest {
                queue: Some(*id),
                ..empty
            },
            TaskFilter::Tags { tags, .. } => NextTaskRequest {
                tags: Some(tags.clone()),
                ..empty
            },
            TaskFilter::Type(op) => NextTaskRequest {
                task_type: Some(*op),
                ..empty
            },
        }
    }
}

/// Body of `POST /submit-results`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitResultsRequest {
    pub id: TaskId,

    #[serde(serialize_with = "integral_when_exact")]
    pub result: Option<f64>,

    pub error: Option<String>,

    /// Diagnostic completion timestamp, omitted unless enabled
    #[serde(rename = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl SubmitResultsRequest {
    pub fn new(id: TaskId, report: &TaskReport) -> Self {
        SubmitResultsRequest {
            id,
            result: report.result(),
            error: report.error().map(str::to_string),
            end_time: None,
        }
    }

    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }
}

/// Largest magnitude at which every integer is exactly representable in f64
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// `9.0` goes out as `9` so the service stores the same value a JS worker would send.
fn integral_when_exact<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() <= MAX_EXACT_INTEGER => {
            serializer.serialize_some(&(*v as i64))
        }
        Some(v) => serializer.serialize_some(v),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lean_queue_core::{TaskError, ZeroResultPolicy};
    use serde_json::json;

    fn body(filter: &TaskFilter) -> serde_json::Value {
        serde_json::to_value(NextTaskRequest::from(filter)).unwrap()
    }

    #[test]
    fn test_queue_selector() {
        assert_eq!(body(&TaskFilter::queue(63)), json!({"queue": 63}));

        let p = Priority::new(3).unwrap();
        assert_eq!(
            body(&TaskFilter::queue_with_priority(63, p)),
            json!({"queue": 63, "priority": 3})
        );
    }

    #[test]
    fn test_tags_selector() {
        let filter = TaskFilter::tags_with_priority(["math", "fast"], Priority::highest()).unwrap();
        assert_eq!(
            body(&filter),
            json!({"tags": ["math", "fast"], "priority": 10})
        );
    }

    #[test]
    fn test_type_selector() {
        assert_eq!(
            body(&TaskFilter::operation(OperationType::Addition)),
            json!({"type": "addition"})
        );
    }

    #[test]
    fn test_exactly_one_selector_key() {
        let filters = [
            TaskFilter::queue_with_priority(1, Priority::lowest()),
            TaskFilter::tags(["a"]).unwrap(),
            TaskFilter::operation(OperationType::Division),
        ];

        for filter in &filters {
            let value = body(filter);
            let object = value.as_object().unwrap();
            let selectors: Vec<&str> = object
                .keys()
                .map(String::as_str)
                .filter(|k| ["queue", "tags", "type"].contains(k))
                .collect();
            assert_eq!(selectors, vec![filter.selector()], "filter {filter}");
            assert!(object.keys().all(|k| k == filter.selector() || k == "priority"));
        }
    }

    #[test]
    fn test_success_body() {
        let report = TaskReport::classify(Ok(9.0), ZeroResultPolicy::Success);
        let req = SubmitResultsRequest::new(TaskId::from("t1"), &report);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"id": "t1", "result": 9, "error": null})
        );
    }

    #[test]
    fn test_fractional_result_kept() {
        let req = SubmitResultsRequest::new(TaskId::Number(5), &TaskReport::Success(2.5));
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"id": 5, "result": 2.5, "error": null})
        );
    }

    #[test]
    fn test_failure_body() {
        let report = TaskReport::classify(Err(TaskError::DivisionByZero), ZeroResultPolicy::Success);
        let req = SubmitResultsRequest::new(TaskId::from("t2"), &report);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"id": "t2", "result": null, "error": "Division by zero"})
        );
    }

    #[test]
    fn test_zero_flagged_body() {
        let req = SubmitResultsRequest::new(TaskId::Number(8), &TaskReport::ZeroFlagged);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"id": 8, "result": 0, "error": "result is zero"})
        );
    }

    #[test]
    fn test_end_time_is_optional() {
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let req = SubmitResultsRequest::new(TaskId::Number(1), &TaskReport::Success(1.0))
            .with_end_time(end);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["endTime"], json!("2024-03-01T12:00:00Z"));
    }
}
