use lean_queue_core::{Task, TaskError, TaskFilter, TaskReport, ZeroResultPolicy};
use tracing::{error, info, warn};

/// Runs fetched tasks and classifies their outcome for reporting
pub struct TaskExecutor {
    filter: TaskFilter,
    zero_policy: ZeroResultPolicy,
}

impl TaskExecutor {
    /// `filter` supplies the operation for tasks fetched by type, which the
    /// service hands out without a `type` field.
    pub fn new(filter: TaskFilter, zero_policy: ZeroResultPolicy) -> Self {
        TaskExecutor { filter, zero_policy }
    }

    /// Execute a task. Every fault becomes a failure report; nothing escapes.
    pub fn execute(&self, task: &Task) -> TaskReport {
        let outcome = task.run(&self.filter);

        match &outcome {
            Ok(value) => {
                info!(task_id = %task.id, result = value, "Task executed successfully");
            }
            Err(e @ (TaskError::UnsupportedOperation(_) | TaskError::MissingOperation)) => {
                warn!(task_id = %task.id, error = %e, "Task declares an operation this worker cannot run");
            }
            Err(e) if e.is_arithmetic() => {
                warn!(task_id = %task.id, error = %e, "Arithmetic fault while executing task");
            }
            Err(e) => {
                error!(task_id = %task.id, error = %e, "Task failed");
            }
        }

        let report = TaskReport::classify(outcome, self.zero_policy);
        if report == TaskReport::ZeroFlagged {
            warn!(task_id = %task.id, "Result is zero, reporting as error");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lean_queue_core::{OperationType, ZERO_RESULT_ERROR};

    fn executor(policy: ZeroResultPolicy) -> TaskExecutor {
        TaskExecutor::new(TaskFilter::queue(1), policy)
    }

    #[test]
    fn test_success() {
        let task = Task::new("t1", OperationType::Addition, 4.0, 5.0);
        assert_eq!(
            executor(ZeroResultPolicy::Success).execute(&task),
            TaskReport::Success(9.0)
        );
    }

    #[test]
    fn test_division_fault_reported() {
        let task = Task::new("t2", OperationType::Division, 10.0, 0.0);
        assert_eq!(
            executor(ZeroResultPolicy::Success).execute(&task),
            TaskReport::Failure(TaskError::DivisionByZero.to_string())
        );
    }

    #[test]
    fn test_unsupported_operation_reported() {
        let mut task = Task::new("t3", OperationType::Addition, 1.0, 1.0);
        task.task_type = Some("exponent".to_string());
        assert_eq!(
            executor(ZeroResultPolicy::Success).execute(&task),
            TaskReport::Failure("Unsupported operation type: exponent".to_string())
        );
    }

    #[test]
    fn test_zero_policy_applied() {
        let task = Task::new("t4", OperationType::Subtraction, 3.0, 3.0);
        assert_eq!(
            executor(ZeroResultPolicy::Success).execute(&task),
            TaskReport::Success(0.0)
        );

        let report = executor(ZeroResultPolicy::Error).execute(&task);
        assert_eq!(report.result(), Some(0.0));
        assert_eq!(report.error(), Some(ZERO_RESULT_ERROR));
    }

    #[test]
    fn test_type_filter_supplies_operation() {
        let mut task = Task::new("t5", OperationType::Addition, 6.0, 3.0);
        task.task_type = None;
        let by_type = TaskExecutor::new(
            TaskFilter::operation(OperationType::Division),
            ZeroResultPolicy::Success,
        );
        assert_eq!(by_type.execute(&task), TaskReport::Success(2.0));
    }
}
