//! Wire DTOs for the trace API.
//!
//! Steps are serialized inline under their execution and deliberately
//! omit the `executionId` back reference, so the parent/child relation
//! never recurses. `durationMs` is computed, not stored.

use serde::Serialize;
use time::OffsetDateTime;

use pipetrace_storage::{ExecutionRecord, StepRecord};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExecutionResponse {
    execution_id: String,
    #[serde(with = "time::serde::rfc3339")]
    start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    end_time: Option<OffsetDateTime>,
    status: String,
    context: serde_json::Value,
    steps: Vec<StepResponse>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    duration_ms: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StepResponse {
    step_id: String,
    step_name: String,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    input: Option<serde_json::Value>,
    output: Option<serde_json::Value>,
    reasoning: Option<String>,
    metadata: Option<serde_json::Value>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl From<StepRecord> for StepResponse {
    fn from(step: StepRecord) -> Self {
        Self {
            step_id: step.step_id,
            step_name: step.step_name,
            timestamp: step.timestamp,
            input: step.input,
            output: step.output,
            reasoning: step.reasoning,
            metadata: step.metadata,
            created_at: step.created_at,
        }
    }
}

impl From<ExecutionRecord> for ExecutionResponse {
    fn from(execution: ExecutionRecord) -> Self {
        let duration_ms = execution.duration_ms();
        Self {
            execution_id: execution.execution_id,
            start_time: execution.start_time,
            end_time: execution.end_time,
            status: execution.status.to_string(),
            context: execution.context,
            steps: execution.steps.into_iter().map(StepResponse::from).collect(),
            created_at: execution.created_at,
            duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipetrace_storage::ExecutionStatus;
    use time::macros::datetime;

    fn sample() -> ExecutionRecord {
        let t0 = datetime!(2026-01-01 00:00:00 UTC);
        let t1 = datetime!(2026-01-01 00:00:02 UTC);
        ExecutionRecord {
            execution_id: "exec_0000aaaa".to_string(),
            start_time: t0,
            end_time: Some(t1),
            status: ExecutionStatus::Completed,
            context: serde_json::json!({"foo": 1}),
            steps: vec![StepRecord {
                step_id: "step_0000bbbb".to_string(),
                step_name: "s1".to_string(),
                timestamp: t0,
                input: Some(serde_json::json!({"a": 2})),
                output: None,
                reasoning: Some("r".to_string()),
                metadata: None,
                execution_id: "exec_0000aaaa".to_string(),
                created_at: t0,
            }],
            created_at: t0,
            version: 3,
        }
    }

    #[test]
    fn wire_shape_is_camel_case_with_computed_duration() {
        let value = serde_json::to_value(ExecutionResponse::from(sample())).unwrap();
        assert_eq!(value["executionId"], "exec_0000aaaa");
        assert_eq!(value["status"], "COMPLETED");
        assert_eq!(value["durationMs"], 2000);
        assert_eq!(value["startTime"], "2026-01-01T00:00:00Z");
        assert_eq!(value["endTime"], "2026-01-01T00:00:02Z");
        assert_eq!(value["context"], serde_json::json!({"foo": 1}));
        // Storage-only concerns never reach the wire.
        assert!(value.get("version").is_none());
    }

    #[test]
    fn nested_steps_omit_the_back_reference() {
        let value = serde_json::to_value(ExecutionResponse::from(sample())).unwrap();
        let step = &value["steps"][0];
        assert_eq!(step["stepId"], "step_0000bbbb");
        assert_eq!(step["stepName"], "s1");
        assert_eq!(step["input"], serde_json::json!({"a": 2}));
        assert_eq!(step["output"], serde_json::Value::Null);
        assert_eq!(step["reasoning"], "r");
        assert!(step.get("executionId").is_none());
    }

    #[test]
    fn in_progress_executions_report_zero_duration_and_null_end() {
        let mut record = sample();
        record.end_time = None;
        record.status = ExecutionStatus::InProgress;
        let value = serde_json::to_value(ExecutionResponse::from(record)).unwrap();
        assert_eq!(value["durationMs"], 0);
        assert_eq!(value["endTime"], serde_json::Value::Null);
        assert_eq!(value["status"], "IN_PROGRESS");
    }
}
