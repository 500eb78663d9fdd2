use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

/// Maximum width of the persisted status field, in Unicode scalar values.
pub const STATUS_MAX_CHARS: usize = 500;

const FAILED_PREFIX: &str = "FAILED:";

/// Lifecycle status of an execution.
///
/// Serialized as the wire strings `IN_PROGRESS`, `COMPLETED`, or
/// `FAILED:<reason>`. The failed form carries a free-form reason; the
/// composed string is truncated to [`STATUS_MAX_CHARS`] characters so it
/// always fits the status column, cutting at a char boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    InProgress,
    Completed,
    Failed(String),
}

impl ExecutionStatus {
    /// Build a `Failed` status from a reason, truncating the composed
    /// `FAILED:<reason>` string to the status field bound.
    pub fn failed(reason: &str) -> Self {
        let budget = STATUS_MAX_CHARS - FAILED_PREFIX.chars().count();
        let truncated: String = reason.chars().take(budget).collect();
        ExecutionStatus::Failed(truncated)
    }

    /// Whether the execution has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::InProgress)
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "IN_PROGRESS" => Some(ExecutionStatus::InProgress),
            "COMPLETED" => Some(ExecutionStatus::Completed),
            _ => s
                .strip_prefix(FAILED_PREFIX)
                .map(|reason| ExecutionStatus::Failed(reason.to_string())),
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::InProgress => f.write_str("IN_PROGRESS"),
            ExecutionStatus::Completed => f.write_str("COMPLETED"),
            ExecutionStatus::Failed(reason) => write!(f, "{FAILED_PREFIX}{reason}"),
        }
    }
}

impl Serialize for ExecutionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ExecutionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ExecutionStatus::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown execution status: {s}")))
    }
}

/// One recorded unit of work within an execution.
///
/// Steps are immutable once recorded and are owned by exactly one
/// execution; `execution_id` is the back reference and is never emitted
/// when the step is nested inside its parent on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step_id: String,
    pub step_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub input: Option<serde_json::Value>,
    pub output: Option<serde_json::Value>,
    pub reasoning: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub execution_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The root trace aggregate: one pipeline run plus its owned steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub execution_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    pub status: ExecutionStatus,
    pub context: serde_json::Value,
    /// Steps in insertion order. Emit via [`ExecutionRecord::sort_steps`]
    /// for the timestamp-ascending wire order.
    pub steps: Vec<StepRecord>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Optimistic-concurrency version, bumped by the store on every update.
    pub version: i64,
}

impl ExecutionRecord {
    /// Execution duration in whole milliseconds; 0 while still in progress.
    pub fn duration_ms(&self) -> i64 {
        match self.end_time {
            Some(end) => (end - self.start_time).whole_milliseconds() as i64,
            None => 0,
        }
    }

    /// Sort steps by timestamp ascending. The sort is stable, so steps
    /// sharing a timestamp keep their insertion order.
    pub fn sort_steps(&mut self) {
        self.steps.sort_by_key(|s| s.timestamp);
    }
}
