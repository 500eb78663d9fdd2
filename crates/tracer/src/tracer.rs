use std::sync::Arc;

use serde::Serialize;

use pipetrace_storage::{
    ExecutionRecord, ExecutionStatus, ExecutionStore, StepRecord, StorageError,
};

use crate::clock::Clock;
use crate::encode::encode_value;
use crate::error::TraceError;
use crate::id::{IdGenerator, EXEC_PREFIX, STEP_PREFIX};

/// How many fresh ids to try before surfacing `Conflict`. The spec demands
/// at least one internal retry; collisions in a 32-bit hex space are rare
/// enough that four attempts never fail in practice.
const MAX_ID_ATTEMPTS: usize = 4;

/// One step as the producer describes it, before the tracer assigns an id
/// and timestamp.
///
/// Producer values are encoded to JSON trees eagerly as the builder
/// methods run; encoding failures are held back and surfaced as
/// `BadInput` by [`Tracer::record_step`], so each field fails
/// independently and builder chains stay infallible.
#[derive(Debug)]
pub struct StepDraft {
    step_name: String,
    input: Option<Result<serde_json::Value, TraceError>>,
    output: Option<Result<serde_json::Value, TraceError>>,
    reasoning: Option<String>,
    metadata: Option<Result<serde_json::Value, TraceError>>,
}

impl StepDraft {
    pub fn new(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            input: None,
            output: None,
            reasoning: None,
            metadata: None,
        }
    }

    pub fn input<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.input = Some(encode_value("step input", value));
        self
    }

    pub fn output<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.output = Some(encode_value("step output", value));
        self
    }

    pub fn metadata<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.metadata = Some(encode_value("step metadata", value));
        self
    }

    pub fn reasoning(mut self, text: impl Into<String>) -> Self {
        self.reasoning = Some(text.into());
        self
    }
}

/// The producer-facing tracing API.
///
/// Opens executions, appends steps, and closes executions against an
/// [`ExecutionStore`]. Every operation is one atomic aggregate write;
/// id allocation and clock reads happen before the commit they belong
/// to, and log lines are emitted only after it, so an observed log line
/// implies durable state.
///
/// Concurrent `record_step` calls on one execution serialize through the
/// store's optimistic concurrency check: the loser of a write/write
/// conflict re-reads the aggregate and retries, keeping the step id and
/// timestamp it already assigned. No step is lost, none is duplicated.
pub struct Tracer<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    ids: IdGenerator,
}

// Manual impl: Arc makes this cheap regardless of whether S is Clone.
impl<S> Clone for Tracer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            ids: self.ids,
        }
    }
}

impl<S: ExecutionStore> Tracer<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ids: IdGenerator,
        }
    }

    /// Open a new execution with the given producer context.
    ///
    /// Returns the allocated execution id. Fails with `BadInput` if the
    /// context is not JSON-encodable; nothing is persisted on failure.
    pub async fn start_execution<C: Serialize + ?Sized>(
        &self,
        context: &C,
    ) -> Result<String, TraceError> {
        let context = encode_value("context", context)?;
        for _ in 0..MAX_ID_ATTEMPTS {
            let execution_id = self.ids.generate(EXEC_PREFIX);
            let now = self.clock.now();
            let record = ExecutionRecord {
                execution_id: execution_id.clone(),
                start_time: now,
                end_time: None,
                status: ExecutionStatus::InProgress,
                context: context.clone(),
                steps: Vec::new(),
                created_at: now,
                version: 0,
            };
            match self.store.insert_execution(record).await {
                Ok(()) => {
                    tracing::info!(execution_id = %execution_id, "started execution");
                    return Ok(execution_id);
                }
                Err(StorageError::DuplicateId { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(TraceError::Conflict(
            "could not allocate a unique execution id".to_string(),
        ))
    }

    /// Append one step to an in-progress execution.
    ///
    /// Fails with `NotFound` if the execution does not exist, `BadInput`
    /// if the step name is empty or a field failed to encode, and
    /// `ConflictingState` if the execution is already terminal.
    pub async fn record_step(
        &self,
        execution_id: &str,
        draft: StepDraft,
    ) -> Result<(), TraceError> {
        if draft.step_name.trim().is_empty() {
            return Err(TraceError::BadInput(
                "step name must be non-empty".to_string(),
            ));
        }
        let input = draft.input.transpose()?;
        let output = draft.output.transpose()?;
        let metadata = draft.metadata.transpose()?;

        let mut execution = self.store.get_execution(execution_id).await?;
        // Assigned once; a conflict retry keeps both.
        let mut step_id = self.ids.generate(STEP_PREFIX);
        let timestamp = self.clock.now();
        let mut id_attempts = 1;

        loop {
            if execution.status.is_terminal() {
                return Err(TraceError::ConflictingState {
                    execution_id: execution_id.to_string(),
                    status: execution.status.to_string(),
                });
            }
            let expected_version = execution.version;
            let mut attempt = execution.clone();
            attempt.steps.push(StepRecord {
                step_id: step_id.clone(),
                step_name: draft.step_name.clone(),
                timestamp,
                input: input.clone(),
                output: output.clone(),
                reasoning: draft.reasoning.clone(),
                metadata: metadata.clone(),
                execution_id: execution_id.to_string(),
                created_at: timestamp,
            });
            match self.store.update_execution(attempt, expected_version).await {
                Ok(_) => {
                    tracing::debug!(
                        execution_id = %execution_id,
                        step_name = %draft.step_name,
                        "recorded step"
                    );
                    return Ok(());
                }
                Err(StorageError::ConcurrentConflict { .. }) => {
                    execution = self.store.get_execution(execution_id).await?;
                }
                Err(StorageError::DuplicateId { .. }) => {
                    if id_attempts >= MAX_ID_ATTEMPTS {
                        return Err(TraceError::Conflict(
                            "could not allocate a unique step id".to_string(),
                        ));
                    }
                    id_attempts += 1;
                    step_id = self.ids.generate(STEP_PREFIX);
                    execution = self.store.get_execution(execution_id).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Close an execution as completed.
    pub async fn end_execution(&self, execution_id: &str) -> Result<(), TraceError> {
        let duration_ms = self.finish(execution_id, ExecutionStatus::Completed).await?;
        tracing::info!(
            execution_id = %execution_id,
            duration_ms,
            "completed execution"
        );
        Ok(())
    }

    /// Close an execution as failed with the given reason. The composed
    /// `FAILED:<reason>` status is truncated to the status field bound.
    pub async fn fail_execution(&self, execution_id: &str, reason: &str) -> Result<(), TraceError> {
        self.finish(execution_id, ExecutionStatus::failed(reason))
            .await?;
        tracing::error!(
            execution_id = %execution_id,
            reason = %reason,
            "failed execution"
        );
        Ok(())
    }

    /// Transition an in-progress execution to a terminal status, setting
    /// `end_time` exactly once. Conflict losers re-read and retry; the
    /// terminal check runs again on every retry, so a double close always
    /// surfaces as `ConflictingState`.
    async fn finish(
        &self,
        execution_id: &str,
        status: ExecutionStatus,
    ) -> Result<i64, TraceError> {
        let mut execution = self.store.get_execution(execution_id).await?;
        loop {
            if execution.status.is_terminal() {
                return Err(TraceError::ConflictingState {
                    execution_id: execution_id.to_string(),
                    status: execution.status.to_string(),
                });
            }
            let expected_version = execution.version;
            let mut attempt = execution.clone();
            attempt.end_time = Some(self.clock.now());
            attempt.status = status.clone();
            let duration_ms = attempt.duration_ms();
            match self.store.update_execution(attempt, expected_version).await {
                Ok(_) => return Ok(duration_ms),
                Err(StorageError::ConcurrentConflict { .. }) => {
                    execution = self.store.get_execution(execution_id).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use pipetrace_storage::MemoryStore;
    use time::macros::datetime;

    fn tracer_with_manual_clock() -> (Tracer<MemoryStore>, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(datetime!(2026-01-01 00:00:00 UTC)));
        let tracer = Tracer::new(store.clone(), clock.clone());
        (tracer, store, clock)
    }

    #[tokio::test]
    async fn start_execution_persists_in_progress_with_context() {
        let (tracer, store, _) = tracer_with_manual_clock();
        let id = tracer
            .start_execution(&serde_json::json!({"foo": 1}))
            .await
            .unwrap();
        assert!(id.starts_with("exec_"));
        let record = store.get_execution(&id).await.unwrap();
        assert_eq!(record.status, ExecutionStatus::InProgress);
        assert!(record.end_time.is_none());
        assert_eq!(record.context, serde_json::json!({"foo": 1}));
        assert!(record.steps.is_empty());
    }

    #[tokio::test]
    async fn unencodable_context_is_bad_input_and_persists_nothing() {
        let (tracer, store, _) = tracer_with_manual_clock();
        let bad = std::collections::BTreeMap::from([((1, 2), "v")]);
        let err = tracer.start_execution(&bad).await.unwrap_err();
        assert!(matches!(err, TraceError::BadInput(_)));
        assert_eq!(store.count_executions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn record_step_requires_a_step_name() {
        let (tracer, _, _) = tracer_with_manual_clock();
        let id = tracer.start_execution(&serde_json::json!({})).await.unwrap();
        let err = tracer.record_step(&id, StepDraft::new("  ")).await.unwrap_err();
        assert!(matches!(err, TraceError::BadInput(_)));
    }

    #[tokio::test]
    async fn record_step_on_missing_execution_is_not_found() {
        let (tracer, _, _) = tracer_with_manual_clock();
        let err = tracer
            .record_step("exec_deadbeef", StepDraft::new("s1"))
            .await
            .unwrap_err();
        assert!(matches!(err, TraceError::NotFound(_)));
    }

    #[tokio::test]
    async fn unencodable_step_field_is_bad_input() {
        let (tracer, store, _) = tracer_with_manual_clock();
        let id = tracer.start_execution(&serde_json::json!({})).await.unwrap();
        let bad = std::collections::BTreeMap::from([((1, 2), "v")]);
        let err = tracer
            .record_step(&id, StepDraft::new("s1").metadata(&bad))
            .await
            .unwrap_err();
        assert!(matches!(err, TraceError::BadInput(_)));
        assert!(store.get_execution(&id).await.unwrap().steps.is_empty());
    }

    #[tokio::test]
    async fn absent_step_fields_stay_null() {
        let (tracer, store, _) = tracer_with_manual_clock();
        let id = tracer.start_execution(&serde_json::json!({})).await.unwrap();
        tracer
            .record_step(&id, StepDraft::new("s1").input(&serde_json::json!({"a": 2})))
            .await
            .unwrap();
        let record = store.get_execution(&id).await.unwrap();
        let step = &record.steps[0];
        assert_eq!(step.input, Some(serde_json::json!({"a": 2})));
        assert!(step.output.is_none());
        assert!(step.metadata.is_none());
        assert!(step.reasoning.is_none());
    }

    #[tokio::test]
    async fn step_after_end_is_conflicting_state() {
        let (tracer, _, _) = tracer_with_manual_clock();
        let id = tracer.start_execution(&serde_json::json!({})).await.unwrap();
        tracer.end_execution(&id).await.unwrap();
        let err = tracer.record_step(&id, StepDraft::new("late")).await.unwrap_err();
        assert!(matches!(err, TraceError::ConflictingState { .. }));
    }

    #[tokio::test]
    async fn double_end_is_conflicting_state() {
        let (tracer, _, _) = tracer_with_manual_clock();
        let id = tracer.start_execution(&serde_json::json!({})).await.unwrap();
        tracer.end_execution(&id).await.unwrap();
        let err = tracer.end_execution(&id).await.unwrap_err();
        assert!(matches!(err, TraceError::ConflictingState { .. }));
        let err = tracer.fail_execution(&id, "boom").await.unwrap_err();
        assert!(matches!(err, TraceError::ConflictingState { .. }));
    }

    #[tokio::test]
    async fn end_sets_end_time_from_the_clock() {
        let (tracer, store, clock) = tracer_with_manual_clock();
        let id = tracer.start_execution(&serde_json::json!({})).await.unwrap();
        clock.advance(std::time::Duration::from_millis(750));
        tracer.end_execution(&id).await.unwrap();
        let record = store.get_execution(&id).await.unwrap();
        assert_eq!(record.status, ExecutionStatus::Completed);
        assert_eq!(record.duration_ms(), 750);
        assert_eq!(
            record.end_time.unwrap(),
            datetime!(2026-01-01 00:00:00.750 UTC)
        );
    }

    #[tokio::test]
    async fn fail_truncates_long_reasons() {
        let (tracer, store, _) = tracer_with_manual_clock();
        let id = tracer.start_execution(&serde_json::json!({})).await.unwrap();
        let reason = "x".repeat(1000);
        tracer.fail_execution(&id, &reason).await.unwrap();
        let record = store.get_execution(&id).await.unwrap();
        let wire = record.status.to_string();
        assert_eq!(wire.chars().count(), pipetrace_storage::STATUS_MAX_CHARS);
        assert!(wire.starts_with("FAILED:x"));
        assert!(record.end_time.is_some());
    }
}
