use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::ExecutionRecord;

/// The storage trait for trace backends.
///
/// An `ExecutionStore` persists execution aggregates keyed by
/// `execution_id`. The aggregate — the execution plus its owned steps — is
/// the unit of persistence: each `insert_execution` / `update_execution`
/// call is atomic, so a reader observes either the whole write or none of
/// it.
///
/// ## OCC Conflict Detection
///
/// Every aggregate carries a `version`. `update_execution` performs an
/// optimistic concurrency check against the caller's `expected_version`;
/// if the stored version has moved, the method returns
/// `Err(StorageError::ConcurrentConflict { .. })` and the caller must
/// re-read the aggregate and retry. This serializes concurrent step
/// appends to the same execution without any lock held across I/O.
///
/// ## Cascade Semantics
///
/// On update, steps newly present in the aggregate are inserted and steps
/// removed from its list are deleted (orphan removal). Deleting an
/// execution deletes all of its steps. Execution and step ids are unique
/// store-wide; a collision yields `StorageError::DuplicateId` and the
/// caller retries with a fresh id.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be shared through
/// axum application state and across async task boundaries.
#[async_trait]
pub trait ExecutionStore: Send + Sync + 'static {
    /// Insert a new execution aggregate at version 0.
    ///
    /// Fails with `DuplicateId` if the execution id or any of its step ids
    /// is already taken.
    async fn insert_execution(&self, record: ExecutionRecord) -> Result<(), StorageError>;

    /// Replace an execution aggregate, conditional on `expected_version`.
    ///
    /// Returns the new version on success. Fails with `NotFound` if the
    /// execution does not exist, `ConcurrentConflict` if the stored
    /// version differs from `expected_version`, and `DuplicateId` if a
    /// newly appended step reuses an id taken elsewhere in the store.
    async fn update_execution(
        &self,
        record: ExecutionRecord,
        expected_version: i64,
    ) -> Result<i64, StorageError>;

    /// Fetch one aggregate by execution id.
    async fn get_execution(&self, execution_id: &str) -> Result<ExecutionRecord, StorageError>;

    /// All aggregates, ordered by `start_time` descending.
    async fn list_executions(&self) -> Result<Vec<ExecutionRecord>, StorageError>;

    /// Whether an execution with the given id exists.
    async fn execution_exists(&self, execution_id: &str) -> Result<bool, StorageError>;

    /// Number of stored executions.
    async fn count_executions(&self) -> Result<u64, StorageError>;

    /// Delete one execution and, cascading, all of its steps.
    ///
    /// Fails with `NotFound` if the execution does not exist.
    async fn delete_execution(&self, execution_id: &str) -> Result<(), StorageError>;

    /// Delete every execution and step. Idempotent.
    async fn delete_all_executions(&self) -> Result<(), StorageError>;
}
