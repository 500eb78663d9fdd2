/// All errors that can be returned by an ExecutionStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No execution with the given id exists.
    #[error("execution not found: {execution_id}")]
    NotFound { execution_id: String },

    /// An execution or step id is already taken elsewhere in the store.
    /// The caller is expected to retry with a freshly generated id.
    #[error("duplicate id: {id}")]
    DuplicateId { id: String },

    /// Optimistic concurrency conflict — another writer committed a newer
    /// version of the aggregate. The caller must re-read and retry.
    #[error("concurrent conflict on execution {execution_id}: expected version {expected_version}")]
    ConcurrentConflict {
        execution_id: String,
        expected_version: i64,
    },

    /// A backend-specific storage error (I/O, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
