use pipetrace_storage::StorageError;

/// Errors surfaced by the tracer and reader APIs.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The requested execution id does not exist.
    #[error("execution not found: {0}")]
    NotFound(String),

    /// A producer-supplied value could not be encoded to JSON, or a
    /// required field (step name) was empty.
    #[error("bad input: {0}")]
    BadInput(String),

    /// A mutation was attempted on an execution that is already terminal
    /// (double end, or a step recorded after end). Programmer error.
    #[error("execution {execution_id} is already terminal ({status})")]
    ConflictingState {
        execution_id: String,
        status: String,
    },

    /// An id collision or write/write conflict that survived internal
    /// retries.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller cancelled the operation before it committed.
    #[error("operation cancelled")]
    Cancelled,

    /// Any store or encoder failure not classified above.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for TraceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { execution_id } => TraceError::NotFound(execution_id),
            StorageError::DuplicateId { id } => {
                TraceError::Conflict(format!("id already taken: {id}"))
            }
            StorageError::ConcurrentConflict { execution_id, .. } => {
                TraceError::Conflict(format!("concurrent write on execution {execution_id}"))
            }
            StorageError::Backend(msg) => TraceError::Internal(msg),
        }
    }
}
