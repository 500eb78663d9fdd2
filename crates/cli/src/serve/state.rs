//! Application state shared across request handlers.

use pipetrace_storage::MemoryStore;
use pipetrace_tracer::{TraceReader, Tracer};

/// Shared dependencies for the HTTP handlers: the producer-facing tracer
/// (used by the demo endpoint) and the consumer-facing reader. Both are
/// cheap clones over one shared store; handlers keep no other state.
pub(crate) struct AppState {
    pub(crate) tracer: Tracer<MemoryStore>,
    pub(crate) reader: TraceReader<MemoryStore>,
}
