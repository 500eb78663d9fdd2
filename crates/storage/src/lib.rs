mod error;
mod memory;
mod record;
mod traits;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use record::{ExecutionRecord, ExecutionStatus, StepRecord, STATUS_MAX_CHARS};
pub use traits::ExecutionStore;
