use std::sync::Arc;

use pipetrace_storage::{ExecutionRecord, ExecutionStore};

use crate::error::TraceError;

/// The consumer-facing query surface.
///
/// Reads and deletes whole trace aggregates; never mutates on a read
/// path. Returned executions have their steps in timestamp-ascending
/// order with insertion-order tie-break.
pub struct TraceReader<S> {
    store: Arc<S>,
}

impl<S> Clone for TraceReader<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ExecutionStore> TraceReader<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// All executions, `start_time` descending, each with its full step
    /// list.
    pub async fn list(&self) -> Result<Vec<ExecutionRecord>, TraceError> {
        let mut all = self.store.list_executions().await?;
        for execution in &mut all {
            execution.sort_steps();
        }
        Ok(all)
    }

    /// One execution with all its steps.
    pub async fn get(&self, execution_id: &str) -> Result<ExecutionRecord, TraceError> {
        let mut execution = self.store.get_execution(execution_id).await?;
        execution.sort_steps();
        Ok(execution)
    }

    /// Delete one execution, cascading to its steps.
    pub async fn delete(&self, execution_id: &str) -> Result<(), TraceError> {
        self.store.delete_execution(execution_id).await?;
        tracing::info!(execution_id = %execution_id, "deleted execution");
        Ok(())
    }

    /// Delete every execution. Idempotent.
    pub async fn delete_all(&self) -> Result<(), TraceError> {
        let count = self.store.count_executions().await?;
        self.store.delete_all_executions().await?;
        tracing::info!(count, "deleted all executions");
        Ok(())
    }
}
