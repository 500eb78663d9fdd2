use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::ExecutionRecord;
use crate::traits::ExecutionStore;

/// In-memory `ExecutionStore` backend.
///
/// Aggregates live in a single mutex-guarded map, so every trait call is
/// one critical section and therefore atomic. The lock is never held
/// across an await point. A store-wide step-id index enforces global step
/// id uniqueness and detects collisions on append.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    executions: HashMap<String, ExecutionRecord>,
    /// step_id -> owning execution_id.
    step_ids: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StorageError> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Backend("memory store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl ExecutionStore for MemoryStore {
    async fn insert_execution(&self, record: ExecutionRecord) -> Result<(), StorageError> {
        let mut inner = self.lock()?;
        if inner.executions.contains_key(&record.execution_id) {
            return Err(StorageError::DuplicateId {
                id: record.execution_id,
            });
        }
        for step in &record.steps {
            if inner.step_ids.contains_key(&step.step_id) {
                return Err(StorageError::DuplicateId {
                    id: step.step_id.clone(),
                });
            }
        }
        for step in &record.steps {
            inner
                .step_ids
                .insert(step.step_id.clone(), record.execution_id.clone());
        }
        inner.executions.insert(record.execution_id.clone(), record);
        Ok(())
    }

    async fn update_execution(
        &self,
        mut record: ExecutionRecord,
        expected_version: i64,
    ) -> Result<i64, StorageError> {
        let mut inner = self.lock()?;
        let stored = inner.executions.get(&record.execution_id).ok_or_else(|| {
            StorageError::NotFound {
                execution_id: record.execution_id.clone(),
            }
        })?;
        if stored.version != expected_version {
            return Err(StorageError::ConcurrentConflict {
                execution_id: record.execution_id.clone(),
                expected_version,
            });
        }
        // Appended steps must not collide with ids owned elsewhere.
        for step in &record.steps {
            if let Some(owner) = inner.step_ids.get(&step.step_id) {
                if owner != &record.execution_id {
                    return Err(StorageError::DuplicateId {
                        id: step.step_id.clone(),
                    });
                }
            }
        }
        // Orphan removal: steps dropped from the aggregate leave the index.
        let previous: Vec<String> = inner.executions[&record.execution_id]
            .steps
            .iter()
            .map(|s| s.step_id.clone())
            .collect();
        for step_id in previous {
            if !record.steps.iter().any(|s| s.step_id == step_id) {
                inner.step_ids.remove(&step_id);
            }
        }
        for step in &record.steps {
            inner
                .step_ids
                .insert(step.step_id.clone(), record.execution_id.clone());
        }
        record.version = expected_version + 1;
        let new_version = record.version;
        inner.executions.insert(record.execution_id.clone(), record);
        Ok(new_version)
    }

    async fn get_execution(&self, execution_id: &str) -> Result<ExecutionRecord, StorageError> {
        let inner = self.lock()?;
        inner
            .executions
            .get(execution_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                execution_id: execution_id.to_string(),
            })
    }

    async fn list_executions(&self) -> Result<Vec<ExecutionRecord>, StorageError> {
        let inner = self.lock()?;
        let mut all: Vec<ExecutionRecord> = inner.executions.values().cloned().collect();
        all.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(all)
    }

    async fn execution_exists(&self, execution_id: &str) -> Result<bool, StorageError> {
        let inner = self.lock()?;
        Ok(inner.executions.contains_key(execution_id))
    }

    async fn count_executions(&self) -> Result<u64, StorageError> {
        let inner = self.lock()?;
        Ok(inner.executions.len() as u64)
    }

    async fn delete_execution(&self, execution_id: &str) -> Result<(), StorageError> {
        let mut inner = self.lock()?;
        let removed = inner.executions.remove(execution_id).ok_or_else(|| {
            StorageError::NotFound {
                execution_id: execution_id.to_string(),
            }
        })?;
        for step in &removed.steps {
            inner.step_ids.remove(&step.step_id);
        }
        Ok(())
    }

    async fn delete_all_executions(&self) -> Result<(), StorageError> {
        let mut inner = self.lock()?;
        inner.executions.clear();
        inner.step_ids.clear();
        Ok(())
    }
}
