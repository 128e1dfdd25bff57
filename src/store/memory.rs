//! In-memory record store
//!
//! Keeps every table in process. Writes can be made to fail after a given
//! number of successes, which is how partial commits are exercised.

use crate::errors::{FinanceError, Result};
use crate::store::{upsert, Entity, Record, RecordStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<Entity, Vec<Record>>,
    /// (entity, id) of every accepted write, in order
    log: Vec<(Entity, String)>,
    /// Remaining writes before failures start; `None` never fails
    writes_before_failure: Option<usize>,
}

/// Ordered in-memory tables behind a shared handle
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents of one table
    pub fn seed(&self, entity: Entity, rows: Vec<Record>) {
        self.lock().rows.insert(entity, rows);
    }

    /// Accept `n` more writes, then reject every write after that
    pub fn fail_writes_after(&self, n: usize) {
        self.lock().writes_before_failure = Some(n);
    }

    /// Stop injecting write failures
    pub fn clear_failures(&self) {
        self.lock().writes_before_failure = None;
    }

    /// Accepted writes so far, oldest first
    pub fn write_log(&self) -> Vec<(Entity, String)> {
        self.lock().log.clone()
    }

    /// Current rows of a table
    pub fn rows(&self, entity: Entity) -> Vec<Record> {
        self.lock().rows.get(&entity).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // A poisoned lock only means a test panicked mid-write; the tables are still usable
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn read_all(&self, entity: Entity) -> Result<Vec<Record>> {
        Ok(self.rows(entity))
    }

    async fn write_record(&self, entity: Entity, id: &str, fields: Record) -> Result<()> {
        let mut tables = self.lock();

        if let Some(remaining) = tables.writes_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(FinanceError::StoreWrite {
                    entity: entity.to_string(),
                    id: id.to_string(),
                    reason: "injected failure".to_string(),
                });
            }
            *remaining -= 1;
        }

        upsert(tables.rows.entry(entity).or_default(), id, fields);
        tables.log.push((entity, id.to_string()));
        Ok(())
    }
}
