use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tripverse_core::{DataStore, Query, StoreError};
use tripverse_shared::models::rows;

use crate::fixtures;

/// Unique column per table, checked on insert.
const UNIQUE_KEYS: [(&str, &str); 2] = [(rows::USERS, "id"), (rows::NEWSLETTER_SUBSCRIBERS, "email")];

/// Table store held in memory. Only the columns in `UNIQUE_KEYS` are constrained.
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Seeded with demo profiles and the destination feed.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.seed(rows::USERS, fixtures::user_profiles());
        store.seed(rows::DESTINATIONS, fixtures::destination_rows());
        store
    }

    pub fn seed(&self, table: &str, seed_rows: Vec<Value>) {
        if let Ok(mut tables) = self.tables.write() {
            tables.entry(table.to_string()).or_default().extend(seed_rows);
        }
    }

    /// Snapshot of a table.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .read()
            .ok()
            .and_then(|tables| tables.get(table).cloned())
            .unwrap_or_default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Transport(format!("read of {} failed", table)));
        }
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::Transport("table lock poisoned".to_string()))?;
        let table_rows = tables.get(table).cloned().unwrap_or_default();
        Ok(query.apply(table_rows))
    }

    async fn insert(&self, table: &str, row: Value) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Remote {
                status: 500,
                message: format!("insert into {} failed", table),
            });
        }
        if !row.is_object() {
            return Err(StoreError::Decode {
                table: table.to_string(),
                message: "row must be an object".to_string(),
            });
        }

        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::Transport("table lock poisoned".to_string()))?;
        let table_rows = tables.entry(table.to_string()).or_default();

        for (unique_table, column) in UNIQUE_KEYS {
            if unique_table == table {
                if let Some(value) = row.get(column) {
                    if table_rows.iter().any(|existing| existing.get(column) == Some(value)) {
                        return Err(StoreError::Conflict(table.to_string()));
                    }
                }
            }
        }

        tracing::debug!("Inserted row into {}", table);
        table_rows.push(row);
        Ok(())
    }
}
