//! In-memory store implementation.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;

use super::{Record, RecordStore, ScanPage, StoreResult, new_record};

/// In-memory storage backend.
///
/// Records are kept in a `BTreeMap` so scans come back in identifier order,
/// like the Spanner backend. Data is lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<BTreeMap<String, Record>>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, id: &str) -> StoreResult<Option<Record>> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    async fn put(&self, id: &str, record: &Record) -> StoreResult<()> {
        let mut records = self.records.write().await;
        records.insert(id.to_string(), record.clone());
        Ok(())
    }

    async fn update_attribute(
        &self,
        id: &str,
        identifier: &JsonValue,
        attribute: &str,
        value: &JsonValue,
    ) -> StoreResult<Record> {
        let mut records = self.records.write().await;
        let record = records
            .entry(id.to_string())
            .or_insert_with(|| new_record(identifier));
        record.insert(attribute.to_string(), value.clone());

        let mut updated = Record::new();
        updated.insert(attribute.to_string(), value.clone());
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StoreResult<Option<Record>> {
        let mut records = self.records.write().await;
        Ok(records.remove(id))
    }

    async fn scan(&self, start_after: Option<&str>, limit: usize) -> StoreResult<ScanPage> {
        let records = self.records.read().await;
        let lower = match start_after {
            Some(key) => Bound::Excluded(key.to_string()),
            None => Bound::Unbounded,
        };

        let mut page = records.range((lower, Bound::Unbounded));
        let items: Vec<(String, Record)> = page
            .by_ref()
            .take(limit)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let more = page.next().is_some();

        let next = if more {
            items.last().map(|(k, _)| k.clone())
        } else {
            None
        };

        Ok(ScanPage {
            items: items.into_iter().map(|(_, v)| v).collect(),
            next,
        })
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
