//! Record storage.
//!
//! Handlers only talk to the [`RecordStore`] trait. The concrete backend is
//! picked from configuration at startup and shared through `AppState`:
//!
//! - [`SpannerStore`]: Cloud Spanner (production, or the local emulator)
//! - [`MemoryStore`]: in-process ordered map for local runs and tests

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

pub mod memory;
pub mod spanner;

pub use memory::MemoryStore;
pub use spanner::SpannerStore;

/// Name of the identifier field every record carries.
pub const ID_FIELD: &str = "id";

/// A schema-less record. Always contains [`ID_FIELD`] once stored.
pub type Record = Map<String, JsonValue>;

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One page of a scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPage {
    pub items: Vec<Record>,
    /// Continuation token; `None` when the scan is complete.
    pub next: Option<String>,
}

/// Single-table key-value store addressed by the record identifier.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup. `Ok(None)` when no record has this identifier.
    async fn get(&self, id: &str) -> StoreResult<Option<Record>>;

    /// Unconditional write; replaces any existing record with the same identifier.
    async fn put(&self, id: &str, record: &Record) -> StoreResult<()>;

    /// Sets one top-level attribute, creating the record if it does not exist.
    ///
    /// A created record holds `identifier` (the request's `id` value, not the
    /// derived key) and the attribute. Returns the updated attributes as they
    /// are after the write.
    async fn update_attribute(
        &self,
        id: &str,
        identifier: &JsonValue,
        attribute: &str,
        value: &JsonValue,
    ) -> StoreResult<Record>;

    /// Removes a record and returns its last image, if there was one.
    async fn delete(&self, id: &str) -> StoreResult<Option<Record>>;

    /// Returns up to `limit` records whose identifier sorts after `start_after`.
    async fn scan(&self, start_after: Option<&str>, limit: usize) -> StoreResult<ScanPage>;

    /// Verifies the backend is reachable.
    async fn health_check(&self) -> StoreResult<()>;
}

/// A record holding only the identifier, used when an update targets a missing record.
pub fn new_record(identifier: &JsonValue) -> Record {
    let mut record = Record::new();
    record.insert(ID_FIELD.to_string(), identifier.clone());
    record
}

/// Derives the store key from a record's identifier value.
///
/// Strings are used as-is and numbers by their JSON text. Anything else
/// (including an empty string) is not a usable key.
pub fn key_of(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
