//! Test doubles and fixtures shared by the handler tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::config::Config;
use crate::proxy::{ProxyRequest, RequestContext};
use crate::state::AppState;
use crate::store::{MemoryStore, Record, RecordStore, ScanPage, StoreError, StoreResult};

pub fn record(value: JsonValue) -> Record {
    value.as_object().cloned().expect("fixture must be a JSON object")
}

pub fn memory_state() -> AppState {
    state_with(Arc::new(MemoryStore::new()))
}

pub fn state_with(store: Arc<dyn RecordStore>) -> AppState {
    AppState::new(store, Config::in_memory())
}

/// A proxy event for `method` on the resource shape `resource`
pub fn event(method: &str, resource: &str) -> ProxyRequest {
    ProxyRequest {
        http_method: method.to_string(),
        request_context: RequestContext {
            resource_path: Some(resource.to_string()),
            request_id: None,
        },
        ..Default::default()
    }
}

/// Store whose every call fails
pub struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn get(&self, _id: &str) -> StoreResult<Option<Record>> {
        Err(StoreError::ConnectionFailed("injected failure".to_string()))
    }

    async fn put(&self, _id: &str, _record: &Record) -> StoreResult<()> {
        Err(StoreError::ConnectionFailed("injected failure".to_string()))
    }

    async fn update_attribute(
        &self,
        _id: &str,
        _identifier: &JsonValue,
        _attribute: &str,
        _value: &JsonValue,
    ) -> StoreResult<Record> {
        Err(StoreError::ConnectionFailed("injected failure".to_string()))
    }

    async fn delete(&self, _id: &str) -> StoreResult<Option<Record>> {
        Err(StoreError::ConnectionFailed("injected failure".to_string()))
    }

    async fn scan(&self, _start_after: Option<&str>, _limit: usize) -> StoreResult<ScanPage> {
        Err(StoreError::QueryFailed("injected failure".to_string()))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Err(StoreError::ConnectionFailed("injected failure".to_string()))
    }
}

/// Store whose calls never complete
pub struct StalledStore;

#[async_trait]
impl RecordStore for StalledStore {
    async fn get(&self, _id: &str) -> StoreResult<Option<Record>> {
        std::future::pending().await
    }

    async fn put(&self, _id: &str, _record: &Record) -> StoreResult<()> {
        std::future::pending().await
    }

    async fn update_attribute(
        &self,
        _id: &str,
        _identifier: &JsonValue,
        _attribute: &str,
        _value: &JsonValue,
    ) -> StoreResult<Record> {
        std::future::pending().await
    }

    async fn delete(&self, _id: &str) -> StoreResult<Option<Record>> {
        std::future::pending().await
    }

    async fn scan(&self, _start_after: Option<&str>, _limit: usize) -> StoreResult<ScanPage> {
        std::future::pending().await
    }

    async fn health_check(&self) -> StoreResult<()> {
        std::future::pending().await
    }
}

/// Store that replays scripted scan pages and records the tokens it was given
#[derive(Clone, Default)]
pub struct PagedStore {
    pages: Arc<Mutex<VecDeque<ScanPage>>>,
    tokens: Arc<Mutex<Vec<Option<String>>>>,
}

impl PagedStore {
    pub fn new(pages: Vec<ScanPage>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(pages.into())),
            tokens: Arc::default(),
        }
    }

    pub fn tokens_seen(&self) -> Vec<Option<String>> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for PagedStore {
    async fn get(&self, _id: &str) -> StoreResult<Option<Record>> {
        Ok(None)
    }

    async fn put(&self, _id: &str, _record: &Record) -> StoreResult<()> {
        Ok(())
    }

    async fn update_attribute(
        &self,
        _id: &str,
        _identifier: &JsonValue,
        attribute: &str,
        value: &JsonValue,
    ) -> StoreResult<Record> {
        let mut updated = Record::new();
        updated.insert(attribute.to_string(), value.clone());
        Ok(updated)
    }

    async fn delete(&self, _id: &str) -> StoreResult<Option<Record>> {
        Ok(None)
    }

    async fn scan(&self, start_after: Option<&str>, _limit: usize) -> StoreResult<ScanPage> {
        self.tokens
            .lock()
            .unwrap()
            .push(start_after.map(str::to_string));
        Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
