use std::future::Future;
use std::sync::Arc;

use tokio::time::Instant;

use crate::config::Config;
use crate::error::ApiError;
use crate::store::{RecordStore, StoreResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Starts an invocation whose deadline is the configured request timeout from now
    pub fn invocation(&self) -> Invocation<'_> {
        Invocation {
            state: self,
            deadline: Instant::now() + self.config.request_timeout,
        }
    }
}

/// One request's view of the state, carrying its deadline
pub struct Invocation<'a> {
    pub state: &'a AppState,
    pub deadline: Instant,
}

impl Invocation<'_> {
    pub fn store(&self) -> &dyn RecordStore {
        self.state.store.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Awaits a store call, giving up once the deadline passes
    pub async fn call<T, F>(&self, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout_at(self.deadline, fut).await {
            Ok(result) => result.map_err(ApiError::from),
            Err(_) => Err(ApiError::DeadlineExceeded),
        }
    }
}
