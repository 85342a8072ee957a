mod api_doc;
mod app;
mod config;
mod dispatch;
mod error;
mod handlers;
mod models;
mod proxy;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing_subscriber::EnvFilter;

use app::create_app;
use config::{Config, StoreBackend};
use state::AppState;
use store::{MemoryStore, RecordStore, SpannerStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("csr-record-proxy starting");

    let config = Config::from_env()?;
    config.log_startup();

    let store: Arc<dyn RecordStore> = match (&config.store_backend, &config.spanner) {
        (StoreBackend::Spanner, Some(spanner)) => {
            Arc::new(SpannerStore::from_config(spanner, &config.table_name).await?)
        }
        (StoreBackend::Spanner, None) => {
            anyhow::bail!("Spanner backend selected without Spanner configuration")
        }
        (StoreBackend::Memory, _) => {
            tracing::warn!("Using in-memory store; records are lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let addr = format!("{}:{}", config.service_host, config.service_port);
    let app = create_app(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
