use std::collections::BTreeSet;
use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};

/// Which `RecordStore` implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Spanner,
    Memory,
}

/// Spanner connection settings, required when the backend is `spanner`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannerConfig {
    pub emulator_host: Option<String>,
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl SpannerConfig {
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub spanner: Option<SpannerConfig>,
    pub table_name: String,
    pub scan_page_size: usize,
    pub scan_max_items: usize,
    pub request_timeout: Duration,
    /// Attribute names a PATCH may set. `None` allows any name except the identifier.
    pub updatable_fields: Option<BTreeSet<String>>,
    pub service_port: u16,
    pub service_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "spanner".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "spanner" => StoreBackend::Spanner,
            "memory" => StoreBackend::Memory,
            other => bail!("STORE_BACKEND must be 'spanner' or 'memory', got '{}'", other),
        };

        let spanner = match store_backend {
            StoreBackend::Spanner => Some(SpannerConfig {
                emulator_host: env::var("SPANNER_EMULATOR_HOST").ok(),
                project: env::var("SPANNER_PROJECT")
                    .context("SPANNER_PROJECT environment variable is required")?,
                instance: env::var("SPANNER_INSTANCE")
                    .context("SPANNER_INSTANCE environment variable is required")?,
                database: env::var("SPANNER_DATABASE")
                    .context("SPANNER_DATABASE environment variable is required")?,
            }),
            StoreBackend::Memory => None,
        };

        let table_name = env::var("CSR_TABLE").unwrap_or_else(|_| "CSRAPI".to_string());
        if !is_identifier(&table_name) {
            bail!(
                "CSR_TABLE must be a plain identifier (letters, digits, underscore), got '{}'",
                table_name
            );
        }

        let scan_page_size = positive_var("SCAN_PAGE_SIZE", 100)?;
        let scan_max_items = positive_var("SCAN_MAX_ITEMS", 10_000)?;
        let request_timeout =
            Duration::from_millis(positive_var("REQUEST_TIMEOUT_MS", 25_000)? as u64);

        let updatable_fields = env::var("UPDATABLE_FIELDS").ok().map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
        });

        let service_port = env::var("SERVICE_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = env::var("SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        Ok(Config {
            store_backend,
            spanner,
            table_name,
            scan_page_size,
            scan_max_items,
            request_timeout,
            updatable_fields,
            service_port,
            service_host,
        })
    }

    /// Configuration for an in-memory service
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Config {
            store_backend: StoreBackend::Memory,
            spanner: None,
            table_name: "CSRAPI".to_string(),
            scan_page_size: 100,
            scan_max_items: 10_000,
            request_timeout: Duration::from_secs(25),
            updatable_fields: None,
            service_port: 3000,
            service_host: "0.0.0.0".to_string(),
        }
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Store backend: {:?}", self.store_backend);
        if let Some(spanner) = &self.spanner {
            tracing::info!(
                "  Spanner emulator: {}",
                spanner
                    .emulator_host
                    .as_deref()
                    .unwrap_or("disabled (using production)")
            );
            tracing::info!("  Spanner database: {}", spanner.database_path());
        }
        tracing::info!("  Table: {}", self.table_name);
        tracing::info!(
            "  Scan page size: {}, max items: {}",
            self.scan_page_size,
            self.scan_max_items
        );
        tracing::info!("  Request timeout: {:?}", self.request_timeout);
        match &self.updatable_fields {
            Some(fields) => tracing::info!("  Updatable fields: {:?}", fields),
            None => tracing::info!("  Updatable fields: any"),
        }
        tracing::info!("  Service listening on: {}:{}", self.service_host, self.service_port);
    }
}

fn positive_var(name: &str, default: usize) -> Result<usize> {
    let value = match env::var(name) {
        Ok(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("{} must be a positive integer", name))?,
        Err(_) => default,
    };
    if value == 0 {
        bail!("{} must be a positive integer", name);
    }
    Ok(value)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
