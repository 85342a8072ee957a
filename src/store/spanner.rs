use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use gcloud_gax::grpc::{Code, Status};
use gcloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseDdlRequest, GetDatabaseRequest, UpdateDatabaseDdlRequest,
};
use gcloud_googleapis::spanner::admin::instance::v1::{
    CreateInstanceRequest, GetInstanceRequest, Instance,
};
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::client::{Client, ClientConfig, Error as SpannerError};
use gcloud_spanner::key::Key;
use gcloud_spanner::mutation::{delete, insert_or_update};
use gcloud_spanner::row::Row;
use gcloud_spanner::statement::Statement;
use gcloud_spanner::value::CommitTimestamp;
use serde_json::Value as JsonValue;

use super::{Record, RecordStore, ScanPage, StoreError, StoreResult, new_record};
use crate::config::SpannerConfig;

const COLUMNS: [&str; 3] = ["id", "data", "updated_at"];

/// Spanner-backed record store
///
/// Each record lives in one row: the identifier as the primary key and the
/// whole record as a JSON column. Cloning shares the underlying session pool.
#[derive(Clone)]
pub struct SpannerStore {
    inner: Arc<Client>,
    table: String,
}

impl SpannerStore {
    /// Create a new store from configuration
    ///
    /// The gcloud-spanner library automatically detects the
    /// SPANNER_EMULATOR_HOST environment variable and connects to
    /// the emulator when set, or production Spanner otherwise.
    ///
    /// The instance, database, and table are created first if they don't exist.
    pub async fn from_config(config: &SpannerConfig, table: &str) -> Result<Self> {
        auto_provision(config, table).await?;

        let database_path = config.database_path();

        match &config.emulator_host {
            Some(host) => tracing::info!("Connecting to Spanner emulator at: {}", host),
            None => tracing::info!("Connecting to production Spanner"),
        }

        // ClientConfig::default() automatically uses SPANNER_EMULATOR_HOST if set
        let client = Client::new(&database_path, ClientConfig::default())
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!(
            "Successfully connected to Spanner database: {}",
            database_path
        );

        Ok(Self {
            inner: Arc::new(client),
            table: table.to_string(),
        })
    }

    async fn read(&self, id: &str) -> Result<Option<Record>> {
        let mut statement = Statement::new(&select_sql(&self.table));
        statement.add_param("id", &id.to_string());

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to query record from Spanner")?;

        if let Some(row) = result_set.next().await? {
            let record = decode_row(&row)?;
            tracing::debug!("Read record with id: {}", id);
            Ok(Some(record))
        } else {
            tracing::debug!("Record not found with id: {}", id);
            Ok(None)
        }
    }

    async fn upsert(&self, id: &str, record: &Record) -> Result<()> {
        let data = serde_json::to_string(record).context("Failed to serialize record")?;

        let mutation = insert_or_update(
            &self.table,
            &COLUMNS,
            &[&id.to_string(), &data, &CommitTimestamp::new()],
        );

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to upsert record to Spanner")?;

        tracing::debug!("Upserted record with id: {}", id);
        Ok(())
    }

    /// Read-modify-write of one JSON attribute inside a read-write transaction.
    ///
    /// The attribute name only ever becomes a JSON object key, never query text.
    async fn set_attribute(
        &self,
        id: &str,
        identifier: &JsonValue,
        attribute: &str,
        value: &JsonValue,
    ) -> Result<Record> {
        let select = select_sql(&self.table);

        let (_, updated) = self
            .inner
            .read_write_transaction(|tx| {
                let id = id.to_string();
                let identifier = identifier.clone();
                let attribute = attribute.to_string();
                let value = value.clone();
                let select = select.clone();
                let table = self.table.clone();
                Box::pin(async move {
                    let mut statement = Statement::new(&select);
                    statement.add_param("id", &id);
                    let existing = {
                        let mut rows = tx.query(statement).await?;
                        rows.next().await?
                    };

                    let mut record = match existing {
                        Some(row) => decode_row(&row).map_err(internal)?,
                        None => new_record(&identifier),
                    };
                    record.insert(attribute.clone(), value.clone());

                    let data = serde_json::to_string(&record).map_err(internal)?;
                    tx.buffer_write(vec![insert_or_update(
                        &table,
                        &COLUMNS,
                        &[&id, &data, &CommitTimestamp::new()],
                    )]);

                    let mut updated = Record::new();
                    updated.insert(attribute, value);
                    Ok::<Record, SpannerError>(updated)
                })
            })
            .await
            .context("Failed to update record attribute in Spanner")?;

        tracing::debug!("Updated attribute on record with id: {}", id);
        Ok(updated)
    }

    async fn remove(&self, id: &str) -> Result<Option<Record>> {
        let select = select_sql(&self.table);

        let (_, old) = self
            .inner
            .read_write_transaction(|tx| {
                let id = id.to_string();
                let select = select.clone();
                let table = self.table.clone();
                Box::pin(async move {
                    let mut statement = Statement::new(&select);
                    statement.add_param("id", &id);
                    let existing = {
                        let mut rows = tx.query(statement).await?;
                        rows.next().await?
                    };

                    let old = match existing {
                        Some(row) => Some(decode_row(&row).map_err(internal)?),
                        None => None,
                    };
                    tx.buffer_write(vec![delete(&table, Key::new(&id))]);
                    Ok::<Option<Record>, SpannerError>(old)
                })
            })
            .await
            .context("Failed to delete record from Spanner")?;

        tracing::debug!("Deleted record with id: {} (existed: {})", id, old.is_some());
        Ok(old)
    }

    async fn scan_page(&self, start_after: Option<&str>, limit: usize) -> Result<ScanPage> {
        let mut statement = Statement::new(&scan_sql(&self.table, start_after.is_some()));
        if let Some(after) = start_after {
            statement.add_param("after", &after.to_string());
        }
        // One extra row tells us whether another page exists
        statement.add_param("limit", &(limit as i64 + 1));

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create read transaction for scan")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to execute scan query")?;

        let mut keys = Vec::new();
        let mut items = Vec::new();
        while let Some(row) = result_set.next().await? {
            let key: String = row.column_by_name("id")?;
            keys.push(key);
            items.push(decode_row(&row)?);
        }

        let next = if items.len() > limit {
            items.truncate(limit);
            keys.get(limit - 1).cloned()
        } else {
            None
        };

        tracing::debug!(
            "Scanned {} records (after: {:?}, more: {})",
            items.len(),
            start_after,
            next.is_some()
        );

        Ok(ScanPage { items, next })
    }

    /// Perform a health check by executing a simple query
    async fn ping(&self) -> Result<()> {
        let statement = Statement::new("SELECT 1");

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create health check transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to execute health check query")?;

        if result_set.next().await?.is_some() {
            tracing::debug!("Health check query succeeded");
            Ok(())
        } else {
            Err(anyhow::anyhow!("Health check query returned no results"))
        }
    }
}

#[async_trait]
impl RecordStore for SpannerStore {
    async fn get(&self, id: &str) -> StoreResult<Option<Record>> {
        self.read(id).await.map_err(store_error)
    }

    async fn put(&self, id: &str, record: &Record) -> StoreResult<()> {
        self.upsert(id, record).await.map_err(store_error)
    }

    async fn update_attribute(
        &self,
        id: &str,
        identifier: &JsonValue,
        attribute: &str,
        value: &JsonValue,
    ) -> StoreResult<Record> {
        self.set_attribute(id, identifier, attribute, value)
            .await
            .map_err(store_error)
    }

    async fn delete(&self, id: &str) -> StoreResult<Option<Record>> {
        self.remove(id).await.map_err(store_error)
    }

    async fn scan(&self, start_after: Option<&str>, limit: usize) -> StoreResult<ScanPage> {
        self.scan_page(start_after, limit).await.map_err(store_error)
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.ping()
            .await
            .map_err(|e| StoreError::ConnectionFailed(format!("{:#}", e)))
    }
}

fn select_sql(table: &str) -> String {
    format!("SELECT id, data FROM {} WHERE id = @id", table)
}

fn scan_sql(table: &str, after: bool) -> String {
    if after {
        format!(
            "SELECT id, data FROM {} WHERE id > @after ORDER BY id LIMIT @limit",
            table
        )
    } else {
        format!("SELECT id, data FROM {} ORDER BY id LIMIT @limit", table)
    }
}

fn decode_row(row: &Row) -> Result<Record> {
    let data: String = row.column_by_name("data")?;
    decode_record(&data)
}

fn decode_record(data: &str) -> Result<Record> {
    match serde_json::from_str::<JsonValue>(data).context("Failed to deserialize record JSON")? {
        JsonValue::Object(record) => Ok(record),
        other => Err(anyhow::anyhow!(
            "Stored record is not a JSON object: {}",
            other
        )),
    }
}

fn internal(err: impl std::fmt::Display) -> Status {
    Status::new(Code::Internal, err.to_string())
}

fn store_error(err: anyhow::Error) -> StoreError {
    if err.downcast_ref::<serde_json::Error>().is_some() {
        StoreError::Serialization(format!("{:#}", err))
    } else {
        StoreError::QueryFailed(format!("{:#}", err))
    }
}

fn table_ddl(table: &str) -> String {
    format!(
        r#"
CREATE TABLE {} (
    id STRING(MAX) NOT NULL,
    data JSON NOT NULL,
    updated_at TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp=true),
) PRIMARY KEY (id)
"#,
        table
    )
    .trim()
    .to_string()
}

/// Automatically provision Spanner instance, database, and table
///
/// This function checks if the configured resources exist and creates them if needed.
/// It's designed to enable zero-setup local development with the emulator.
async fn auto_provision(config: &SpannerConfig, table: &str) -> Result<()> {
    tracing::info!("Starting auto-provisioning checks...");

    let admin_client = AdminClient::new(AdminClientConfig::default())
        .await
        .context("Failed to create Spanner admin client")?;

    let project_path = format!("projects/{}", config.project);
    let instance_path = format!("{}/instances/{}", project_path, config.instance);
    let database_path = config.database_path();

    ensure_instance_exists(&admin_client, config, &project_path, &instance_path).await?;
    ensure_database_exists(&admin_client, &instance_path, &database_path).await?;
    ensure_table_exists(&admin_client, &database_path, table).await?;

    tracing::info!("Auto-provisioning complete");
    Ok(())
}

async fn ensure_instance_exists(
    admin_client: &AdminClient,
    config: &SpannerConfig,
    project_path: &str,
    instance_path: &str,
) -> Result<()> {
    let get_request = GetInstanceRequest {
        name: instance_path.to_string(),
        field_mask: None,
    };

    match admin_client.instance().get_instance(get_request, None).await {
        Ok(_) => {
            tracing::info!("Instance already exists: {}", instance_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Instance not found, creating: {}", instance_path);

            let instance_config = if config.emulator_host.is_some() {
                format!("{}/instanceConfigs/emulator-config", project_path)
            } else {
                format!("{}/instanceConfigs/regional-us-central1", project_path)
            };

            let create_request = CreateInstanceRequest {
                parent: project_path.to_string(),
                instance_id: config.instance.clone(),
                instance: Some(Instance {
                    name: instance_path.to_string(),
                    config: instance_config,
                    display_name: format!("{} instance", config.instance),
                    node_count: 1,
                    ..Default::default()
                }),
            };

            let mut operation = admin_client
                .instance()
                .create_instance(create_request, None)
                .await
                .context("Failed to start instance creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create instance")?;

            tracing::info!("Instance created successfully: {}", instance_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check instance existence: {}",
            e.message()
        )),
    }
}

async fn ensure_database_exists(
    admin_client: &AdminClient,
    instance_path: &str,
    database_path: &str,
) -> Result<()> {
    let get_request = GetDatabaseRequest {
        name: database_path.to_string(),
    };

    match admin_client
        .database()
        .get_database(get_request, None)
        .await
    {
        Ok(_) => {
            tracing::info!("Database already exists: {}", database_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Database not found, creating: {}", database_path);

            let database_id = database_path
                .split('/')
                .next_back()
                .context("Invalid database path")?;

            let create_request = CreateDatabaseRequest {
                parent: instance_path.to_string(),
                create_statement: format!("CREATE DATABASE `{}`", database_id),
                extra_statements: vec![],
                encryption_config: None,
                database_dialect: 1, // Google Standard SQL
                proto_descriptors: vec![],
            };

            let mut operation = admin_client
                .database()
                .create_database(create_request, None)
                .await
                .context("Failed to start database creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create database")?;

            tracing::info!("Database created successfully: {}", database_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check database existence: {}",
            e.message()
        )),
    }
}

async fn ensure_table_exists(
    admin_client: &AdminClient,
    database_path: &str,
    table: &str,
) -> Result<()> {
    let get_ddl_request = GetDatabaseDdlRequest {
        database: database_path.to_string(),
    };

    let ddl_response = admin_client
        .database()
        .get_database_ddl(get_ddl_request, None)
        .await
        .context("Failed to get database DDL")?;

    let plain = format!("CREATE TABLE {} ", table);
    let quoted = format!("CREATE TABLE `{}`", table);
    let table_exists = ddl_response
        .into_inner()
        .statements
        .iter()
        .any(|stmt| stmt.contains(&plain) || stmt.contains(&quoted));

    if table_exists {
        tracing::info!("Table '{}' already exists", table);
        return Ok(());
    }

    tracing::info!("Table '{}' not found, creating...", table);

    let update_request = UpdateDatabaseDdlRequest {
        database: database_path.to_string(),
        statements: vec![table_ddl(table)],
        operation_id: String::new(),
        proto_descriptors: vec![],
        throughput_mode: false,
    };

    let mut operation = admin_client
        .database()
        .update_database_ddl(update_request, None)
        .await
        .context("Failed to start table creation")?;

    operation
        .wait(None)
        .await
        .context("Failed to create table")?;

    tracing::info!("Table '{}' created successfully", table);
    Ok(())
}
