//! SeaORM storage backend
//!
//! This module provides the durable entry table using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;
pub mod timeout;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::errors::{LinkcoreError, Result};
use crate::storage::{Entry, EntryStore, InsertOutcome};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{entry_to_active_model, model_to_entry};

/// 单批删除的默认数量
const DEFAULT_DELETE_BATCH_SIZE: u64 = 1000;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(LinkcoreError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// 单次调用超时
    call_timeout: Duration,
    /// 过期清理每批删除的行数
    delete_batch_size: u64,
}

impl SeaOrmStorage {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        if config.database_url.is_empty() {
            return Err(LinkcoreError::database_config("DATABASE_URL is not set"));
        }

        let backend_name = infer_backend_from_url(&config.database_url)?;
        let call_timeout = Duration::from_secs(config.timeout.max(1));

        let db = if backend_name == "sqlite" {
            connect_sqlite(&config.database_url, call_timeout).await?
        } else {
            connect_generic(
                &config.database_url,
                &backend_name,
                config.pool_size,
                call_timeout,
            )
            .await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name,
            call_timeout,
            delete_batch_size: DEFAULT_DELETE_BATCH_SIZE,
        };

        run_migrations(&storage.db).await?;

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn with_delete_batch_size(mut self, batch_size: u64) -> Self {
        self.delete_batch_size = batch_size.max(1);
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl EntryStore for SeaOrmStorage {
    fn backend_name(&self) -> &str {
        &self.backend_name
    }

    async fn next_id(&self) -> Result<i64> {
        self.max_id().await.map(|max| max.unwrap_or(0) + 1)
    }

    async fn insert_generated(
        &self,
        id: i64,
        token: &str,
        original_url: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<InsertOutcome> {
        let entry = Entry::generated(id, token.to_string(), original_url.to_string(), expires_at);
        self.insert_if_absent(&entry).await
    }

    async fn try_insert_custom(
        &self,
        token: &str,
        original_url: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<InsertOutcome> {
        let entry = Entry::custom(token.to_string(), original_url.to_string(), expires_at);
        self.insert_if_absent(&entry).await
    }

    async fn lookup(&self, token: &str) -> Result<Option<Entry>> {
        self.get(token).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>> {
        self.remove_expired(now).await
    }
}
