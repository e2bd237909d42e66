use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::StaticConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::{Entry, InsertOutcome};

/// Durable token → URL table.
///
/// Every operation is safe to call concurrently. Uniqueness of `token` is
/// enforced by the backend itself, so both insert paths are a single atomic
/// check-and-insert. Backend failures (including per-call timeouts) surface
/// as `LinkcoreError::StoreUnavailable` and are never retried here.
#[async_trait]
pub trait EntryStore: Send + Sync {
    fn backend_name(&self) -> &str;

    /// `max(existing ids) + 1`, or 1 for an empty table.
    ///
    /// Callers must hold the allocation lock until the derived entry is
    /// inserted.
    async fn next_id(&self) -> Result<i64>;

    /// Insert a system-generated entry. `AlreadyExists` means the token
    /// collided, which the caller must report rather than ignore.
    async fn insert_generated(
        &self,
        id: i64,
        token: &str,
        original_url: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<InsertOutcome>;

    /// Insert a caller-chosen token iff it is absent.
    async fn try_insert_custom(
        &self,
        token: &str,
        original_url: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<InsertOutcome>;

    async fn lookup(&self, token: &str) -> Result<Option<Entry>>;

    /// Delete every entry whose `expires_at` is set and earlier than `now`,
    /// returning the deleted tokens.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>>;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &StaticConfig) -> Result<Arc<SeaOrmStorage>> {
        let storage = SeaOrmStorage::new(&config.database)
            .await?
            .with_delete_batch_size(config.sweeper.batch_size);
        Ok(Arc::new(storage))
    }
}
