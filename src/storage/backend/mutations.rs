//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, SqlErr};
use tracing::{debug, error, info, warn};

use super::SeaOrmStorage;
use super::converters::entry_to_active_model;
use super::timeout::with_timeout;
use crate::errors::{LinkcoreError, Result};
use crate::storage::{Entry, InsertOutcome};

use migration::entities::url_entry;

/// 防止异常情况下无限循环
const MAX_DELETE_BATCHES: usize = 10_000;

impl SeaOrmStorage {
    /// Plain INSERT; the primary key on `token` (and the unique index on
    /// `id`) turns a duplicate into `AlreadyExists` within the same statement.
    pub async fn insert_if_absent(&self, entry: &Entry) -> Result<InsertOutcome> {
        let active_model = entry_to_active_model(entry);

        let result = with_timeout(
            &format!("insert({})", entry.token),
            self.call_timeout,
            url_entry::Entity::insert(active_model).exec_without_returning(&self.db),
        )
        .await;

        match result {
            Ok(_) => {
                debug!("Entry inserted: {}", entry.token);
                Ok(InsertOutcome::Inserted)
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                debug!("Entry already exists: {}", entry.token);
                Ok(InsertOutcome::AlreadyExists)
            }
            Err(e) => {
                error!("Failed to insert entry '{}': {}", entry.token, e);
                Err(LinkcoreError::store_unavailable(format!(
                    "Failed to insert entry '{}': {}",
                    entry.token, e
                )))
            }
        }
    }

    /// 分批删除过期条目，返回被删除的 token
    ///
    /// Each batch is its own short statement so a large backlog never holds
    /// the database for the whole sweep. Once a batch has been deleted its
    /// tokens are always returned: a failure in a later batch is logged and
    /// the sweep stops early instead of reporting an error.
    pub async fn remove_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>> {
        let deleted_tokens = drain_in_batches(self.delete_batch_size, move || {
            self.remove_expired_batch(now)
        })
        .await?;

        if !deleted_tokens.is_empty() {
            info!("Deleted {} expired entries", deleted_tokens.len());
        }
        Ok(deleted_tokens)
    }

    /// 删除一批过期条目
    async fn remove_expired_batch(&self, now: DateTime<Utc>) -> Result<Vec<String>> {
        let batch = self
            .find_expired_tokens(now, self.delete_batch_size)
            .await?;
        if batch.is_empty() {
            return Ok(batch);
        }

        // 再次带上过期条件，避免误删
        let deleted = with_timeout(
            "delete_expired",
            self.call_timeout,
            url_entry::Entity::delete_many()
                .filter(url_entry::Column::Token.is_in(batch.iter().cloned()))
                .filter(url_entry::Column::ExpiresAt.lt(now))
                .exec(&self.db),
        )
        .await
        .map_err(|e| {
            error!("Failed to delete expired entries: {}", e);
            LinkcoreError::store_unavailable(format!(
                "Failed to delete expired entries: {}",
                e
            ))
        })?
        .rows_affected;

        debug!(
            "Expired entry cleanup batch: selected {}, deleted {} rows",
            batch.len(),
            deleted
        );
        Ok(batch)
    }
}

/// 反复执行 `next_batch` 直到某批不足 `batch_size`
///
/// An error on the first batch is returned as-is. An error after at least
/// one successful batch ends the loop and yields what was already deleted.
async fn drain_in_batches<F, Fut>(batch_size: u64, mut next_batch: F) -> Result<Vec<String>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<String>>>,
{
    let mut deleted_tokens = Vec::new();

    for iteration in 1..=MAX_DELETE_BATCHES {
        let batch = match next_batch().await {
            Ok(batch) => batch,
            Err(e) if deleted_tokens.is_empty() => return Err(e),
            Err(e) => {
                warn!(
                    "Expired entry cleanup stopped at batch {} after deleting {} rows: {}",
                    iteration,
                    deleted_tokens.len(),
                    e
                );
                return Ok(deleted_tokens);
            }
        };

        let batch_len = batch.len() as u64;
        deleted_tokens.extend(batch);

        if batch_len < batch_size {
            return Ok(deleted_tokens);
        }
    }

    warn!(
        "Expired entry cleanup reached max iterations {} (deleted {} rows)",
        MAX_DELETE_BATCHES,
        deleted_tokens.len()
    );
    Ok(deleted_tokens)
}
