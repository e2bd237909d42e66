//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect};
use tracing::error;

use super::SeaOrmStorage;
use super::converters::model_to_entry;
use super::timeout::with_timeout;
use crate::errors::{LinkcoreError, Result};
use crate::storage::Entry;

use migration::entities::url_entry;

impl SeaOrmStorage {
    pub async fn get(&self, token: &str) -> Result<Option<Entry>> {
        let result = with_timeout(
            &format!("get({})", token),
            self.call_timeout,
            url_entry::Entity::find_by_id(token.to_string()).one(&self.db),
        )
        .await;

        match result {
            Ok(model) => Ok(model.map(model_to_entry)),
            Err(e) => {
                error!("Failed to look up token '{}': {}", token, e);
                Err(LinkcoreError::store_unavailable(format!(
                    "Failed to look up token '{}': {}",
                    token, e
                )))
            }
        }
    }

    /// 当前最大的数值 id（表为空或只有自定义 token 时为 None）
    pub async fn max_id(&self) -> Result<Option<i64>> {
        let result = with_timeout(
            "max_id",
            self.call_timeout,
            url_entry::Entity::find()
                .select_only()
                .column_as(url_entry::Column::Id.max(), "max_id")
                .into_tuple::<Option<i64>>()
                .one(&self.db),
        )
        .await;

        match result {
            Ok(row) => Ok(row.flatten()),
            Err(e) => {
                error!("Failed to read max id: {}", e);
                Err(LinkcoreError::store_unavailable(format!(
                    "Failed to read max id: {}",
                    e
                )))
            }
        }
    }

    /// 查询一批已过期的 token
    pub(super) async fn find_expired_tokens(
        &self,
        now: chrono::DateTime<chrono::Utc>,
        limit: u64,
    ) -> Result<Vec<String>> {
        with_timeout(
            "find_expired_tokens",
            self.call_timeout,
            url_entry::Entity::find()
                .select_only()
                .column(url_entry::Column::Token)
                .filter(url_entry::Column::ExpiresAt.is_not_null())
                .filter(url_entry::Column::ExpiresAt.lt(now))
                .limit(limit)
                .into_tuple::<String>()
                .all(&self.db),
        )
        .await
        .map_err(|e| {
            LinkcoreError::store_unavailable(format!("Failed to scan expired entries: {}", e))
        })
    }
}
