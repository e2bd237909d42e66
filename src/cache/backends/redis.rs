use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, trace};

use crate::cache::{CacheResult, UrlCache};
use crate::config::CacheConfig;
use crate::errors::{LinkcoreError, Result};

/// Redis-backed cache. Values are the original URL as plain text.
pub struct RedisUrlCache {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
    call_timeout: Duration,
}

impl RedisUrlCache {
    pub async fn from_config(config: &CacheConfig) -> Result<Self> {
        let redis_config = &config.redis;

        let client = redis::Client::open(redis_config.url.clone()).map_err(|e| {
            LinkcoreError::cache_unavailable(format!(
                "Failed to create Redis client for '{}': {}",
                redis_config.url, e
            ))
        })?;

        let cache = Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: redis_config.key_prefix.clone(),
            call_timeout: Duration::from_millis(redis_config.timeout_ms.max(1)),
        };

        // 启动时测试 Redis 连接
        cache
            .with_connection("PING", |mut conn| async move {
                let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
                Ok(pong)
            })
            .await
            .map(|pong| debug!("Redis connection test successful: {}", pong))
            .map_err(|e| {
                error!(
                    "Failed to ping Redis server: {}. Check Redis server status and URL: {}",
                    e, redis_config.url
                );
                e
            })?;

        debug!(
            "RedisUrlCache created with prefix: '{}'",
            redis_config.key_prefix
        );
        Ok(cache)
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> std::result::Result<MultiplexedConnection, redis::RedisError> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self.client.get_multiplexed_async_connection().await?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    /// Run one command under the per-call timeout. Errors and timeouts drop
    /// the cached connection so the next call reconnects.
    async fn with_connection<T, F, Fut>(&self, operation_name: &str, op: F) -> Result<T>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: Future<Output = redis::RedisResult<T>>,
    {
        let call = async {
            let conn = self.get_connection().await?;
            op(conn).await
        };

        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                self.reset_connection().await;
                Err(LinkcoreError::cache_unavailable(format!(
                    "Redis {} failed: {}",
                    operation_name, e
                )))
            }
            Err(_elapsed) => {
                self.reset_connection().await;
                Err(LinkcoreError::cache_unavailable(format!(
                    "Redis {} timed out after {}ms",
                    operation_name,
                    self.call_timeout.as_millis()
                )))
            }
        }
    }

    fn make_key(&self, token: &str) -> String {
        format!("{}{}", self.key_prefix, token)
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    fn backend_name(&self) -> &str {
        "redis"
    }

    async fn get(&self, token: &str) -> Result<CacheResult> {
        let redis_key = self.make_key(token);

        let value: Option<String> = self
            .with_connection("GET", |mut conn| async move { conn.get(redis_key).await })
            .await?;

        match value {
            Some(original_url) => {
                trace!("Successfully retrieved token: {}", token);
                Ok(CacheResult::Hit(original_url))
            }
            None => {
                trace!("Token not found in cache: {}", token);
                Ok(CacheResult::Miss)
            }
        }
    }

    async fn set(&self, token: &str, original_url: &str, ttl: Duration) -> Result<()> {
        let redis_key = self.make_key(token);
        let value = original_url.to_string();
        // SET EX 最小 1 秒
        let ttl_secs = ttl.as_secs().max(1);

        self.with_connection("SET", |mut conn| async move {
            conn.set_ex::<String, String, ()>(redis_key, value, ttl_secs)
                .await
        })
        .await?;

        trace!("Successfully inserted token into cache: {}", token);
        Ok(())
    }

    async fn evict(&self, token: &str) -> Result<()> {
        let redis_key = self.make_key(token);

        let deleted_count: i64 = self
            .with_connection("DEL", |mut conn| async move {
                conn.del::<String, i64>(redis_key).await
            })
            .await?;

        if deleted_count > 0 {
            trace!("Successfully removed token from cache: {}", token);
        } else {
            trace!("Token not found in cache for removal: {}", token);
        }
        Ok(())
    }
}
