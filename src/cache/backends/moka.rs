use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::cache::{CacheResult, UrlCache};
use crate::config::CacheConfig;
use crate::errors::Result;

#[derive(Clone)]
struct CachedUrl {
    original_url: String,
    ttl: Duration,
}

/// 每个条目使用写入时给定的 TTL，覆盖写入时重新计时
struct PerEntryExpiry;

impl Expiry<String, CachedUrl> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedUrl,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache backed by moka.
pub struct MokaUrlCache {
    inner: Cache<String, CachedUrl>,
}

impl MokaUrlCache {
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .build();

        debug!(
            "MokaUrlCache initialized with max capacity: {}",
            max_capacity
        );
        Self { inner }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.memory.max_capacity)
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn get(&self, token: &str) -> Result<CacheResult> {
        match self.inner.get(token).await {
            Some(value) => Ok(CacheResult::Hit(value.original_url)),
            None => Ok(CacheResult::Miss),
        }
    }

    async fn set(&self, token: &str, original_url: &str, ttl: Duration) -> Result<()> {
        trace!("MokaUrlCache.set {} (ttl {:?})", token, ttl);
        self.inner
            .insert(
                token.to_string(),
                CachedUrl {
                    original_url: original_url.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn evict(&self, token: &str) -> Result<()> {
        self.inner.invalidate(token).await;
        Ok(())
    }
}
