use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

use crate::cache::{CacheResult, UrlCache};
use crate::errors::Result;

/// Disables caching: every lookup misses and every write is dropped.
#[derive(Default)]
pub struct NullUrlCache;

impl NullUrlCache {
    pub fn new() -> Self {
        trace!("Using NullUrlCache: no cache will be used");
        NullUrlCache
    }
}

#[async_trait]
impl UrlCache for NullUrlCache {
    fn backend_name(&self) -> &str {
        "null"
    }

    async fn get(&self, token: &str) -> Result<CacheResult> {
        trace!("NullUrlCache.get called for token: {}", token);
        Ok(CacheResult::Miss)
    }

    async fn set(&self, token: &str, _original_url: &str, _ttl: Duration) -> Result<()> {
        trace!("NullUrlCache.set called for token: {}", token);
        Ok(())
    }

    async fn evict(&self, token: &str) -> Result<()> {
        trace!("NullUrlCache.evict called for token: {}", token);
        Ok(())
    }
}
