use std::time::Duration;

use async_trait::async_trait;

use crate::errors::Result;

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult {
    /// 命中，值为原始 URL
    Hit(String),
    /// 未命中
    Miss,
}

/// Best-effort `token -> original_url` accelerator in front of the store.
///
/// Never authoritative. Implementations report backend failures as
/// `LinkcoreError::CacheUnavailable`; callers decide whether to downgrade
/// them to a miss.
#[async_trait]
pub trait UrlCache: Send + Sync {
    fn backend_name(&self) -> &str;

    async fn get(&self, token: &str) -> Result<CacheResult>;

    /// Store `original_url` under `token` for `ttl`, replacing any previous
    /// value.
    async fn set(&self, token: &str, original_url: &str, ttl: Duration) -> Result<()>;

    /// Remove `token`. Evicting an absent key is not an error.
    async fn evict(&self, token: &str) -> Result<()>;
}
