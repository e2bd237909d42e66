//! Shortener engine
//!
//! Allocates tokens (generated or caller-chosen) and resolves them back to
//! their original URLs, cache first with a store fallback.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, error, info, trace, warn};

use crate::cache::{CacheResult, UrlCache};
use crate::codec;
use crate::errors::{LinkcoreError, Result};
use crate::storage::{EntryStore, InsertOutcome};

/// 与 urls.token 列宽度一致
pub const MAX_CUSTOM_TOKEN_LEN: usize = 255;

/// 单次分配最多跳过的、被自定义 token 占用的 id 数
const MAX_ALLOCATION_ATTEMPTS: usize = 1024;

/// Request to create a new short token
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Redirect target, must be non-empty
    pub original_url: String,
    /// Caller-chosen token; `None` or empty means "generate one"
    pub custom_token: Option<String>,
    /// Absent means the entry never expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl GenerateRequest {
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            ..Self::default()
        }
    }

    pub fn with_custom_token(mut self, token: impl Into<String>) -> Self {
        self.custom_token = Some(token.into());
        self
    }

    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// Token allocation and resolution over a store and a cache.
///
/// One instance per process, shared by reference. `allocation_lock` is held
/// exclusively around id generation and every insert, and shared around
/// store lookups; cache reads never touch it.
pub struct ShortenerEngine {
    store: Arc<dyn EntryStore>,
    cache: Arc<dyn UrlCache>,
    allocation_lock: RwLock<()>,
    cache_ttl: Duration,
}

impl ShortenerEngine {
    pub fn new(store: Arc<dyn EntryStore>, cache: Arc<dyn UrlCache>, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache,
            allocation_lock: RwLock::new(()),
            cache_ttl,
        }
    }

    pub fn store(&self) -> &Arc<dyn EntryStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<dyn UrlCache> {
        &self.cache
    }

    /// Create an entry and return its token.
    pub async fn generate(&self, req: GenerateRequest) -> Result<String> {
        if req.original_url.is_empty() {
            return Err(LinkcoreError::empty_url("original_url must not be empty"));
        }

        // 空字符串等同于未指定
        let custom_token = req.custom_token.filter(|t| !t.is_empty());

        // 校验不需要持锁
        if let Some(ref token) = custom_token
            && (token.len() > MAX_CUSTOM_TOKEN_LEN || !codec::validate_custom_token(token))
        {
            return Err(LinkcoreError::invalid_custom_token(format!(
                "Invalid custom token '{}'. Only letters, digits, '-' and '_' are allowed (max {} characters).",
                token, MAX_CUSTOM_TOKEN_LEN
            )));
        }

        let token = match custom_token {
            Some(token) => {
                self.insert_custom(token, &req.original_url, req.expires_at)
                    .await?
            }
            None => {
                self.allocate_generated(&req.original_url, req.expires_at)
                    .await?
            }
        };

        // 写穿缓存，覆盖复用 id 留下的旧值。
        // 已过期的条目不写，否则可能在清理驱逐之后重新进入缓存
        if already_expired(req.expires_at) {
            debug!("Skipping cache write for already expired token '{}'", token);
        } else if let Err(e) = self
            .cache
            .set(&token, &req.original_url, self.cache_ttl)
            .await
        {
            warn!("Failed to populate cache for new token '{}': {}", token, e);
        }

        info!("Created token '{}' -> '{}'", token, req.original_url);
        Ok(token)
    }

    async fn insert_custom(
        &self,
        token: String,
        original_url: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<String> {
        let _guard = self.allocation_lock.write().await;

        match self
            .store
            .try_insert_custom(&token, original_url, expires_at)
            .await?
        {
            InsertOutcome::Inserted => Ok(token),
            InsertOutcome::AlreadyExists => Err(LinkcoreError::duplicate_custom_token(format!(
                "Custom token '{}' is already taken",
                token
            ))),
        }
    }

    async fn allocate_generated(
        &self,
        original_url: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<String> {
        let _guard = self.allocation_lock.write().await;

        let mut id = self.store.next_id().await?;

        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let token = match u64::try_from(id) {
                Ok(n) if n >= 1 => codec::encode(n),
                _ => {
                    error!("Store returned a non-positive next id: {}", id);
                    return Err(LinkcoreError::internal(format!(
                        "Store returned a non-positive next id: {}",
                        id
                    )));
                }
            };

            match self
                .store
                .insert_generated(id, &token, original_url, expires_at)
                .await?
            {
                InsertOutcome::Inserted => {
                    debug!("Allocated id {} as token '{}'", id, token);
                    return Ok(token);
                }
                InsertOutcome::AlreadyExists => {
                    // 自定义 token 恰好等于该 id 的编码：跳过这个 id
                    match self.store.lookup(&token).await? {
                        Some(existing) if existing.id.is_none() => {
                            debug!(
                                "Id {} skipped, token '{}' is held by a custom entry",
                                id, token
                            );
                            id += 1;
                        }
                        _ => {
                            // 正常加锁下不可达
                            error!(
                                "Generated token '{}' (id {}) collides with an existing entry",
                                token, id
                            );
                            return Err(LinkcoreError::internal(format!(
                                "Generated token '{}' (id {}) collides with an existing entry",
                                token, id
                            )));
                        }
                    }
                }
            }
        }

        error!(
            "No free id found after {} attempts (stopped at {})",
            MAX_ALLOCATION_ATTEMPTS, id
        );
        Err(LinkcoreError::internal(format!(
            "No free id found after {} attempts",
            MAX_ALLOCATION_ATTEMPTS
        )))
    }

    /// Look up the original URL for `token`.
    ///
    /// `Ok(None)` is a normal not-found outcome. Cache failures fall through
    /// to the store; store failures are returned.
    pub async fn resolve(&self, token: &str) -> Result<Option<String>> {
        if token.is_empty() {
            return Ok(None);
        }

        match self.cache.get(token).await {
            Ok(CacheResult::Hit(url)) => {
                trace!("Cache hit for token '{}'", token);
                return Ok(Some(url));
            }
            Ok(CacheResult::Miss) => {
                trace!("Cache miss for token '{}'", token);
            }
            Err(e) => {
                warn!("Cache lookup failed for '{}', falling back to store: {}", token, e);
            }
        }

        let entry = {
            let _guard = self.allocation_lock.read().await;
            self.store.lookup(token).await?
        };

        let Some(entry) = entry else {
            debug!("Token not found: {}", token);
            return Ok(None);
        };

        // 过期但尚未清理的条目照常返回，只是不回填缓存
        if already_expired(entry.expires_at) {
            return Ok(Some(entry.original_url));
        }

        if let Err(e) = self
            .cache
            .set(token, &entry.original_url, self.cache_ttl)
            .await
        {
            warn!("Failed to populate cache for '{}': {}", token, e);
        }

        Ok(Some(entry.original_url))
    }
}

fn already_expired(expires_at: Option<DateTime<Utc>>) -> bool {
    expires_at.is_some_and(|t| t < Utc::now())
}
