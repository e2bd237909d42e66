//! Shortener engine tests
//!
//! Allocation, custom tokens, resolution and cache discipline against a
//! real SQLite store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use linkcore::cache::{CacheResult, UrlCache};
use linkcore::config::DatabaseConfig;
use linkcore::errors::{LinkcoreError, Result};
use linkcore::services::{ExpirationSweeper, GenerateRequest, ShortenerEngine};
use linkcore::storage::{Entry, EntryStore, InsertOutcome, SeaOrmStorage};
use tempfile::TempDir;
use tokio::sync::RwLock;

// =============================================================================
// Test Setup
// =============================================================================

/// Mock cache implementation for testing
#[derive(Default)]
struct MockCache {
    data: RwLock<HashMap<String, String>>,
    /// 为 true 时所有操作返回 CacheUnavailable
    failing: AtomicBool,
    get_calls: AtomicUsize,
    set_calls: AtomicUsize,
}

impl MockCache {
    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(LinkcoreError::cache_unavailable("mock cache is down"))
        } else {
            Ok(())
        }
    }

    async fn contains(&self, token: &str) -> bool {
        self.data.read().await.contains_key(token)
    }
}

#[async_trait]
impl UrlCache for MockCache {
    fn backend_name(&self) -> &str {
        "mock"
    }

    async fn get(&self, token: &str) -> Result<CacheResult> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(match self.data.read().await.get(token) {
            Some(url) => CacheResult::Hit(url.clone()),
            None => CacheResult::Miss,
        })
    }

    async fn set(&self, token: &str, original_url: &str, _ttl: Duration) -> Result<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.data
            .write()
            .await
            .insert(token.to_string(), original_url.to_string());
        Ok(())
    }

    async fn evict(&self, token: &str) -> Result<()> {
        self.check()?;
        self.data.write().await.remove(token);
        Ok(())
    }
}

/// Store whose every call fails
struct FailingStore;

#[async_trait]
impl EntryStore for FailingStore {
    fn backend_name(&self) -> &str {
        "failing"
    }

    async fn next_id(&self) -> Result<i64> {
        Err(LinkcoreError::store_unavailable("store is down"))
    }

    async fn insert_generated(
        &self,
        _id: i64,
        _token: &str,
        _original_url: &str,
        _expires_at: Option<DateTime<Utc>>,
    ) -> Result<InsertOutcome> {
        Err(LinkcoreError::store_unavailable("store is down"))
    }

    async fn try_insert_custom(
        &self,
        _token: &str,
        _original_url: &str,
        _expires_at: Option<DateTime<Utc>>,
    ) -> Result<InsertOutcome> {
        Err(LinkcoreError::store_unavailable("store is down"))
    }

    async fn lookup(&self, _token: &str) -> Result<Option<Entry>> {
        Err(LinkcoreError::store_unavailable("store is down"))
    }

    async fn delete_expired(&self, _now: DateTime<Utc>) -> Result<Vec<String>> {
        Err(LinkcoreError::store_unavailable("store is down"))
    }
}

struct TestEnv {
    engine: Arc<ShortenerEngine>,
    store: Arc<SeaOrmStorage>,
    cache: Arc<MockCache>,
    _dir: TempDir,
}

/// Create a test engine with temporary storage
async fn create_test_engine() -> TestEnv {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("engine_test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..DatabaseConfig::default()
    };

    let store = Arc::new(
        SeaOrmStorage::new(&config)
            .await
            .expect("Failed to create storage"),
    );
    let cache = Arc::new(MockCache::default());
    let engine = Arc::new(ShortenerEngine::new(
        store.clone(),
        cache.clone(),
        Duration::from_secs(86400),
    ));

    TestEnv {
        engine,
        store,
        cache,
        _dir: temp_dir,
    }
}

// =============================================================================
// Generation
// =============================================================================

#[tokio::test]
async fn test_first_generated_token_is_one() {
    let env = create_test_engine().await;

    let token = env
        .engine
        .generate(GenerateRequest::new("https://example.com").with_custom_token(""))
        .await
        .unwrap();
    assert_eq!(token, "1");

    assert_eq!(
        env.engine.resolve(&token).await.unwrap(),
        Some("https://example.com".to_string())
    );
    assert_eq!(env.engine.resolve("nonexistent").await.unwrap(), None);
}

#[tokio::test]
async fn test_generated_tokens_are_sequential() {
    let env = create_test_engine().await;

    let mut tokens = Vec::new();
    for i in 0..3 {
        tokens.push(
            env.engine
                .generate(GenerateRequest::new(format!("https://{}.example", i)))
                .await
                .unwrap(),
        );
    }

    assert_eq!(tokens, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_generated_entry_has_id() {
    let env = create_test_engine().await;

    let token = env
        .engine
        .generate(GenerateRequest::new("https://example.com"))
        .await
        .unwrap();

    let entry = env.store.lookup(&token).await.unwrap().unwrap();
    assert_eq!(entry.id, Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_generation_yields_distinct_tokens() {
    let env = create_test_engine().await;
    let n = 50;

    let mut handles = Vec::new();
    for i in 0..n {
        let engine = env.engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .generate(GenerateRequest::new(format!("https://site{}.example", i)))
                .await
        }));
    }

    let mut tokens = HashSet::new();
    for handle in handles {
        let token = handle.await.unwrap().unwrap();
        assert!(tokens.insert(token), "duplicate token allocated");
    }
    assert_eq!(tokens.len(), n);
    assert_eq!(env.store.next_id().await.unwrap(), n as i64 + 1);
}

#[tokio::test]
async fn test_empty_url_rejected() {
    let env = create_test_engine().await;

    let result = env.engine.generate(GenerateRequest::new("")).await;
    assert!(matches!(result, Err(LinkcoreError::EmptyUrl(_))));
    assert_eq!(env.store.next_id().await.unwrap(), 1);
}

#[tokio::test]
async fn test_generate_writes_through_to_cache() {
    let env = create_test_engine().await;

    let token = env
        .engine
        .generate(GenerateRequest::new("https://example.com"))
        .await
        .unwrap();

    assert!(env.cache.contains(&token).await);
}

#[tokio::test]
async fn test_generate_survives_cache_failure() {
    let env = create_test_engine().await;
    env.cache.set_failing(true);

    let token = env
        .engine
        .generate(GenerateRequest::new("https://example.com"))
        .await
        .unwrap();

    assert_eq!(
        env.engine.resolve(&token).await.unwrap(),
        Some("https://example.com".to_string())
    );
}

// =============================================================================
// Custom tokens
// =============================================================================

#[tokio::test]
async fn test_custom_token_validation() {
    let env = create_test_engine().await;

    let invalid = env
        .engine
        .generate(GenerateRequest::new("https://example.com").with_custom_token("invalid@token"))
        .await;
    assert!(matches!(invalid, Err(LinkcoreError::InvalidCustomToken(_))));

    let valid = env
        .engine
        .generate(GenerateRequest::new("https://example.com").with_custom_token("valid-token_1"))
        .await
        .unwrap();
    assert_eq!(valid, "valid-token_1");
}

#[tokio::test]
async fn test_duplicate_custom_token() {
    let env = create_test_engine().await;

    env.engine
        .generate(GenerateRequest::new("https://a.example").with_custom_token("promo"))
        .await
        .unwrap();

    let second = env
        .engine
        .generate(GenerateRequest::new("https://b.example").with_custom_token("promo"))
        .await;
    assert!(matches!(second, Err(LinkcoreError::DuplicateCustomToken(_))));

    assert_eq!(
        env.engine.resolve("promo").await.unwrap(),
        Some("https://a.example".to_string())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_custom_token_single_winner() {
    let env = create_test_engine().await;

    let a = {
        let engine = env.engine.clone();
        tokio::spawn(async move {
            engine
                .generate(GenerateRequest::new("https://a.example").with_custom_token("same"))
                .await
        })
    };
    let b = {
        let engine = env.engine.clone();
        tokio::spawn(async move {
            engine
                .generate(GenerateRequest::new("https://b.example").with_custom_token("same"))
                .await
        })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(LinkcoreError::DuplicateCustomToken(_))))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(duplicates, 1);
}

#[tokio::test]
async fn test_custom_token_on_next_id_is_skipped() {
    let env = create_test_engine().await;

    // 自定义 token "1" 占用了 id 1 的编码结果
    env.engine
        .generate(GenerateRequest::new("https://custom.example").with_custom_token("1"))
        .await
        .unwrap();

    let first = env
        .engine
        .generate(GenerateRequest::new("https://a.example"))
        .await
        .unwrap();
    assert_eq!(first, "2");

    let second = env
        .engine
        .generate(GenerateRequest::new("https://b.example"))
        .await
        .unwrap();
    assert_eq!(second, "3");

    assert_eq!(
        env.engine.resolve("1").await.unwrap(),
        Some("https://custom.example".to_string())
    );
    assert_eq!(
        env.engine.resolve("2").await.unwrap(),
        Some("https://a.example".to_string())
    );
}

#[tokio::test]
async fn test_custom_tokens_on_consecutive_ids_are_skipped() {
    let env = create_test_engine().await;

    let first = env
        .engine
        .generate(GenerateRequest::new("https://a.example"))
        .await
        .unwrap();
    assert_eq!(first, "1");

    for token in ["2", "3"] {
        env.engine
            .generate(GenerateRequest::new("https://custom.example").with_custom_token(token))
            .await
            .unwrap();
    }

    let next = env
        .engine
        .generate(GenerateRequest::new("https://b.example"))
        .await
        .unwrap();
    assert_eq!(next, "4");

    let entry = env.store.lookup("4").await.unwrap().unwrap();
    assert_eq!(entry.id, Some(4));
}

// =============================================================================
// Resolution
// =============================================================================

#[tokio::test]
async fn test_resolve_empty_token_touches_nothing() {
    let env = create_test_engine().await;

    assert_eq!(env.engine.resolve("").await.unwrap(), None);
    assert_eq!(env.cache.get_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_resolve_populates_cache_on_miss() {
    let env = create_test_engine().await;

    // 绕过引擎直接写入存储
    env.store
        .try_insert_custom("direct", "https://direct.example", None)
        .await
        .unwrap();
    assert!(!env.cache.contains("direct").await);

    assert_eq!(
        env.engine.resolve("direct").await.unwrap(),
        Some("https://direct.example".to_string())
    );
    assert!(env.cache.contains("direct").await);
}

#[tokio::test]
async fn test_resolve_cache_hit_skips_store() {
    let cache = Arc::new(MockCache::default());
    cache
        .set("cached", "https://cached.example", Duration::from_secs(60))
        .await
        .unwrap();
    let engine = ShortenerEngine::new(Arc::new(FailingStore), cache, Duration::from_secs(60));

    assert_eq!(
        engine.resolve("cached").await.unwrap(),
        Some("https://cached.example".to_string())
    );
}

#[tokio::test]
async fn test_resolve_falls_back_to_store_when_cache_down() {
    let env = create_test_engine().await;

    env.engine
        .generate(GenerateRequest::new("https://example.com").with_custom_token("fallback"))
        .await
        .unwrap();
    env.cache.set_failing(true);

    assert_eq!(
        env.engine.resolve("fallback").await.unwrap(),
        Some("https://example.com".to_string())
    );
    assert_eq!(env.engine.resolve("missing").await.unwrap(), None);
}

// =============================================================================
// Store failures
// =============================================================================

#[tokio::test]
async fn test_store_failure_propagates() {
    let engine = ShortenerEngine::new(
        Arc::new(FailingStore),
        Arc::new(MockCache::default()),
        Duration::from_secs(60),
    );

    let generated = engine
        .generate(GenerateRequest::new("https://example.com"))
        .await;
    assert!(matches!(generated, Err(LinkcoreError::StoreUnavailable(_))));

    let custom = engine
        .generate(GenerateRequest::new("https://example.com").with_custom_token("abc"))
        .await;
    assert!(matches!(custom, Err(LinkcoreError::StoreUnavailable(_))));

    let resolved = engine.resolve("abc").await;
    assert!(matches!(resolved, Err(LinkcoreError::StoreUnavailable(_))));
}

// =============================================================================
// Expiration
// =============================================================================

#[tokio::test]
async fn test_expired_entry_unresolvable_after_sweep() {
    let env = create_test_engine().await;
    let past = Utc::now() - chrono::Duration::minutes(1);

    let token = env
        .engine
        .generate(GenerateRequest::new("https://old.example").with_expires_at(past))
        .await
        .unwrap();

    // 已过期的条目不写穿缓存，也不回填，但清理前仍可解析
    assert!(!env.cache.contains(&token).await);
    assert_eq!(
        env.engine.resolve(&token).await.unwrap(),
        Some("https://old.example".to_string())
    );
    assert!(!env.cache.contains(&token).await);

    let sweeper = ExpirationSweeper::new(
        env.store.clone(),
        env.cache.clone(),
        Duration::from_secs(3600),
    );
    let report = sweeper.run_once(Utc::now()).await.unwrap();
    assert_eq!(report.deleted, 1);
    assert_eq!(report.evicted, 1);

    assert!(!env.cache.contains(&token).await);
    assert_eq!(env.engine.resolve(&token).await.unwrap(), None);
}

#[tokio::test]
async fn test_future_expiry_is_written_through() {
    let env = create_test_engine().await;
    let future = Utc::now() + chrono::Duration::hours(1);

    let token = env
        .engine
        .generate(GenerateRequest::new("https://soon.example").with_expires_at(future))
        .await
        .unwrap();

    assert!(env.cache.contains(&token).await);
}

#[tokio::test]
async fn test_reused_id_overwrites_stale_cache() {
    let env = create_test_engine().await;
    let past = Utc::now() - chrono::Duration::minutes(1);

    let token = env
        .engine
        .generate(GenerateRequest::new("https://old.example").with_expires_at(past))
        .await
        .unwrap();
    assert_eq!(token, "1");

    // 只删存储，缓存里留下旧值
    env.store.delete_expired(Utc::now()).await.unwrap();
    env.cache
        .set("1", "https://old.example", Duration::from_secs(60))
        .await
        .unwrap();

    let reused = env
        .engine
        .generate(GenerateRequest::new("https://new.example"))
        .await
        .unwrap();
    assert_eq!(reused, "1");
    assert_eq!(
        env.engine.resolve("1").await.unwrap(),
        Some("https://new.example".to_string())
    );
}
