use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cache::{CacheFactory, UrlCache};
use crate::config::StaticConfig;
use crate::services::{ExpirationSweeper, ShortenerEngine, SweeperHandle};
use crate::storage::{EntryStore, StorageFactory};

pub struct StartupContext {
    pub store: Arc<dyn EntryStore>,
    pub cache: Arc<dyn UrlCache>,
    pub engine: Arc<ShortenerEngine>,
    pub sweeper: SweeperHandle,
}

/// 准备服务器启动的上下文
///
/// Store → Cache → Engine → Sweeper. Any failure here aborts startup.
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    // redis 的 tokio-rustls 连接需要进程级 crypto provider；重复安装不算错误
    let _ = rustls::crypto::ring::default_provider().install_default();

    let storage = StorageFactory::create(config)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());
    let store: Arc<dyn EntryStore> = storage;

    let cache = CacheFactory::create(&config.cache)
        .await
        .context("Failed to create cache backend")?;

    let engine = Arc::new(ShortenerEngine::new(
        store.clone(),
        cache.clone(),
        Duration::from_secs(config.cache.default_ttl),
    ));

    let sweeper = Arc::new(ExpirationSweeper::new(
        store.clone(),
        cache.clone(),
        Duration::from_secs(config.sweeper.interval_secs),
    ))
    .spawn();

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        store,
        cache,
        engine,
        sweeper,
    })
}
