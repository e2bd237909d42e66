use crate::cache::backends::{MokaUrlCache, NullUrlCache, RedisUrlCache};
use crate::cache::traits::UrlCache;
use crate::config::CacheConfig;
use crate::errors::Result;
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock},
};

pub type BoxedUrlCacheFuture = Pin<Box<dyn Future<Output = Result<Box<dyn UrlCache>>> + Send>>;
pub type UrlCacheConstructor = Arc<dyn Fn(CacheConfig) -> BoxedUrlCacheFuture + Send + Sync>;

static URL_CACHE_REGISTRY: Lazy<RwLock<HashMap<String, UrlCacheConstructor>>> =
    Lazy::new(|| RwLock::new(builtin_plugins()));

fn builtin_plugins() -> HashMap<String, UrlCacheConstructor> {
    let mut plugins: HashMap<String, UrlCacheConstructor> = HashMap::new();

    plugins.insert(
        "memory".to_string(),
        Arc::new(|config: CacheConfig| -> BoxedUrlCacheFuture {
            Box::pin(async move {
                let cache = MokaUrlCache::from_config(&config);
                Ok(Box::new(cache) as Box<dyn UrlCache>)
            })
        }),
    );
    plugins.insert(
        "redis".to_string(),
        Arc::new(|config: CacheConfig| -> BoxedUrlCacheFuture {
            Box::pin(async move {
                let cache = RedisUrlCache::from_config(&config).await?;
                Ok(Box::new(cache) as Box<dyn UrlCache>)
            })
        }),
    );
    plugins.insert(
        "null".to_string(),
        Arc::new(|_config: CacheConfig| -> BoxedUrlCacheFuture {
            Box::pin(async move { Ok(Box::new(NullUrlCache::new()) as Box<dyn UrlCache>) })
        }),
    );

    plugins
}

pub fn register_url_cache_plugin<S: Into<String>>(name: S, constructor: UrlCacheConstructor) {
    let name = name.into();
    let mut registry = URL_CACHE_REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.insert(name, constructor);
}

pub fn get_url_cache_plugin(name: &str) -> Option<UrlCacheConstructor> {
    URL_CACHE_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(name)
        .cloned()
}

pub fn debug_cache_registry() {
    let registry = URL_CACHE_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if registry.is_empty() {
        tracing::debug!("No cache plugins registered.");
    } else {
        tracing::debug!("Registered cache plugins:");
        for key in registry.keys() {
            tracing::debug!(" - {}", key);
        }
    }
}
