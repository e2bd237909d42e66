pub mod backends;
pub mod register;
pub mod traits;

use std::sync::Arc;

use tracing::info;

use crate::config::CacheConfig;
use crate::errors::{LinkcoreError, Result};

pub use backends::{MokaUrlCache, NullUrlCache, RedisUrlCache};
pub use traits::{CacheResult, UrlCache};

pub struct CacheFactory;

impl CacheFactory {
    /// Build the cache backend named by `config.cache_type`.
    pub async fn create(config: &CacheConfig) -> Result<Arc<dyn UrlCache>> {
        register::debug_cache_registry();

        let ctor = register::get_url_cache_plugin(&config.cache_type).ok_or_else(|| {
            LinkcoreError::cache_plugin_not_found(format!(
                "Cache plugin not found: {}",
                config.cache_type
            ))
        })?;

        let cache = ctor(config.clone()).await?;
        info!("Using cache backend: {}", cache.backend_name());
        Ok(Arc::from(cache))
    }
}
