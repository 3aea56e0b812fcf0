use async_trait::async_trait;
use moka::future::Cache;
use shortenit_core::{CacheError, LongUrl, MappingCache, ShortCode};
use tracing::{debug, trace};

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;

/// An in-memory [`MappingCache`] using Moka.
///
/// Suitable for single-node deployments and tests. By default both key
/// spaces are unbounded and entries never expire; a bounded cache may
/// evict entries, which only costs a store lookup later.
#[derive(Debug, Clone)]
pub struct MokaMappingCache {
    forward: Cache<LongUrl, ShortCode>,
    backward: Cache<ShortCode, LongUrl>,
}

impl MokaMappingCache {
    /// Creates an unbounded cache.
    pub fn new() -> Self {
        Self {
            forward: Cache::builder().build(),
            backward: Cache::builder().build(),
        }
    }

    /// Creates a cache holding at most `max_capacity` entries per direction.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            forward: Cache::builder().max_capacity(max_capacity).build(),
            backward: Cache::builder().max_capacity(max_capacity).build(),
        }
    }
}

impl Default for MokaMappingCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MappingCache for MokaMappingCache {
    async fn get_forward(&self, long_url: &LongUrl) -> Result<Option<ShortCode>> {
        trace!(long_url = %long_url, "Fetching forward entry from Moka cache");
        Ok(self.forward.get(long_url).await)
    }

    async fn get_backward(&self, code: &ShortCode) -> Result<Option<LongUrl>> {
        trace!(code = %code, "Fetching backward entry from Moka cache");
        Ok(self.backward.get(code).await)
    }

    async fn set_forward(&self, long_url: &LongUrl, code: &ShortCode) -> Result<()> {
        self.forward.insert(long_url.clone(), code.clone()).await;
        debug!(long_url = %long_url, code = %code, "Cached forward entry in Moka");
        Ok(())
    }

    async fn set_backward(&self, code: &ShortCode, long_url: &LongUrl) -> Result<()> {
        self.backward.insert(code.clone(), long_url.clone()).await;
        debug!(code = %code, long_url = %long_url, "Cached backward entry in Moka");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
