use shortenit_core::{
    CacheError, LongUrl, MappingCache, PartialCacheWriteError, ShortCode,
};
use tracing::{debug, trace, warn};

/// The resolver-facing view of a [`MappingCache`].
///
/// Reads fail open: a backend error is logged and reported as a miss, so
/// the caller falls through to the persistent store. Writes go to both
/// directions and report a [`PartialCacheWriteError`] when either fails.
#[derive(Debug, Clone)]
pub struct CacheLayer<C> {
    backend: C,
}

impl<C: MappingCache> CacheLayer<C> {
    pub fn new(backend: C) -> Self {
        Self { backend }
    }

    /// Returns a reference to the backend.
    pub fn backend(&self) -> &C {
        &self.backend
    }

    /// Looks up the code for `long_url`. Backend errors count as a miss.
    pub async fn get_forward(&self, long_url: &LongUrl) -> Option<ShortCode> {
        match self.backend.get_forward(long_url).await {
            Ok(Some(code)) => {
                debug!(long_url = %long_url, code = %code, "forward cache hit");
                Some(code)
            }
            Ok(None) => {
                trace!(long_url = %long_url, "forward cache miss");
                None
            }
            Err(e) => {
                warn!(long_url = %long_url, error = %e, "forward cache lookup failed, treating as miss");
                None
            }
        }
    }

    /// Looks up the long URL for `code`. Backend errors count as a miss.
    pub async fn get_backward(&self, code: &ShortCode) -> Option<LongUrl> {
        match self.backend.get_backward(code).await {
            Ok(Some(long_url)) => {
                debug!(code = %code, long_url = %long_url, "backward cache hit");
                Some(long_url)
            }
            Ok(None) => {
                trace!(code = %code, "backward cache miss");
                None
            }
            Err(e) => {
                warn!(code = %code, error = %e, "backward cache lookup failed, treating as miss");
                None
            }
        }
    }

    /// Caches both directions of a mapping.
    ///
    /// The forward and backward entries are independent keys, so only one
    /// of the two writes may succeed. Both writes are always attempted; if
    /// either fails the error names which, and the cache may be asymmetric
    /// until a later backfill repairs it.
    pub async fn put_mapping(
        &self,
        long_url: &LongUrl,
        code: &ShortCode,
    ) -> Result<(), PartialCacheWriteError> {
        let (forward, backward) = tokio::join!(
            self.backend.set_forward(long_url, code),
            self.backend.set_backward(code, long_url),
        );

        match (forward.err(), backward.err()) {
            (None, None) => {
                trace!(long_url = %long_url, code = %code, "cached mapping");
                Ok(())
            }
            (forward, backward) => Err(PartialCacheWriteError { forward, backward }),
        }
    }

    /// Checks that the backend is reachable.
    pub async fn ping(&self) -> Result<(), CacheError> {
        self.backend.ping().await
    }
}
