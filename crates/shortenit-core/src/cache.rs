use crate::error::CacheError;
use crate::long_url::LongUrl;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, CacheError>;

/// A volatile key/value backend holding both directions of every mapping.
///
/// The two key spaces (forward: long URL -> code, backward: code -> long
/// URL) are independent; no implementation offers a transaction across
/// them. Entries never expire: mappings are immutable, so a cached entry
/// can only ever be missing, never stale.
#[async_trait]
pub trait MappingCache: Send + Sync + 'static {
    /// Looks up the short code cached for `long_url`.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get_forward(&self, long_url: &LongUrl) -> Result<Option<ShortCode>>;

    /// Looks up the long URL cached for `code`.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get_backward(&self, code: &ShortCode) -> Result<Option<LongUrl>>;

    /// Stores the forward entry `long_url -> code`.
    async fn set_forward(&self, long_url: &LongUrl, code: &ShortCode) -> Result<()>;

    /// Stores the backward entry `code -> long_url`.
    async fn set_backward(&self, code: &ShortCode, long_url: &LongUrl) -> Result<()>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<()>;
}
