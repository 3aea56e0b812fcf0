use crate::deadline::Deadline;
use crate::error::{DependencyError, ResolveError};
use crate::long_url::LongUrl;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, ResolveError>;

#[async_trait]
pub trait Resolver: Send + Sync + 'static {
    /// Returns the short code for `long_url`, minting one on first sight.
    ///
    /// Idempotent: the same long URL always yields the same code.
    async fn forward(&self, long_url: &str, deadline: Deadline) -> Result<ShortCode>;

    /// Returns the long URL behind `code`, or `None` if no mapping exists.
    async fn backward(&self, code: &str, deadline: Deadline) -> Result<Option<LongUrl>>;

    /// Checks that the cache backend is reachable.
    async fn health(&self) -> std::result::Result<(), DependencyError>;
}
