use async_trait::async_trait;
use shortenit_core::{CacheError, Counter, ShortCode};
use tracing::trace;

/// Trait for minting short codes.
///
/// Every call must yield a code no other call (in any process) has
/// received. A code that is minted but never committed is simply lost.
#[async_trait]
pub trait Generator: Send + Sync + 'static {
    /// Mints the next short code.
    async fn next(&self) -> Result<ShortCode, CacheError>;
}

/// Mints codes by incrementing a shared [`Counter`] and base62-encoding
/// the new value.
///
/// Uniqueness comes entirely from the counter's atomic increment; this type
/// holds no state of its own and is safe to share across tasks.
#[derive(Debug, Clone)]
pub struct CounterGenerator<C> {
    counter: C,
}

impl<C: Counter> CounterGenerator<C> {
    pub fn new(counter: C) -> Self {
        Self { counter }
    }

    pub fn counter(&self) -> &C {
        &self.counter
    }
}

#[async_trait]
impl<C: Counter> Generator for CounterGenerator<C> {
    async fn next(&self) -> Result<ShortCode, CacheError> {
        let value = self.counter.increment().await?;
        let code = ShortCode::encode(value);
        trace!(value, code = %code, "minted short code");
        Ok(code)
    }
}
