use crate::error::CacheError;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, CacheError>;

/// The process-wide, monotonically increasing integer behind every
/// generated short code.
///
/// This is the only way the counter is mutated. Implementations must make
/// [`increment`](Counter::increment) linearizable across every process
/// sharing the counter, so each returned value is handed out at most once.
/// The counter is never decremented or reset.
#[async_trait]
pub trait Counter: Send + Sync + 'static {
    /// Stores the initial value if the counter does not exist yet.
    ///
    /// Returns the value the counter holds afterwards. Calling this on an
    /// existing counter leaves it untouched.
    async fn seed(&self) -> Result<u64>;

    /// Atomically increments the counter and returns the new value,
    /// seeding it first if absent.
    ///
    /// Either the increment happened and is visible to every later caller,
    /// or it did not happen at all.
    async fn increment(&self) -> Result<u64>;

    /// Reads the current value without changing it.
    ///
    /// Returns `Ok(None)` if the counter has not been seeded.
    async fn current(&self) -> Result<Option<u64>>;
}
