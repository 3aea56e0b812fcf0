use async_trait::async_trait;
use shortenit_core::{CacheError, Counter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// An in-process [`Counter`] backed by an atomic integer.
///
/// Only unique within one process: clones share the same value, separate
/// instances do not. Use [`RedisCounter`](crate::RedisCounter) when more
/// than one process mints codes.
#[derive(Debug, Clone)]
pub struct MemoryCounter {
    value: Arc<AtomicU64>,
}

impl MemoryCounter {
    /// Creates a counter seeded with `initial`.
    pub fn new(initial: u64) -> Self {
        Self {
            value: Arc::new(AtomicU64::new(initial)),
        }
    }
}

#[async_trait]
impl Counter for MemoryCounter {
    async fn seed(&self) -> Result<u64, CacheError> {
        Ok(self.value.load(Ordering::SeqCst))
    }

    async fn increment(&self) -> Result<u64, CacheError> {
        self.value
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_add(1))
            .map(|previous| previous + 1)
            .map_err(|_| CacheError::Operation("counter exhausted".to_string()))
    }

    async fn current(&self) -> Result<Option<u64>, CacheError> {
        Ok(Some(self.value.load(Ordering::SeqCst)))
    }
}
