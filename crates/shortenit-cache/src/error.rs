pub use shortenit_core::{CacheError, PartialCacheWriteError};

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;
