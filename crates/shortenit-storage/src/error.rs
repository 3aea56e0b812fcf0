pub use shortenit_core::StorageError;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;
