use thiserror::Error;

/// Malformed caller input. Terminal, never worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("long_url is required")]
    EmptyLongUrl,
    #[error("long_url exceeds {max} bytes (got {actual})")]
    LongUrlTooLong { max: usize, actual: usize },
    #[error("invalid long_url: {0}")]
    InvalidLongUrl(String),
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache serialization failed: {0}")]
    Serialization(String),
    #[error("cache value is invalid: {0}")]
    InvalidData(String),
    #[error("cache initialization failed: {0}")]
    Initialization(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

/// One or both directions of a mapping failed to reach the cache.
///
/// The forward and backward entries are separate keys with no transaction
/// spanning them, so after this error the cache may hold only one of them.
/// The durable mapping is unaffected.
#[derive(Debug, Clone, Error)]
#[error("partial cache write (forward: {}, backward: {})", describe(.forward), describe(.backward))]
pub struct PartialCacheWriteError {
    pub forward: Option<CacheError>,
    pub backward: Option<CacheError>,
}

fn describe(outcome: &Option<CacheError>) -> String {
    match outcome {
        Some(err) => err.to_string(),
        None => "ok".to_string(),
    }
}

impl PartialCacheWriteError {
    /// Returns `true` when neither direction was written.
    pub fn is_total(&self) -> bool {
        self.forward.is_some() && self.backward.is_some()
    }
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// A cache, counter or store call failed or ran out of time.
///
/// Safe for the caller to retry; the resolver never retries on its own.
#[derive(Debug, Clone, Error)]
pub enum DependencyError {
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("{operation} exceeded the request deadline")]
    DeadlineExceeded { operation: &'static str },
}

/// Errors returned by [`Resolver`](crate::Resolver) operations.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Dependency(#[from] DependencyError),
}

impl From<CacheError> for ResolveError {
    fn from(value: CacheError) -> Self {
        Self::Dependency(DependencyError::Cache(value))
    }
}

impl From<StorageError> for ResolveError {
    fn from(value: StorageError) -> Self {
        Self::Dependency(DependencyError::Storage(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_write_reports_each_direction() {
        let err = PartialCacheWriteError {
            forward: None,
            backward: Some(CacheError::Timeout("SET backward:2".to_string())),
        };

        assert!(!err.is_total());
        assert_eq!(
            err.to_string(),
            "partial cache write (forward: ok, backward: cache operation timed out: SET backward:2)"
        );
    }

    #[test]
    fn storage_error_converts_into_dependency_failure() {
        let err: ResolveError = StorageError::Unavailable("pool closed".to_string()).into();
        assert!(matches!(
            err,
            ResolveError::Dependency(DependencyError::Storage(StorageError::Unavailable(_)))
        ));
    }
}
