use crate::error::StorageError;
use crate::long_url::{LongUrl, LongUrlHash};
use crate::shortcode::ShortCode;
use async_trait::async_trait;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// What a conditional insert did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// This caller committed the mapping; the candidate code is final.
    Inserted(ShortCode),
    /// Another writer had already committed a code for this long URL. The
    /// caller's candidate was not written; this is the winning code.
    Existing(ShortCode),
}

impl InsertOutcome {
    /// The code that is now durably mapped to the long URL.
    pub fn code(&self) -> &ShortCode {
        match self {
            Self::Inserted(code) | Self::Existing(code) => code,
        }
    }

    pub fn into_code(self) -> ShortCode {
        match self {
            Self::Inserted(code) | Self::Existing(code) => code,
        }
    }
}

/// A read-only view of the persistent store.
///
/// Absence is a normal result (`Ok(None)`), never an error.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Point lookup on the code index.
    async fn fetch_long_url(&self, code: &ShortCode) -> Result<Option<LongUrl>>;

    /// Point lookup on the long URL hash index.
    async fn fetch_short_code(&self, hash: &LongUrlHash) -> Result<Option<ShortCode>>;
}

/// The durable, dual-indexed source of truth for mappings.
#[async_trait]
pub trait Repository: ReadRepository {
    /// Writes both index rows for `long_url -> code`, unless a row for the
    /// same long URL hash is already committed.
    ///
    /// Keyed on the hash of `long_url`: an existing row is never
    /// overwritten, and its code is returned as
    /// [`InsertOutcome::Existing`]. Either both rows become visible or
    /// neither does.
    async fn insert_mapping(&self, long_url: &LongUrl, code: &ShortCode) -> Result<InsertOutcome>;
}
