use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shortenit_core::{
    InsertOutcome, LongUrl, LongUrlHash, Mapping, ReadRepository, Repository, ShortCode,
    StorageError,
};
use std::sync::Arc;
use tracing::debug;

use crate::Result;

/// An in-process repository with the same conditional-insert semantics as
/// [`MySqlRepository`](crate::MySqlRepository).
///
/// Writers lock the hash entry before the code entry, so an insert either
/// commits both rows or neither, and two writers racing on the same long
/// URL serialize on the hash entry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    by_hash: Arc<DashMap<LongUrlHash, ShortCode>>,
    by_code: Arc<DashMap<ShortCode, Mapping>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed mappings.
    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn fetch_long_url(&self, code: &ShortCode) -> Result<Option<LongUrl>> {
        Ok(self.by_code.get(code).map(|row| row.long_url.clone()))
    }

    async fn fetch_short_code(&self, hash: &LongUrlHash) -> Result<Option<ShortCode>> {
        Ok(self.by_hash.get(hash).map(|row| row.value().clone()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert_mapping(&self, long_url: &LongUrl, code: &ShortCode) -> Result<InsertOutcome> {
        let hash = long_url.hash();

        let slot = match self.by_hash.entry(hash) {
            Entry::Occupied(existing) => {
                debug!(long_url = %long_url, code = %existing.get(), "mapping already committed");
                return Ok(InsertOutcome::Existing(existing.get().clone()));
            }
            Entry::Vacant(slot) => slot,
        };

        match self.by_code.entry(code.clone()) {
            Entry::Occupied(_) => {
                return Err(StorageError::Operation(format!(
                    "short code '{code}' is already assigned to another long URL"
                )))
            }
            Entry::Vacant(row) => {
                row.insert(Mapping::new(long_url.clone(), code.clone()));
            }
        }
        slot.insert(code.clone());

        debug!(long_url = %long_url, code = %code, "inserted mapping");
        Ok(InsertOutcome::Inserted(code.clone()))
    }
}
