//! Cache backends and the fail-open cache layer used by the resolver.
//!
//! The cache is a derived, rebuildable projection of the persistent store:
//! it holds both directions of every mapping it has seen plus the shared
//! code counter. Losing an entry only costs a trip to the store.

pub mod counter;
pub mod error;
pub mod layer;
pub mod moka;
pub mod redis;

pub use counter::MemoryCounter;
pub use error::{CacheError, PartialCacheWriteError, Result};
pub use layer::CacheLayer;
pub use self::moka::MokaMappingCache;
pub use self::redis::{KeySpace, RedisCounter, RedisMappingCache};
