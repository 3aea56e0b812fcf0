//! Core types and traits for the shorten.it resolution engine.
//!
//! This crate holds the domain types shared by every other crate (validated
//! long URLs, short codes, their digests), the base62 codec, the error
//! taxonomy, and the traits the resolver is written against: the cache,
//! the counter, the persistent repository and the resolver itself.

pub mod base62;
pub mod cache;
pub mod counter;
pub mod deadline;
pub mod error;
pub mod long_url;
pub mod mapping;
pub mod repository;
pub mod resolver;
pub mod shortcode;

pub use cache::MappingCache;
pub use counter::Counter;
pub use deadline::Deadline;
pub use error::{
    CacheError, DependencyError, PartialCacheWriteError, ResolveError, StorageError,
    ValidationError,
};
pub use long_url::{LongUrl, LongUrlHash};
pub use mapping::Mapping;
pub use repository::{InsertOutcome, ReadRepository, Repository};
pub use resolver::Resolver;
pub use shortcode::ShortCode;
