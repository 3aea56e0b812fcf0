//! Forward and backward resolution over a cache, a code generator and a
//! persistent store.
//!
//! [`ResolverService`] is the only implementation of
//! [`Resolver`](shortenit_core::Resolver). It can be assembled from any
//! combination of backends:
//!
//! ```rust
//! use shortenit_cache::{MemoryCounter, MokaMappingCache};
//! use shortenit_core::{Deadline, Resolver};
//! use shortenit_generator::CounterGenerator;
//! use shortenit_resolver::ResolverService;
//! use shortenit_storage::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = ResolverService::new(
//!     InMemoryRepository::new(),
//!     MokaMappingCache::new(),
//!     CounterGenerator::new(MemoryCounter::new(1)),
//! );
//!
//! let code = resolver
//!     .forward("https://example.com/a", Deadline::none())
//!     .await?;
//! assert_eq!(code.as_str(), "2");
//! # Ok(())
//! # }
//! ```

pub mod service;

pub use service::{ResolverService, DEFAULT_CACHE_TIMEOUT};
