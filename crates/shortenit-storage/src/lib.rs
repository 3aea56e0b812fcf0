//! Persistent storage for long URL <-> short code mappings.
//!
//! Two backends implement [`Repository`]: [`MySqlRepository`] for
//! production and [`InMemoryRepository`] for local runs and tests.

pub mod error;
pub mod memory;
pub mod mysql;

pub use error::{Result, StorageError};
pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
pub use shortenit_core::{InsertOutcome, ReadRepository, Repository};
