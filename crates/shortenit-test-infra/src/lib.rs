//! Disposable Redis and MySQL containers for integration tests.
//!
//! Each fixture owns its container; dropping the fixture stops it. The
//! connection helpers retry until the server accepts clients, so tests
//! never need to sleep after start-up.

pub mod error;
pub mod mysql;
pub mod redis;

pub use error::{Result, TestInfraError};

use std::time::Duration;

const READY_ATTEMPTS: u32 = 30;
const READY_BACKOFF: Duration = Duration::from_millis(500);
