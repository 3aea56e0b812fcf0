use clap::{Parser, ValueEnum};
use shortenit_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "SHORTENIT_LISTEN_ADDR";
pub const CACHE_BACKEND_ENV: &str = "SHORTENIT_CACHE_BACKEND";
pub const REDIS_URL_ENV: &str = "SHORTENIT_REDIS_URL";
pub const REDIS_KEY_PREFIX_ENV: &str = "SHORTENIT_REDIS_KEY_PREFIX";
pub const STORAGE_BACKEND_ENV: &str = "SHORTENIT_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "SHORTENIT_MYSQL_DSN";
pub const COUNTER_INIT_ENV: &str = "SHORTENIT_COUNTER_INIT";
pub const REQUEST_TIMEOUT_MS_ENV: &str = "SHORTENIT_REQUEST_TIMEOUT_MS";
pub const CACHE_TIMEOUT_MS_ENV: &str = "SHORTENIT_CACHE_TIMEOUT_MS";
pub const LOG_FORMAT_ENV: &str = "SHORTENIT_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "SHORTENIT_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_COUNTER_INIT: u64 = 1;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_CACHE_TIMEOUT_MS: u64 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redis")]
    Redis,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::InMemory => write!(f, "in-memory"),
            CacheBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "shortenit", about = "URL shortener HTTP gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Backend for the mapping cache and the code counter.
    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::InMemory
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("cache", "redis"))]
    pub redis_url: Option<String>,

    /// Prepended to every Redis key.
    #[arg(long, env = REDIS_KEY_PREFIX_ENV, default_value = "")]
    pub redis_key_prefix: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// Counter value written when the counter does not exist yet.
    #[arg(long, env = COUNTER_INIT_ENV, default_value_t = DEFAULT_COUNTER_INIT)]
    pub counter_init: u64,

    /// Per-request budget for cache and store calls; 0 disables it.
    #[arg(long, env = REQUEST_TIMEOUT_MS_ENV, default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: u64,

    /// Budget for a single cache read or backfill, never more than half of
    /// what is left of the request budget.
    #[arg(long, env = CACHE_TIMEOUT_MS_ENV, default_value_t = DEFAULT_CACHE_TIMEOUT_MS)]
    pub cache_timeout_ms: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

impl CLI {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }
}
