use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use shortenit_core::{CacheError, Counter, LongUrl, MappingCache, ShortCode};
use tracing::{debug, info, trace, warn};
use typed_builder::TypedBuilder;

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Key layout shared by [`RedisMappingCache`] and [`RedisCounter`].
///
/// Defaults: `forward:<long url>`, `backward:<code>`, `currentCount`.
#[derive(Debug, Clone, TypedBuilder)]
pub struct KeySpace {
    #[builder(default = "forward:".to_string(), setter(into))]
    forward_prefix: String,
    #[builder(default = "backward:".to_string(), setter(into))]
    backward_prefix: String,
    #[builder(default = "currentCount".to_string(), setter(into))]
    counter_key: String,
}

impl KeySpace {
    /// The default layout with `namespace` prepended to every key.
    pub fn namespaced(namespace: &str) -> Self {
        Self::builder()
            .forward_prefix(format!("{namespace}forward:"))
            .backward_prefix(format!("{namespace}backward:"))
            .counter_key(format!("{namespace}currentCount"))
            .build()
    }

    pub fn forward_key(&self, long_url: &LongUrl) -> String {
        format!("{}{}", self.forward_prefix, long_url.as_str())
    }

    pub fn backward_key(&self, code: &ShortCode) -> String {
        format!("{}{}", self.backward_prefix, code.as_str())
    }

    pub fn counter_key(&self) -> &str {
        &self.counter_key
    }
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        CacheError::Timeout(message)
    } else if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

/// A Redis-based implementation of [`MappingCache`].
///
/// Both directions are plain string keys with no expiry. The multiplexed
/// connection is cheap to clone; every call clones it.
#[derive(Debug, Clone)]
pub struct RedisMappingCache {
    conn: MultiplexedConnection,
    keys: KeySpace,
}

impl RedisMappingCache {
    /// Creates a new Redis mapping cache with the default key layout.
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self::with_keys(conn, KeySpace::default())
    }

    /// Creates a new Redis mapping cache with a custom key layout.
    pub fn with_keys(conn: MultiplexedConnection, keys: KeySpace) -> Self {
        Self { conn, keys }
    }

    /// Opens a multiplexed connection to `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<MultiplexedConnection> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::Initialization(format!("invalid redis url: {e}")))?;
        client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }
}

#[async_trait]
impl MappingCache for RedisMappingCache {
    async fn get_forward(&self, long_url: &LongUrl) -> Result<Option<ShortCode>> {
        let key = self.keys.forward_key(long_url);
        trace!(long_url = %long_url, "Fetching forward entry from Redis");

        let mut conn = self.conn.clone();
        let cached: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| map_redis_error("failed to fetch forward entry from Redis", e))?;

        match cached {
            Some(code) => ShortCode::new(code).map(Some).map_err(|e| {
                warn!(long_url = %long_url, error = %e, "Invalid code cached in Redis");
                CacheError::InvalidData(format!("invalid cached value for key '{key}': {e}"))
            }),
            None => Ok(None),
        }
    }

    async fn get_backward(&self, code: &ShortCode) -> Result<Option<LongUrl>> {
        let key = self.keys.backward_key(code);
        trace!(code = %code, "Fetching backward entry from Redis");

        let mut conn = self.conn.clone();
        let cached: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| map_redis_error("failed to fetch backward entry from Redis", e))?;

        match cached {
            Some(long_url) => LongUrl::parse(long_url).map(Some).map_err(|e| {
                warn!(code = %code, error = %e, "Invalid long URL cached in Redis");
                CacheError::InvalidData(format!("invalid cached value for key '{key}': {e}"))
            }),
            None => Ok(None),
        }
    }

    async fn set_forward(&self, long_url: &LongUrl, code: &ShortCode) -> Result<()> {
        let key = self.keys.forward_key(long_url);

        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(&key, code.as_str())
            .await
            .map_err(|e| map_redis_error("failed to write forward entry to Redis", e))?;
        debug!(long_url = %long_url, code = %code, "Cached forward entry in Redis");
        Ok(())
    }

    async fn set_backward(&self, code: &ShortCode, long_url: &LongUrl) -> Result<()> {
        let key = self.keys.backward_key(code);

        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(&key, long_url.as_str())
            .await
            .map_err(|e| map_redis_error("failed to write backward entry to Redis", e))?;
        debug!(code = %code, long_url = %long_url, "Cached backward entry in Redis");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| map_redis_error("failed to ping Redis", e))
    }
}

/// A [`Counter`] stored under a single Redis key and advanced with `INCR`.
///
/// Every increment runs `SET NX <initial>` and `INCR` in one `MULTI`
/// block, so any number of processes sharing the key get distinct values,
/// and a key lost to a flush or a restart is re-seeded instead of counting
/// up from zero.
#[derive(Debug, Clone)]
pub struct RedisCounter {
    conn: MultiplexedConnection,
    key: String,
    initial: u64,
}

impl RedisCounter {
    pub fn new(conn: MultiplexedConnection, keys: &KeySpace, initial: u64) -> Self {
        Self {
            conn,
            key: keys.counter_key().to_string(),
            initial,
        }
    }
}

#[async_trait]
impl Counter for RedisCounter {
    async fn seed(&self) -> Result<u64> {
        let mut conn = self.conn.clone();
        let created: bool = conn
            .set_nx(&self.key, self.initial)
            .await
            .map_err(|e| map_redis_error("failed to seed counter in Redis", e))?;

        let current = self.current().await?.ok_or_else(|| {
            CacheError::InvalidData(format!("counter key '{}' vanished after seeding", self.key))
        })?;

        if created {
            info!(key = %self.key, value = current, "Seeded counter");
        } else {
            debug!(key = %self.key, value = current, "Counter already present");
        }
        Ok(current)
    }

    async fn increment(&self) -> Result<u64> {
        let mut conn = self.conn.clone();
        let (value,): (u64,) = redis::pipe()
            .atomic()
            .set_nx(&self.key, self.initial)
            .ignore()
            .incr(&self.key, 1_u64)
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to increment counter in Redis", e))?;
        trace!(key = %self.key, value, "Incremented counter");
        Ok(value)
    }

    async fn current(&self) -> Result<Option<u64>> {
        let mut conn = self.conn.clone();
        conn.get(&self.key)
            .await
            .map_err(|e| map_redis_error("failed to read counter from Redis", e))
    }
}
