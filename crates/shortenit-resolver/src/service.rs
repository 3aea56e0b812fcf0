use async_trait::async_trait;
use shortenit_cache::CacheLayer;
use shortenit_core::{
    Deadline, DependencyError, InsertOutcome, LongUrl, MappingCache, Repository, ResolveError,
    Resolver, ShortCode,
};
use shortenit_generator::Generator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

type Result<T> = std::result::Result<T, ResolveError>;

/// Upper bound on a single cache read or backfill.
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(250);

/// Resolves long URLs to short codes and back.
///
/// The cache is consulted first in both directions and repaired from the
/// persistent store on a miss. A forward miss in both places mints a new
/// code and commits it with a conditional insert; when two callers race on
/// the same long URL, the store picks the winner and the loser's code is
/// dropped.
///
/// Every dependency call is bounded by the caller's [`Deadline`]. Cache
/// calls get a [slice](Deadline::slice) of it capped by the cache timeout,
/// so a stalled cache never starves the store. Nothing is retried here.
pub struct ResolverService<R, C, G> {
    repository: Arc<R>,
    cache: Arc<CacheLayer<C>>,
    generator: Arc<G>,
    cache_timeout: Duration,
}

impl<R, C, G> Clone for ResolverService<R, C, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            generator: Arc::clone(&self.generator),
            cache_timeout: self.cache_timeout,
        }
    }
}

impl<R: Repository, C: MappingCache, G: Generator> ResolverService<R, C, G> {
    pub fn new(repository: R, cache: C, generator: G) -> Self {
        Self {
            repository: Arc::new(repository),
            cache: Arc::new(CacheLayer::new(cache)),
            generator: Arc::new(generator),
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }

    pub fn with_cache_timeout(mut self, cache_timeout: Duration) -> Self {
        self.cache_timeout = cache_timeout;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn cache(&self) -> &CacheLayer<C> {
        &self.cache
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    async fn cached_forward(&self, long_url: &LongUrl, deadline: Deadline) -> Option<ShortCode> {
        deadline
            .slice(self.cache_timeout)
            .bound("cache_read", self.cache.get_forward(long_url))
            .await
            .unwrap_or_else(|e| {
                warn!(long_url = %long_url, error = %e, "forward cache lookup abandoned, treating as miss");
                None
            })
    }

    async fn cached_backward(&self, code: &ShortCode, deadline: Deadline) -> Option<LongUrl> {
        deadline
            .slice(self.cache_timeout)
            .bound("cache_read", self.cache.get_backward(code))
            .await
            .unwrap_or_else(|e| {
                warn!(code = %code, error = %e, "backward cache lookup abandoned, treating as miss");
                None
            })
    }

    /// Writes both cache directions. Failures are logged and otherwise
    /// ignored: the store already holds the mapping.
    async fn backfill(&self, long_url: &LongUrl, code: &ShortCode, deadline: Deadline) {
        match deadline
            .slice(self.cache_timeout)
            .bound("cache_backfill", self.cache.put_mapping(long_url, code))
            .await
        {
            Ok(Ok(())) => trace!(long_url = %long_url, code = %code, "backfilled cache"),
            Ok(Err(e)) => {
                warn!(long_url = %long_url, code = %code, error = %e, "cache backfill incomplete")
            }
            Err(e) => {
                warn!(long_url = %long_url, code = %code, error = %e, "cache backfill abandoned")
            }
        }
    }

    async fn create_mapping(&self, long_url: &LongUrl, deadline: Deadline) -> Result<ShortCode> {
        let candidate = deadline.bound("next_code", self.generator.next()).await??;

        let outcome = deadline
            .bound(
                "insert_mapping",
                self.repository.insert_mapping(long_url, &candidate),
            )
            .await??;

        match &outcome {
            InsertOutcome::Inserted(code) => {
                info!(long_url = %long_url, code = %code, "created mapping");
            }
            InsertOutcome::Existing(code) => {
                debug!(
                    long_url = %long_url,
                    code = %code,
                    discarded = %candidate,
                    "lost insert race, using committed code"
                );
            }
        }

        let code = outcome.into_code();
        self.backfill(long_url, &code, deadline).await;
        Ok(code)
    }
}

#[async_trait]
impl<R: Repository, C: MappingCache, G: Generator> Resolver for ResolverService<R, C, G> {
    async fn forward(&self, long_url: &str, deadline: Deadline) -> Result<ShortCode> {
        let long_url = LongUrl::parse(long_url)?;
        trace!(long_url = %long_url, "forward resolution");

        if let Some(code) = self.cached_forward(&long_url, deadline).await {
            return Ok(code);
        }

        let hash = long_url.hash();
        if let Some(code) = deadline
            .bound("fetch_short_code", self.repository.fetch_short_code(&hash))
            .await??
        {
            debug!(long_url = %long_url, code = %code, "found mapping in store");
            self.backfill(&long_url, &code, deadline).await;
            return Ok(code);
        }

        self.create_mapping(&long_url, deadline).await
    }

    async fn backward(&self, code: &str, deadline: Deadline) -> Result<Option<LongUrl>> {
        let code = ShortCode::new(code)?;
        trace!(code = %code, "backward resolution");

        if let Some(long_url) = self.cached_backward(&code, deadline).await {
            return Ok(Some(long_url));
        }

        match deadline
            .bound("fetch_long_url", self.repository.fetch_long_url(&code))
            .await??
        {
            Some(long_url) => {
                debug!(code = %code, long_url = %long_url, "found mapping in store");
                self.backfill(&long_url, &code, deadline).await;
                Ok(Some(long_url))
            }
            None => {
                trace!(code = %code, "short code not found");
                Ok(None)
            }
        }
    }

    async fn health(&self) -> std::result::Result<(), DependencyError> {
        self.cache.ping().await.map_err(DependencyError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortenit_cache::{MemoryCounter, MokaMappingCache};
    use shortenit_core::{
        CacheError, Counter, LongUrlHash, ReadRepository, StorageError, ValidationError,
    };
    use shortenit_generator::CounterGenerator;
    use shortenit_storage::InMemoryRepository;
    use std::collections::HashSet;
    use std::time::Duration;

    type Service<R = InMemoryRepository, C = MokaMappingCache> =
        ResolverService<R, C, CounterGenerator<MemoryCounter>>;

    fn service() -> Service {
        service_with(InMemoryRepository::new(), MokaMappingCache::new())
    }

    fn service_with<R: Repository, C: MappingCache>(repository: R, cache: C) -> Service<R, C> {
        ResolverService::new(
            repository,
            cache,
            CounterGenerator::new(MemoryCounter::new(1)),
        )
    }

    async fn counter_value<R: Repository, C: MappingCache>(service: &Service<R, C>) -> u64 {
        service
            .generator()
            .counter()
            .current()
            .await
            .unwrap()
            .unwrap()
    }

    fn url(s: &str) -> LongUrl {
        LongUrl::parse(s).unwrap()
    }

    /// A cache whose backend is unreachable.
    struct DownCache;

    fn connection_refused() -> CacheError {
        CacheError::Unavailable("connection refused".to_string())
    }

    #[async_trait]
    impl MappingCache for DownCache {
        async fn get_forward(
            &self,
            _: &LongUrl,
        ) -> std::result::Result<Option<ShortCode>, CacheError> {
            Err(connection_refused())
        }

        async fn get_backward(
            &self,
            _: &ShortCode,
        ) -> std::result::Result<Option<LongUrl>, CacheError> {
            Err(connection_refused())
        }

        async fn set_forward(&self, _: &LongUrl, _: &ShortCode) -> std::result::Result<(), CacheError> {
            Err(connection_refused())
        }

        async fn set_backward(&self, _: &ShortCode, _: &LongUrl) -> std::result::Result<(), CacheError> {
            Err(connection_refused())
        }

        async fn ping(&self) -> std::result::Result<(), CacheError> {
            Err(connection_refused())
        }
    }

    /// A cache that never answers reads in time.
    #[derive(Default)]
    struct SlowReadCache {
        inner: MokaMappingCache,
    }

    #[async_trait]
    impl MappingCache for SlowReadCache {
        async fn get_forward(
            &self,
            long_url: &LongUrl,
        ) -> std::result::Result<Option<ShortCode>, CacheError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            self.inner.get_forward(long_url).await
        }

        async fn get_backward(
            &self,
            code: &ShortCode,
        ) -> std::result::Result<Option<LongUrl>, CacheError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            self.inner.get_backward(code).await
        }

        async fn set_forward(
            &self,
            long_url: &LongUrl,
            code: &ShortCode,
        ) -> std::result::Result<(), CacheError> {
            self.inner.set_forward(long_url, code).await
        }

        async fn set_backward(
            &self,
            code: &ShortCode,
            long_url: &LongUrl,
        ) -> std::result::Result<(), CacheError> {
            self.inner.set_backward(code, long_url).await
        }

        async fn ping(&self) -> std::result::Result<(), CacheError> {
            Ok(())
        }
    }

    /// A store that is down.
    struct DownRepository;

    fn pool_closed() -> StorageError {
        StorageError::Unavailable("pool closed".to_string())
    }

    #[async_trait]
    impl ReadRepository for DownRepository {
        async fn fetch_long_url(
            &self,
            _: &ShortCode,
        ) -> std::result::Result<Option<LongUrl>, StorageError> {
            Err(pool_closed())
        }

        async fn fetch_short_code(
            &self,
            _: &LongUrlHash,
        ) -> std::result::Result<Option<ShortCode>, StorageError> {
            Err(pool_closed())
        }
    }

    #[async_trait]
    impl Repository for DownRepository {
        async fn insert_mapping(
            &self,
            _: &LongUrl,
            _: &ShortCode,
        ) -> std::result::Result<InsertOutcome, StorageError> {
            Err(pool_closed())
        }
    }

    /// A store that takes `latency` to answer every call.
    struct SlowRepository {
        inner: InMemoryRepository,
        latency: Duration,
    }

    impl SlowRepository {
        fn new(latency: Duration) -> Self {
            Self {
                inner: InMemoryRepository::new(),
                latency,
            }
        }
    }

    #[async_trait]
    impl ReadRepository for SlowRepository {
        async fn fetch_long_url(
            &self,
            code: &ShortCode,
        ) -> std::result::Result<Option<LongUrl>, StorageError> {
            tokio::time::sleep(self.latency).await;
            self.inner.fetch_long_url(code).await
        }

        async fn fetch_short_code(
            &self,
            hash: &LongUrlHash,
        ) -> std::result::Result<Option<ShortCode>, StorageError> {
            tokio::time::sleep(self.latency).await;
            self.inner.fetch_short_code(hash).await
        }
    }

    #[async_trait]
    impl Repository for SlowRepository {
        async fn insert_mapping(
            &self,
            long_url: &LongUrl,
            code: &ShortCode,
        ) -> std::result::Result<InsertOutcome, StorageError> {
            tokio::time::sleep(self.latency).await;
            self.inner.insert_mapping(long_url, code).await
        }
    }

    /// A store whose hash lookups never see committed rows, as if another
    /// writer always commits between the lookup and the insert.
    #[derive(Default)]
    struct RacingRepository {
        inner: InMemoryRepository,
    }

    #[async_trait]
    impl ReadRepository for RacingRepository {
        async fn fetch_long_url(
            &self,
            code: &ShortCode,
        ) -> std::result::Result<Option<LongUrl>, StorageError> {
            self.inner.fetch_long_url(code).await
        }

        async fn fetch_short_code(
            &self,
            _: &LongUrlHash,
        ) -> std::result::Result<Option<ShortCode>, StorageError> {
            Ok(None)
        }
    }

    #[async_trait]
    impl Repository for RacingRepository {
        async fn insert_mapping(
            &self,
            long_url: &LongUrl,
            code: &ShortCode,
        ) -> std::result::Result<InsertOutcome, StorageError> {
            self.inner.insert_mapping(long_url, code).await
        }
    }

    #[tokio::test]
    async fn first_forward_uses_the_next_counter_value() {
        let service = service();

        let code = service
            .forward("https://example.com/a", Deadline::none())
            .await
            .unwrap();

        assert_eq!(code.as_str(), "2");
        assert_eq!(counter_value(&service).await, 2);
    }

    #[tokio::test]
    async fn forward_is_idempotent_without_spending_codes() {
        let service = service();

        let first = service
            .forward("https://example.com/a", Deadline::none())
            .await
            .unwrap();
        let second = service
            .forward("https://example.com/a", Deadline::none())
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.as_str(), "2");
        assert_eq!(counter_value(&service).await, 2);
    }

    #[tokio::test]
    async fn distinct_urls_get_distinct_codes() {
        let service = service();

        let a = service
            .forward("https://example.com/a", Deadline::none())
            .await
            .unwrap();
        let b = service
            .forward("https://example.com/b", Deadline::none())
            .await
            .unwrap();

        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn backward_inverts_forward() {
        let service = service();

        for raw in [
            "https://example.com/a",
            "http://example.org/path?q=1&r=2#top",
            "https://example.com:8443/%E2%9C%93",
        ] {
            let code = service.forward(raw, Deadline::none()).await.unwrap();
            let long_url = service
                .backward(code.as_str(), Deadline::none())
                .await
                .unwrap();
            assert_eq!(long_url, Some(url(raw)));
        }
    }

    #[tokio::test]
    async fn invalid_long_urls_are_rejected_before_any_mutation() {
        let service = service();

        let err = service.forward("", Deadline::none()).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Validation(ValidationError::EmptyLongUrl)
        ));

        for raw in ["not-a-url", "http:example.com", "https:///example.com"] {
            let err = service.forward(raw, Deadline::none()).await.unwrap_err();
            assert!(
                matches!(
                    err,
                    ResolveError::Validation(ValidationError::InvalidLongUrl(_))
                ),
                "{raw}"
            );
        }

        assert!(service.repository().is_empty());
        assert_eq!(counter_value(&service).await, 1);
    }

    #[tokio::test]
    async fn invalid_short_code_is_a_validation_error() {
        let service = service();

        let err = service.backward("a-b", Deadline::none()).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Validation(ValidationError::InvalidShortCode(_))
        ));
    }

    #[tokio::test]
    async fn unknown_short_code_is_not_found() {
        let service = service();

        let long_url = service
            .backward("doesnotexist", Deadline::none())
            .await
            .unwrap();

        assert_eq!(long_url, None);
    }

    #[tokio::test]
    async fn store_hits_are_backfilled_into_the_cache() {
        let service = service();
        let (u, c) = (url("https://example.com/a"), ShortCode::encode(99));
        service.repository().insert_mapping(&u, &c).await.unwrap();

        let long_url = service.backward(c.as_str(), Deadline::none()).await.unwrap();
        assert_eq!(long_url, Some(u.clone()));
        assert_eq!(service.cache().get_forward(&u).await, Some(c.clone()));
        assert_eq!(service.cache().get_backward(&c).await, Some(u.clone()));

        let code = service.forward(u.as_str(), Deadline::none()).await.unwrap();
        assert_eq!(code, c);
        assert_eq!(counter_value(&service).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_forwards_of_a_new_url_agree() {
        let service = service();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .forward("https://example.com/contended", Deadline::none())
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut codes = HashSet::new();
        for handle in handles {
            codes.insert(handle.await.unwrap());
        }

        assert_eq!(codes.len(), 1);
        assert_eq!(service.repository().len(), 1);
    }

    #[tokio::test]
    async fn lost_insert_race_returns_the_winning_code() {
        let repository = RacingRepository::default();
        let u = url("https://example.com/a");
        let winner = ShortCode::new("abc").unwrap();
        repository.inner.insert_mapping(&u, &winner).await.unwrap();
        let service = service_with(repository, MokaMappingCache::new());

        let code = service.forward(u.as_str(), Deadline::none()).await.unwrap();

        assert_eq!(code, winner);
        // The minted candidate is spent but never committed.
        assert_eq!(counter_value(&service).await, 2);
        assert_eq!(
            service
                .repository()
                .fetch_long_url(&ShortCode::encode(2))
                .await
                .unwrap(),
            None
        );
        assert_eq!(service.cache().get_backward(&winner).await, Some(u));
    }

    #[tokio::test]
    async fn unreachable_cache_falls_through_to_the_store() {
        let service = service_with(InMemoryRepository::new(), DownCache);

        let first = service
            .forward("https://example.com/a", Deadline::none())
            .await
            .unwrap();
        let second = service
            .forward("https://example.com/a", Deadline::none())
            .await
            .unwrap();
        let long_url = service
            .backward(first.as_str(), Deadline::none())
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(long_url, Some(url("https://example.com/a")));
        assert_eq!(counter_value(&service).await, 2);
    }

    #[tokio::test]
    async fn unreachable_store_is_a_dependency_error() {
        let service = service_with(DownRepository, MokaMappingCache::new());

        let err = service
            .forward("https://example.com/a", Deadline::none())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Dependency(DependencyError::Storage(StorageError::Unavailable(_)))
        ));

        let err = service.backward("2", Deadline::none()).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Dependency(DependencyError::Storage(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_store_exceeds_the_deadline() {
        let service = service_with(
            SlowRepository::new(Duration::from_secs(60)),
            MokaMappingCache::new(),
        );

        let err = service
            .forward(
                "https://example.com/a",
                Deadline::after(Duration::from_millis(100)),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::Dependency(DependencyError::DeadlineExceeded {
                operation: "fetch_short_code"
            })
        ));
        assert_eq!(counter_value(&service).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_cache_read_counts_as_a_miss() {
        let service = service_with(InMemoryRepository::new(), SlowReadCache::default());
        let (u, c) = (url("https://example.com/a"), ShortCode::encode(7));
        service.repository().insert_mapping(&u, &c).await.unwrap();

        let long_url = service
            .backward(c.as_str(), Deadline::after(Duration::from_millis(100)))
            .await
            .unwrap();

        assert_eq!(long_url, Some(u));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_cache_leaves_time_for_the_store() {
        let service = service_with(
            SlowRepository::new(Duration::from_millis(1)),
            SlowReadCache::default(),
        );
        let deadline = || Deadline::after(Duration::from_millis(100));

        let code = service
            .forward("https://example.com/a", deadline())
            .await
            .unwrap();
        assert_eq!(code.as_str(), "2");

        let long_url = service.backward("2", deadline()).await.unwrap();
        assert_eq!(long_url, Some(url("https://example.com/a")));

        let missing = service.backward("3", deadline()).await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cache_timeout_bounds_unbounded_requests() {
        let service = service_with(InMemoryRepository::new(), SlowReadCache::default())
            .with_cache_timeout(Duration::from_millis(20));
        let started = tokio::time::Instant::now();

        let code = service
            .forward("https://example.com/a", Deadline::none())
            .await
            .unwrap();

        assert_eq!(code.as_str(), "2");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn health_reflects_the_cache() {
        assert!(service().health().await.is_ok());

        let err = service_with(InMemoryRepository::new(), DownCache)
            .health()
            .await
            .unwrap_err();
        assert!(matches!(err, DependencyError::Cache(CacheError::Unavailable(_))));
    }
}
