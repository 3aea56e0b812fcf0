mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use shortenit_cache::{KeySpace, MemoryCounter, MokaMappingCache, RedisCounter, RedisMappingCache};
use shortenit_core::{Counter, MappingCache, Resolver};
use shortenit_gateway::{App, AppState};
use shortenit_generator::CounterGenerator;
use shortenit_resolver::ResolverService;
use shortenit_storage::{InMemoryRepository, MySqlRepository};
use shortenit_telemetry::TelemetryConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cli::{CacheBackendArg, StorageBackendArg, CLI};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("failed to load .env file");
        }
    }

    let config = CLI::parse();

    let _telemetry = shortenit_telemetry::init(
        TelemetryConfig::builder()
            .service_name("shortenit")
            .format(config.log_format)
            .otlp_endpoint(config.otlp_endpoint.clone())
            .build(),
    )?;

    info!(
        listen_addr = %config.listen_addr,
        cache_backend = %config.cache,
        storage_backend = %config.storage,
        request_timeout_ms = config.request_timeout_ms,
        "starting shortenit gateway"
    );

    let resolver = match config.cache {
        CacheBackendArg::InMemory => {
            build_resolver(
                &config,
                MokaMappingCache::new(),
                MemoryCounter::new(config.counter_init),
            )
            .await?
        }
        CacheBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .context("redis url is required when cache backend is redis")?;
            let conn = RedisMappingCache::connect(redis_url).await?;
            let keys = KeySpace::namespaced(&config.redis_key_prefix);
            let counter = RedisCounter::new(conn.clone(), &keys, config.counter_init);
            build_resolver(&config, RedisMappingCache::with_keys(conn, keys), counter).await?
        }
    };

    let state = AppState::new(resolver).with_request_timeout(config.request_timeout());

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

/// Checks the cache, seeds the counter and opens the configured store.
async fn build_resolver<C, N>(
    config: &CLI,
    cache: C,
    counter: N,
) -> anyhow::Result<Arc<dyn Resolver>>
where
    C: MappingCache,
    N: Counter,
{
    cache.ping().await.context("cache is unreachable")?;

    let current = counter.seed().await.context("failed to seed counter")?;
    info!(current, "counter ready");

    let generator = CounterGenerator::new(counter);

    let resolver: Arc<dyn Resolver> = match config.storage {
        StorageBackendArg::InMemory => Arc::new(
            ResolverService::new(InMemoryRepository::new(), cache, generator)
                .with_cache_timeout(config.cache_timeout()),
        ),
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn)
                .await
                .context("failed to connect to MySQL")?;
            repository.ensure_schema().await?;
            Arc::new(
                ResolverService::new(repository, cache, generator)
                    .with_cache_timeout(config.cache_timeout()),
            )
        }
    };

    Ok(resolver)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining connections");
}
