mod cli;

use crate::cli::{CacheBackendArg, LogFormatArg, StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use linkpulse_cache::{DisabledCache, LayeredCache, MokaDestinationCache, RedisDestinationCache};
use linkpulse_core::{AliasStore, DestinationCache, EventLog};
use linkpulse_gateway::{App, AppState, GatewayConfig};
use linkpulse_resolver::ResolverSettings;
use linkpulse_storage::{InMemoryStore, MySqlStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        "starting gateway server"
    );

    let (store, events, mysql): (
        Arc<dyn AliasStore>,
        Arc<dyn EventLog>,
        Option<Arc<MySqlStore>>,
    ) = match config.storage {
        StorageBackendArg::InMemory => {
            let store = Arc::new(InMemoryStore::new());
            (store.clone(), store, None)
        }
        StorageBackendArg::Mysql => {
            let dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let store = MySqlStore::connect(dsn)
                .await
                .context("failed to connect to MySQL")?;
            store
                .ensure_schema()
                .await
                .context("failed to create MySQL schema")?;
            let store = Arc::new(store);
            (store.clone(), store.clone(), Some(store))
        }
    };

    let cache = build_cache(&config).await?;

    let state = AppState::new(
        store,
        events,
        cache,
        GatewayConfig::builder()
            .base_url(config.base_url.clone())
            .alias_length(config.alias_length)
            .max_attempts(config.max_attempts)
            .resolver(
                ResolverSettings::builder()
                    .cache_ttl(config.cache_ttl())
                    .cache_timeout(config.cache_timeout())
                    .build(),
            )
            .build(),
    );
    let app = App::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(mysql) = mysql {
        mysql.close().await;
    }
    info!("gateway server stopped");

    Ok(())
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}

/// Builds the configured cache. An unreachable Redis downgrades the cache
/// instead of refusing to start.
async fn build_cache(config: &CLI) -> anyhow::Result<Arc<dyn DestinationCache>> {
    let moka = || MokaDestinationCache::with_capacity(config.moka_capacity);

    let cache: Arc<dyn DestinationCache> = match config.cache {
        CacheBackendArg::Disabled => Arc::new(DisabledCache),
        CacheBackendArg::Moka => Arc::new(moka()),
        CacheBackendArg::Redis | CacheBackendArg::Layered => {
            let url = config
                .redis_url
                .as_deref()
                .context("redis url is required for the redis and layered caches")?;
            match (RedisDestinationCache::connect(url).await, config.cache) {
                (Ok(redis), CacheBackendArg::Layered) => {
                    Arc::new(LayeredCache::new(moka(), redis, config.cache_ttl()))
                }
                (Ok(redis), _) => Arc::new(redis),
                (Err(e), CacheBackendArg::Layered) => {
                    warn!(error = %e, "Redis unavailable, using the in-process cache only");
                    Arc::new(moka())
                }
                (Err(e), _) => {
                    warn!(error = %e, "Redis unavailable, continuing without a cache");
                    Arc::new(DisabledCache)
                }
            }
        }
    };
    Ok(cache)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
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
    info!("shutdown signal received");
}
