use std::{net::SocketAddr, sync::Arc, time::Duration};

use reel_feed::{
    config::Config,
    db::{create_pool, create_redis_client, Cache, PgActivityStore},
    routes::{create_router, AppState},
    services::{pagination::PageLimits, providers::tmdb::TmdbProvider, RateLimiter},
};
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reel_feed=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database migrations applied");

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client).await;

    let catalog = TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    );

    let window = Duration::from_secs(config.rate_limit_window_secs);
    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit_requests, window));

    // Recovered keys are dropped once per window length
    let purger = rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(window);
        loop {
            interval.tick().await;
            purger.retain_recent();
            tracing::trace!("Rate-limit state pruned");
        }
    });

    let state = Arc::new(AppState {
        store: Arc::new(PgActivityStore::new(pool)),
        catalog: Arc::new(catalog),
        rate_limiter,
        page_limits: PageLimits::new(config.default_page_size, config.max_page_size),
        pick_tonight_count: config.pick_tonight_count,
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    cache_writer.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
