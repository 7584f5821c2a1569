use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use watchlist_api::api::{create_router, AppState};
use watchlist_api::config::Config;
use watchlist_api::db::{create_pool, create_redis_client, Cache, PgTrackedStore};
use watchlist_api::services::providers::tmdb::TmdbProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let redis_client = create_redis_client(&config.redis_url)?;
    let cache = Cache::new(redis_client);

    let provider = Arc::new(TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));
    let store = Arc::new(PgTrackedStore::new(pool, provider.clone()));

    let state = AppState::new(store, provider);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
