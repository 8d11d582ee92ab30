//! Application setup and wiring

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::application::aggregation::AggregationService;
use crate::application::ingest::IngestApplicationUseCase;
use crate::config::Config;
use crate::infrastructure::api_clients::osv::OsvApiClient;
use crate::infrastructure::cache::VulnerabilityCache;
use crate::infrastructure::persistence::application_repository::SqlxApplicationRepository;
use crate::infrastructure::persistence::MIGRATOR;
use crate::presentation::{AppState, build_router};

/// Build the application router: open the database, run migrations, and wire
/// the repository, OSV client, and use cases into the handler state.
pub async fn create_app(
    config: Config,
) -> Result<Router, Box<dyn std::error::Error + Send + Sync>> {
    let connect_options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(connect_options)
        .await?;

    MIGRATOR.run(&pool).await?;
    tracing::info!(url = %config.database.url, "database ready");

    let cache = Arc::new(VulnerabilityCache::new(
        config.osv.cache_max_entries,
        Duration::from_secs(config.osv.cache_ttl_seconds),
    ));

    let osv_client = Arc::new(OsvApiClient::new(
        &config.osv.base_url,
        Duration::from_secs(config.osv.timeout_seconds),
        cache,
    )?);

    let repository = Arc::new(SqlxApplicationRepository::new(pool));

    let ingest = Arc::new(IngestApplicationUseCase::new(repository.clone()));
    let aggregation = Arc::new(AggregationService::new(repository, osv_client));

    let config = Arc::new(config);
    let state = AppState {
        ingest,
        aggregation,
        config: config.clone(),
        startup_time: Instant::now(),
    };

    Ok(build_router(state, &config))
}
