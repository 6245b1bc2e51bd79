//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::{Config, DiscoveryBackend};
use crate::db;
use crate::discovery::{
    DiscoveryConfig, DiscoveryService, PgReviewGateway, PgTurfGateway, ReviewStatsGateway,
    SeedData, TurfGateway,
};
use crate::metrics::Metrics;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool (absent for the memory backend).
    db: Option<PgPool>,

    /// Venue listing pipeline.
    discovery: Arc<DiscoveryService>,

    /// Prometheus metrics.
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create application state for the configured backend.
    pub async fn new(config: &Config) -> Result<Self> {
        match config.backend {
            DiscoveryBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required for the postgres backend")?;

                let pool = db::create_pool(url, config.database_max_connections)
                    .await
                    .context("failed to create database pool")?;

                db::run_migrations(&pool)
                    .await
                    .context("failed to run migrations")?;

                info!("PostgreSQL connection established");

                let turfs = Arc::new(PgTurfGateway::new(
                    pool.clone(),
                    config.discovery.query_timeout,
                ));
                let reviews = Arc::new(PgReviewGateway::new(pool.clone()));

                Ok(Self::with_gateways(turfs, reviews, config.discovery.clone(), Some(pool)))
            }
            DiscoveryBackend::Memory => {
                let path = config
                    .seed_file
                    .as_deref()
                    .context("DISCOVERY_SEED_FILE is required for the memory backend")?;

                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read seed file {}", path.display()))?;
                let seed = SeedData::from_json(&raw)
                    .with_context(|| format!("failed to load seed file {}", path.display()))?;

                info!(
                    path = %path.display(),
                    turfs = seed.turfs.len(),
                    reviews = seed.reviews.len(),
                    "using in-memory discovery backend"
                );

                let (turfs, reviews) = seed.into_gateways();
                Ok(Self::with_gateways(
                    Arc::new(turfs),
                    Arc::new(reviews),
                    config.discovery.clone(),
                    None,
                ))
            }
        }
    }

    /// Build state around explicit gateways.
    pub fn with_gateways(
        turfs: Arc<dyn TurfGateway>,
        reviews: Arc<dyn ReviewStatsGateway>,
        discovery_config: DiscoveryConfig,
        db: Option<PgPool>,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        let discovery = DiscoveryService::new(turfs, reviews, discovery_config, metrics.clone());

        Self {
            inner: Arc::new(AppStateInner {
                db,
                discovery,
                metrics,
            }),
        }
    }

    /// Get the discovery service.
    pub fn discovery(&self) -> &Arc<DiscoveryService> {
        &self.inner.discovery
    }

    /// Get the metrics registry.
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.inner.metrics
    }

    /// Check PostgreSQL health. `None` when no database is configured.
    pub async fn postgres_healthy(&self) -> Option<bool> {
        match &self.inner.db {
            Some(pool) => Some(db::check_health(pool).await),
            None => None,
        }
    }
}
