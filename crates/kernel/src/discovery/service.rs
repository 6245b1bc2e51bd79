//! Discovery service.
//!
//! Runs the listing pipeline: filter builder → page window → turf gateway →
//! enrichment join → page. Gateway failures propagate to the caller; there
//! is no empty-result fallback.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::enrichment::EnrichmentJoin;
use super::error::{DiscoveryError, GatewayError};
use super::filter::{FilterBuilder, VenuePredicate};
use super::gateway::{ReviewStatsGateway, TurfGateway, VenueSlice};
use super::pagination::PageWindow;
use super::types::{DiscoveryConfig, ListVenuesRequest, VenuePage, VenueStatus};
use crate::metrics::Metrics;

/// Anything that can produce a venue page for a listing request.
///
/// Implemented by [`DiscoveryService`]; the query binding depends on this
/// trait so it can be exercised without gateways.
#[async_trait]
pub trait VenueLister: Send + Sync {
    async fn list_venues(&self, request: &ListVenuesRequest) -> Result<VenuePage, DiscoveryError>;
}

/// Service for listing and enriching venues.
pub struct DiscoveryService {
    turfs: Arc<dyn TurfGateway>,
    enrichment: EnrichmentJoin,
    config: DiscoveryConfig,
    metrics: Arc<Metrics>,
}

impl DiscoveryService {
    /// Create a new DiscoveryService.
    pub fn new(
        turfs: Arc<dyn TurfGateway>,
        reviews: Arc<dyn ReviewStatsGateway>,
        config: DiscoveryConfig,
        metrics: Arc<Metrics>,
    ) -> Arc<Self> {
        let enrichment = EnrichmentJoin::new(reviews, &config, metrics.clone());
        Arc::new(Self {
            turfs,
            enrichment,
            config,
            metrics,
        })
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Public listing: approved venues only.
    #[tracing::instrument(skip(self), fields(listing = "public"))]
    pub async fn list_venues(
        &self,
        request: &ListVenuesRequest,
    ) -> Result<VenuePage, DiscoveryError> {
        let predicate = FilterBuilder::public(request.search.as_deref(), request.location);
        self.run("public", predicate, request).await
    }

    /// Moderation listing for an explicit status (approved when `None`).
    #[tracing::instrument(skip(self), fields(listing = "moderation"))]
    pub async fn list_for_moderation(
        &self,
        request: &ListVenuesRequest,
        status: Option<VenueStatus>,
    ) -> Result<VenuePage, DiscoveryError> {
        let status = status.unwrap_or(VenueStatus::Approved);
        let predicate =
            FilterBuilder::with_status(status, request.search.as_deref(), request.location);
        self.run("moderation", predicate, request).await
    }

    async fn run(
        &self,
        listing: &str,
        predicate: VenuePredicate,
        request: &ListVenuesRequest,
    ) -> Result<VenuePage, DiscoveryError> {
        let started = Instant::now();
        let window = PageWindow::normalize(request.page, request.page_size, &self.config);

        let result = self.fetch_page(&predicate, window).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) if e.is_timeout() => "timeout",
            Err(_) => "error",
        };
        self.metrics
            .record_listing(listing, outcome, started.elapsed().as_secs_f64());

        match &result {
            Ok(page) => info!(
                page = page.current_page,
                page_size = page.page_size,
                returned = page.turfs.len(),
                total_venues = page.total_venues,
                "venue listing served"
            ),
            Err(e) => warn!(error = %e, source = %e.gateway_error(), "venue listing failed"),
        }

        result
    }

    async fn fetch_page(
        &self,
        predicate: &VenuePredicate,
        window: PageWindow,
    ) -> Result<VenuePage, DiscoveryError> {
        let VenueSlice { mut items, total } = self.query(predicate, window).await?;

        if items.len() as u64 > window.limit() {
            warn!(
                returned = items.len(),
                limit = window.limit(),
                "turf gateway returned more rows than requested, truncating"
            );
            items.truncate(window.size() as usize);
        }

        debug!(rows = items.len(), total, "turf page fetched");

        let turfs = self.enrichment.enrich(items).await?;

        Ok(VenuePage {
            turfs,
            total_pages: window.total_pages(total),
            current_page: window.page(),
            page_size: window.size(),
            total_venues: total,
        })
    }

    /// Turf query bounded by `query_timeout`.
    async fn query(
        &self,
        predicate: &VenuePredicate,
        window: PageWindow,
    ) -> Result<VenueSlice, DiscoveryError> {
        let timeout = self.config.query_timeout;
        let result = match tokio::time::timeout(timeout, self.turfs.find(predicate, window)).await
        {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(timeout)),
        };
        result.map_err(|e| {
            self.metrics.record_gateway_error("turf");
            DiscoveryError::Query(e)
        })
    }
}

#[async_trait]
impl VenueLister for DiscoveryService {
    async fn list_venues(&self, request: &ListVenuesRequest) -> Result<VenuePage, DiscoveryError> {
        DiscoveryService::list_venues(self, request).await
    }
}
