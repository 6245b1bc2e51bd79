//! Review enrichment join.
//!
//! Attaches a [`ReviewStats`] to every venue of a fetched page. Lookups run
//! concurrently (bounded by `enrichment_concurrency`) and the output keeps
//! the input order no matter which lookup settles first.

use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, warn};

use super::error::{DiscoveryError, GatewayError};
use super::gateway::ReviewStatsGateway;
use super::types::{DiscoveryConfig, EnrichedVenue, EnrichmentFailurePolicy, ReviewStats, Venue};
use crate::metrics::Metrics;

/// Fan-out join against the review aggregate gateway.
pub struct EnrichmentJoin {
    reviews: Arc<dyn ReviewStatsGateway>,
    concurrency: usize,
    lookup_timeout: Duration,
    policy: EnrichmentFailurePolicy,
    metrics: Arc<Metrics>,
}

impl EnrichmentJoin {
    pub fn new(
        reviews: Arc<dyn ReviewStatsGateway>,
        config: &DiscoveryConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            reviews,
            concurrency: config.enrichment_concurrency.max(1),
            lookup_timeout: config.lookup_timeout,
            policy: config.failure_policy,
            metrics,
        }
    }

    /// Enrich a page of venues.
    ///
    /// Issues exactly one lookup per venue. Under
    /// [`EnrichmentFailurePolicy::ZeroStats`] every lookup settles and a
    /// failed one contributes zero stats; under
    /// [`EnrichmentFailurePolicy::FailPage`] the first failure (in page
    /// order) fails the page and outstanding lookups are dropped.
    pub async fn enrich(&self, venues: Vec<Venue>) -> Result<Vec<EnrichedVenue>, DiscoveryError> {
        if venues.is_empty() {
            return Ok(Vec::new());
        }

        let count = venues.len();
        self.metrics.record_lookups(count as u64);
        debug!(
            venues = count,
            concurrency = self.concurrency,
            "enriching page with review stats"
        );

        let lookups = venues.into_iter().map(|venue| async move {
            let result = self.lookup(&venue.turf_id).await;
            (venue, result)
        });
        let settled = stream::iter(lookups).buffered(self.concurrency);

        match self.policy {
            EnrichmentFailurePolicy::FailPage => {
                settled
                    .map(|(venue, result)| match result {
                        Ok(review_stats) => Ok(EnrichedVenue {
                            venue,
                            review_stats,
                        }),
                        Err(source) => Err(DiscoveryError::Enrichment {
                            turf_id: venue.turf_id,
                            source,
                        }),
                    })
                    .try_collect()
                    .await
            }
            EnrichmentFailurePolicy::ZeroStats => Ok(settled
                .map(|(venue, result)| {
                    let review_stats = result.unwrap_or_else(|e| {
                        warn!(
                            turf_id = %venue.turf_id,
                            error = %e,
                            "review lookup failed; using zero stats"
                        );
                        self.metrics.record_fallback();
                        ReviewStats::zero()
                    });
                    EnrichedVenue {
                        venue,
                        review_stats,
                    }
                })
                .collect()
                .await),
        }
    }

    /// One bounded review lookup.
    async fn lookup(&self, turf_id: &str) -> Result<ReviewStats, GatewayError> {
        let lookup = self.reviews.stats_for(turf_id);
        let result = match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(self.lookup_timeout)),
        };
        if result.is_err() {
            self.metrics.record_gateway_error("review");
        }
        result
    }
}
