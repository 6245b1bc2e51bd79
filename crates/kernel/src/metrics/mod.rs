//! Prometheus metrics collection.
//!
//! Provides discovery pipeline metrics in Prometheus format.

use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// Listing request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ListingLabels {
    /// "public" or "moderation".
    pub listing: String,
    /// "ok", "error" or "timeout".
    pub outcome: String,
}

/// Gateway error labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct GatewayLabels {
    /// "turf" or "review".
    pub gateway: String,
}

/// Application metrics.
pub struct Metrics {
    registry: Registry,

    /// Listing requests by listing kind and outcome.
    pub listings: Family<ListingLabels, Counter>,

    /// End-to-end listing duration (query + enrichment).
    pub listing_duration_seconds: Histogram,

    /// Review lookups issued by the enrichment join.
    pub enrichment_lookups: Counter,

    /// Review lookups replaced by zero stats after a failure.
    pub enrichment_fallbacks: Counter,

    /// Gateway failures by gateway.
    pub gateway_errors: Family<GatewayLabels, Counter>,

    /// Query binding cache hits.
    pub cache_hits: Counter,

    /// Query binding cache misses.
    pub cache_misses: Counter,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let listings = Family::<ListingLabels, Counter>::default();
        // Counters are exposed with a `_total` suffix.
        registry.register("venue_listings", "Venue listing requests", listings.clone());

        let listing_duration_seconds = Histogram::new(exponential_buckets(0.001, 2.0, 14));
        registry.register(
            "venue_listing_duration_seconds",
            "Venue listing duration in seconds",
            listing_duration_seconds.clone(),
        );

        let enrichment_lookups = Counter::default();
        registry.register(
            "enrichment_lookups",
            "Review aggregate lookups issued",
            enrichment_lookups.clone(),
        );

        let enrichment_fallbacks = Counter::default();
        registry.register(
            "enrichment_fallbacks",
            "Review lookups defaulted to zero stats",
            enrichment_fallbacks.clone(),
        );

        let gateway_errors = Family::<GatewayLabels, Counter>::default();
        registry.register("gateway_errors", "Gateway failures", gateway_errors.clone());

        let cache_hits = Counter::default();
        registry.register("cache_hits", "Cache hit count", cache_hits.clone());

        let cache_misses = Counter::default();
        registry.register("cache_misses", "Cache miss count", cache_misses.clone());

        Self {
            registry,
            listings,
            listing_duration_seconds,
            enrichment_lookups,
            enrichment_fallbacks,
            gateway_errors,
            cache_hits,
            cache_misses,
        }
    }

    /// Record a finished listing request.
    pub fn record_listing(&self, listing: &str, outcome: &str, duration_secs: f64) {
        let labels = ListingLabels {
            listing: listing.to_string(),
            outcome: outcome.to_string(),
        };
        self.listings.get_or_create(&labels).inc();
        self.listing_duration_seconds.observe(duration_secs);
    }

    /// Record issued review lookups.
    pub fn record_lookups(&self, count: u64) {
        self.enrichment_lookups.inc_by(count);
    }

    /// Record a review lookup that fell back to zero stats.
    pub fn record_fallback(&self) {
        self.enrichment_fallbacks.inc();
    }

    /// Record a gateway failure.
    pub fn record_gateway_error(&self, gateway: &str) {
        self.gateway_errors
            .get_or_create(&GatewayLabels {
                gateway: gateway.to_string(),
            })
            .inc();
    }

    /// Record a cache hit.
    pub fn record_cache_hit(&self) {
        self.cache_hits.inc();
    }

    /// Record a cache miss.
    pub fn record_cache_miss(&self) {
        self.cache_misses.inc();
    }

    /// Encode metrics in Prometheus text format.
    ///
    /// # Panics
    ///
    /// Panics if Prometheus metric encoding to a `String` buffer fails.
    /// The `fmt::Write` impl for `String` is infallible.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        // Prometheus encoding to String buffer is infallible
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}
