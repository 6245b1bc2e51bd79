//! Collaborator contracts consumed by the discovery pipeline.
//!
//! Storage and review aggregation live behind these traits. The pipeline
//! never interprets distances or ratings itself; it only passes predicates
//! and windows through and merges what comes back.

use async_trait::async_trait;

use super::error::GatewayError;
use super::filter::VenuePredicate;
use super::pagination::PageWindow;
use super::types::{ReviewStats, Venue};

/// One window of matching venues plus the total match count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenueSlice {
    pub items: Vec<Venue>,

    /// Matching venues across all pages.
    pub total: u64,
}

/// Executes venue predicates against the turf store.
#[async_trait]
pub trait TurfGateway: Send + Sync {
    /// Return at most `window.limit()` venues after skipping
    /// `window.skip()`.
    ///
    /// `VenuePredicate::Near` results are ordered by ascending distance from
    /// the anchor; other predicates use the store's default order.
    async fn find(
        &self,
        predicate: &VenuePredicate,
        window: PageWindow,
    ) -> Result<VenueSlice, GatewayError>;
}

/// Computes review aggregates for a venue.
///
/// Called concurrently, once per venue in a page, with no ordering between
/// calls.
#[async_trait]
pub trait ReviewStatsGateway: Send + Sync {
    async fn stats_for(&self, turf_id: &str) -> Result<ReviewStats, GatewayError>;
}
