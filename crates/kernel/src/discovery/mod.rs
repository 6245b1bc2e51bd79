//! Venue discovery module.
//!
//! This module provides:
//! - FilterBuilder: Turns search/status/location input into a VenuePredicate
//! - PageWindow: Normalizes untrusted paging input and computes page counts
//! - TurfGateway / ReviewStatsGateway: Storage and review contracts
//! - EnrichmentJoin: Concurrent, order-preserving review stats join
//! - DiscoveryService: The listing pipeline tying the stages together
//! - Postgres and in-memory gateway implementations

pub mod enrichment;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod geo;
pub mod memory;
pub mod pagination;
pub mod postgres;
pub mod service;
pub mod types;

pub use enrichment::EnrichmentJoin;
pub use error::{DiscoveryError, GatewayError};
pub use filter::{FilterBuilder, SearchTerm, VenuePredicate, VenueScope};
pub use gateway::{ReviewStatsGateway, TurfGateway, VenueSlice};
pub use memory::{InMemoryReviewGateway, InMemoryTurfGateway, SeedData, SeedReview};
pub use pagination::{PageWindow, parse_page_param};
pub use postgres::{PgReviewGateway, PgTurfGateway, VenueQueryBuilder};
pub use service::{DiscoveryService, VenueLister};
pub use types::{
    DiscoveryConfig, EnrichedVenue, EnrichmentFailurePolicy, GeoPoint, ListVenuesRequest,
    ReviewStats, Venue, VenueLocation, VenuePage, VenueStatus,
};
