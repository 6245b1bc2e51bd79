//! Venue discovery types.
//!
//! Provides the data model shared by the pipeline stages:
//! - Venue: a bookable turf listing as stored by the turf gateway
//! - ReviewStats: review aggregate owned by the review subsystem
//! - EnrichedVenue / VenuePage: what callers of the pipeline receive
//! - DiscoveryConfig: defaults and limits passed into the pipeline

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Moderation status of a venue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VenueStatus {
    #[default]
    Pending,
    Approved,
    #[serde(alias = "blocked")]
    Rejected,
}

impl VenueStatus {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueStatus::Pending => "pending",
            VenueStatus::Approved => "approved",
            VenueStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for VenueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VenueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(VenueStatus::Pending),
            "approved" => Ok(VenueStatus::Approved),
            "rejected" | "blocked" => Ok(VenueStatus::Rejected),
            other => Err(format!("unknown venue status: {other}")),
        }
    }
}

/// A geographic coordinate.
///
/// The HTTP boundary and the storage layer both use GeoJSON order
/// (`lng,lat`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(lng: f64, lat: f64) -> Option<Self> {
        let valid = lng.is_finite()
            && lat.is_finite()
            && (-180.0..=180.0).contains(&lng)
            && (-90.0..=90.0).contains(&lat);
        valid.then_some(Self { lng, lat })
    }
}

/// Where a venue is.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VenueLocation {
    pub address: String,
    pub city: String,
    pub state: String,
    /// Missing for venues that were never geocoded.
    pub coordinates: Option<GeoPoint>,
}

/// Venue record as returned by the turf gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    /// Storage primary key.
    pub id: Uuid,

    /// Public venue identifier, used for review lookups and booking links.
    pub turf_id: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub location: VenueLocation,

    /// Hourly price in the smallest currency unit.
    pub price_per_hour: i64,

    pub court_size: String,

    #[serde(default)]
    pub turf_photos: Vec<String>,

    #[serde(default, alias = "aminities")]
    pub amenities: Vec<String>,

    pub status: VenueStatus,

    #[serde(default)]
    pub is_blocked: bool,

    /// Unix timestamp when created.
    #[serde(default)]
    pub created: i64,
}

/// Aggregate rating statistics for one venue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    /// Mean rating, 0 when the venue has no reviews.
    pub average_rating: f64,

    pub total_reviews: u64,
}

impl ReviewStats {
    /// Stats for a venue without reviews.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// A venue with its review aggregate attached at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedVenue {
    #[serde(flatten)]
    pub venue: Venue,

    pub review_stats: ReviewStats,
}

/// One page of the discovery listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VenuePage {
    pub turfs: Vec<EnrichedVenue>,

    /// Number of pages, not number of venues.
    pub total_pages: u64,

    /// Current page number (1-indexed).
    pub current_page: u32,

    pub page_size: u32,

    /// Matching venues across all pages.
    pub total_venues: u64,
}

/// Raw listing request as received from a caller.
///
/// Page values are kept signed and optional so the pipeline can normalize
/// whatever an untrusted caller sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListVenuesRequest {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
    pub location: Option<GeoPoint>,
}

/// What to do when a single review lookup fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentFailurePolicy {
    /// Substitute zero stats for the failed venue and keep the page.
    #[default]
    ZeroStats,
    /// Fail the whole page.
    FailPage,
}

impl FromStr for EnrichmentFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" | "zero_stats" => Ok(EnrichmentFailurePolicy::ZeroStats),
            "fail" | "fail_page" => Ok(EnrichmentFailurePolicy::FailPage),
            other => Err(format!("unknown enrichment failure policy: {other}")),
        }
    }
}

/// Defaults and limits for the discovery pipeline.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Page size used when the caller sends none or a non-positive one.
    pub default_page_size: u32,

    /// Largest page size honored; larger requests are capped.
    pub max_page_size: u32,

    /// Maximum review lookups in flight for one page.
    pub enrichment_concurrency: usize,

    /// Bound on a single review lookup.
    pub lookup_timeout: Duration,

    /// Bound on the turf query (count + page).
    pub query_timeout: Duration,

    pub failure_policy: EnrichmentFailurePolicy,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            enrichment_concurrency: 16,
            lookup_timeout: Duration::from_secs(3),
            query_timeout: Duration::from_secs(10),
            failure_policy: EnrichmentFailurePolicy::ZeroStats,
        }
    }
}
