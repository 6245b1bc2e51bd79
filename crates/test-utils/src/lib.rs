//! TurfHub test utilities.
//!
//! Helpers for integration testing: venue fixtures, a scripted review
//! gateway, and assertion utilities for listing responses.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use turfhub_kernel::discovery::{
    GatewayError, GeoPoint, ReviewStats, ReviewStatsGateway, Venue, VenueLocation, VenueStatus,
};

/// Create an approved test venue with default values.
pub fn test_venue(turf_id: &str, name: &str) -> TestVenue {
    TestVenue {
        venue: Venue {
            id: Uuid::now_v7(),
            turf_id: turf_id.to_string(),
            name: name.to_string(),
            description: None,
            location: VenueLocation {
                address: "1 Pitch Road".to_string(),
                city: "Oslo".to_string(),
                state: "Oslo".to_string(),
                coordinates: None,
            },
            price_per_hour: 1500,
            court_size: "5v5".to_string(),
            turf_photos: vec![],
            amenities: vec![],
            status: VenueStatus::Approved,
            is_blocked: false,
            created: 0,
        },
    }
}

/// A venue builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestVenue {
    venue: Venue,
}

impl TestVenue {
    /// Set the city.
    pub fn in_city(mut self, city: &str) -> Self {
        self.venue.location.city = city.to_string();
        self
    }

    /// Set coordinates. Panics on invalid coordinates.
    pub fn at(mut self, lng: f64, lat: f64) -> Self {
        self.venue.location.coordinates =
            Some(GeoPoint::new(lng, lat).unwrap_or_else(|| panic!("invalid point {lng},{lat}")));
        self
    }

    /// Set the moderation status.
    pub fn with_status(mut self, status: VenueStatus) -> Self {
        self.venue.status = status;
        self
    }

    /// Set as pending moderation.
    pub fn pending(self) -> Self {
        self.with_status(VenueStatus::Pending)
    }

    /// Set as rejected.
    pub fn rejected(self) -> Self {
        self.with_status(VenueStatus::Rejected)
    }

    /// Block the venue.
    pub fn blocked(mut self) -> Self {
        self.venue.is_blocked = true;
        self
    }

    /// Set the creation timestamp.
    pub fn created(mut self, created: i64) -> Self {
        self.venue.created = created;
        self
    }

    /// Add an amenity.
    pub fn with_amenity(mut self, amenity: &str) -> Self {
        self.venue.amenities.push(amenity.to_string());
        self
    }

    pub fn build(self) -> Venue {
        self.venue
    }
}

/// Review gateway with scripted per-venue answers.
///
/// Records every call; venues without a script get zero stats after a
/// 1 ms delay.
#[derive(Default)]
pub struct ScriptedReviewGateway {
    stats: HashMap<String, ReviewStats>,
    delays: HashMap<String, Duration>,
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedReviewGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `turf_id` with the given aggregate.
    pub fn with_stats(mut self, turf_id: &str, average_rating: f64, total_reviews: u64) -> Self {
        self.stats.insert(
            turf_id.to_string(),
            ReviewStats {
                average_rating,
                total_reviews,
            },
        );
        self
    }

    /// Delay the answer for `turf_id`.
    pub fn with_delay(mut self, turf_id: &str, delay: Duration) -> Self {
        self.delays.insert(turf_id.to_string(), delay);
        self
    }

    /// Fail lookups for `turf_id`.
    pub fn failing_for(mut self, turf_id: &str) -> Self {
        self.failing.push(turf_id.to_string());
        self
    }

    /// Turf ids looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ReviewStatsGateway for ScriptedReviewGateway {
    async fn stats_for(&self, turf_id: &str) -> Result<ReviewStats, GatewayError> {
        self.calls.lock().push(turf_id.to_string());

        let delay = self
            .delays
            .get(turf_id)
            .copied()
            .unwrap_or(Duration::from_millis(1));
        tokio::time::sleep(delay).await;

        if self.failing.iter().any(|f| f == turf_id) {
            return Err(GatewayError::Unavailable(format!(
                "review store unreachable for {turf_id}"
            )));
        }
        Ok(self.stats.get(turf_id).copied().unwrap_or_default())
    }
}

/// Assertion helpers for listing responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Turf ids of a listing response, in response order.
    pub fn turf_ids(page: &Value) -> Vec<String> {
        page["turfs"]
            .as_array()
            .unwrap_or_else(|| panic!("Expected a turfs array, got: {page}"))
            .iter()
            .map(|t| t["turfId"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    /// Assert that every venue in a listing response carries review stats.
    pub fn all_enriched(page: &Value) {
        for turf in page["turfs"].as_array().into_iter().flatten() {
            let stats = &turf["reviewStats"];
            assert!(
                stats["averageRating"].is_number() && stats["totalReviews"].is_number(),
                "Expected reviewStats on every venue, got: {turf}"
            );
        }
    }
}
