//! In-process gateways.
//!
//! Backed by plain vectors. Used for local development
//! (`DISCOVERY_BACKEND=memory`, seeded from `DISCOVERY_SEED_FILE`) and as
//! the reference behavior the Postgres gateways are tested against.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;

use super::error::GatewayError;
use super::filter::VenuePredicate;
use super::gateway::{ReviewStatsGateway, TurfGateway, VenueSlice};
use super::geo::haversine_km;
use super::pagination::PageWindow;
use super::types::{ReviewStats, Venue};

/// Turf gateway over an in-memory venue list.
///
/// Default order is newest first (`created` descending); `Near` predicates
/// order by ascending distance, venues without coordinates last.
#[derive(Default)]
pub struct InMemoryTurfGateway {
    venues: Vec<Venue>,
}

impl InMemoryTurfGateway {
    pub fn new(venues: Vec<Venue>) -> Self {
        Self { venues }
    }
}

#[async_trait]
impl TurfGateway for InMemoryTurfGateway {
    async fn find(
        &self,
        predicate: &VenuePredicate,
        window: PageWindow,
    ) -> Result<VenueSlice, GatewayError> {
        let mut matching: Vec<Venue> = self
            .venues
            .iter()
            .filter(|v| predicate.matches(v))
            .cloned()
            .collect();

        match predicate.anchor() {
            Some(anchor) => {
                let distance = |v: &Venue| {
                    v.location
                        .coordinates
                        .map(|c| haversine_km(anchor, c))
                        .unwrap_or(f64::MAX)
                };
                matching.sort_by(|a, b| {
                    distance(a)
                        .partial_cmp(&distance(b))
                        .unwrap_or(Ordering::Equal)
                });
            }
            None => matching.sort_by(|a, b| b.created.cmp(&a.created)),
        }

        let total = matching.len() as u64;
        let skip = usize::try_from(window.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(window.limit()).unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(skip).take(limit).collect();

        Ok(VenueSlice { items, total })
    }
}

/// Review gateway over in-memory ratings keyed by turf id.
#[derive(Default)]
pub struct InMemoryReviewGateway {
    ratings: RwLock<HashMap<String, Vec<f64>>>,
}

impl InMemoryReviewGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one review rating for a venue.
    pub fn add_rating(&self, turf_id: &str, rating: f64) {
        self.ratings
            .write()
            .entry(turf_id.to_string())
            .or_default()
            .push(rating);
    }
}

#[async_trait]
impl ReviewStatsGateway for InMemoryReviewGateway {
    async fn stats_for(&self, turf_id: &str) -> Result<ReviewStats, GatewayError> {
        let ratings = self.ratings.read();
        let Some(values) = ratings.get(turf_id).filter(|v| !v.is_empty()) else {
            return Ok(ReviewStats::zero());
        };
        let total = values.len();
        Ok(ReviewStats {
            average_rating: values.iter().sum::<f64>() / total as f64,
            total_reviews: total as u64,
        })
    }
}

/// One review in a seed file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReview {
    pub turf_id: String,
    pub rating: u8,
}

/// Startup data for the memory backend.
///
/// ```json
/// { "turfs": [ { "turfId": "...", ... } ], "reviews": [ { "turfId": "...", "rating": 4 } ] }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub turfs: Vec<Venue>,

    #[serde(default)]
    pub reviews: Vec<SeedReview>,
}

impl SeedData {
    /// Parse a seed document. Ratings must be between 1 and 5.
    pub fn from_json(raw: &str) -> Result<Self, GatewayError> {
        let seed: SeedData = serde_json::from_str(raw)
            .map_err(|e| GatewayError::Backend(format!("invalid seed data: {e}")))?;

        if let Some(review) = seed.reviews.iter().find(|r| !(1..=5).contains(&r.rating)) {
            return Err(GatewayError::Backend(format!(
                "rating {} for {} is outside 1..=5",
                review.rating, review.turf_id
            )));
        }
        Ok(seed)
    }

    pub fn into_gateways(self) -> (InMemoryTurfGateway, InMemoryReviewGateway) {
        let reviews = InMemoryReviewGateway::new();
        for review in &self.reviews {
            reviews.add_rating(&review.turf_id, f64::from(review.rating));
        }
        (InMemoryTurfGateway::new(self.turfs), reviews)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::discovery::filter::FilterBuilder;
    use crate::discovery::types::{GeoPoint, VenueLocation, VenueStatus};
    use uuid::Uuid;

    fn venue(turf_id: &str, city: &str, created: i64, at: Option<(f64, f64)>) -> Venue {
        Venue {
            id: Uuid::now_v7(),
            turf_id: turf_id.to_string(),
            name: format!("Turf {turf_id}"),
            description: None,
            location: VenueLocation {
                city: city.to_string(),
                coordinates: at.and_then(|(lng, lat)| GeoPoint::new(lng, lat)),
                ..Default::default()
            },
            price_per_hour: 1000,
            court_size: "7v7".to_string(),
            turf_photos: vec![],
            amenities: vec![],
            status: VenueStatus::Approved,
            is_blocked: false,
            created,
        }
    }

    #[tokio::test]
    async fn default_order_is_newest_first_and_windowed() {
        let gateway = InMemoryTurfGateway::new(vec![
            venue("a", "Oslo", 1, None),
            venue("b", "Oslo", 3, None),
            venue("c", "Oslo", 2, None),
        ]);

        let slice = gateway
            .find(&FilterBuilder::public(None, None), PageWindow::new(1, 2))
            .await
            .unwrap();
        let ids: Vec<&str> = slice.items.iter().map(|v| v.turf_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(slice.total, 3);

        let slice = gateway
            .find(&FilterBuilder::public(None, None), PageWindow::new(2, 2))
            .await
            .unwrap();
        assert_eq!(slice.items.len(), 1);
        assert_eq!(slice.items[0].turf_id, "a");
    }

    #[tokio::test]
    async fn near_orders_by_distance_with_unlocated_last() {
        let gateway = InMemoryTurfGateway::new(vec![
            venue("far", "Bergen", 0, Some((5.32, 60.39))),
            venue("nowhere", "Oslo", 0, None),
            venue("near", "Oslo", 0, Some((10.76, 59.92))),
        ]);
        let oslo = GeoPoint::new(10.75, 59.91).unwrap();

        let slice = gateway
            .find(&FilterBuilder::public(None, Some(oslo)), PageWindow::new(1, 10))
            .await
            .unwrap();
        let ids: Vec<&str> = slice.items.iter().map(|v| v.turf_id.as_str()).collect();
        assert_eq!(ids, vec!["near", "far", "nowhere"]);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_with_total() {
        let gateway = InMemoryTurfGateway::new(vec![venue("a", "Oslo", 0, None)]);
        let slice = gateway
            .find(&FilterBuilder::public(None, None), PageWindow::new(5, 10))
            .await
            .unwrap();
        assert!(slice.items.is_empty());
        assert_eq!(slice.total, 1);
    }

    #[tokio::test]
    async fn review_stats_average_ratings() {
        let reviews = InMemoryReviewGateway::new();
        reviews.add_rating("a", 4.0);
        reviews.add_rating("a", 5.0);

        let stats = reviews.stats_for("a").await.unwrap();
        assert_eq!(stats.average_rating, 4.5);
        assert_eq!(stats.total_reviews, 2);

        assert_eq!(reviews.stats_for("b").await.unwrap(), ReviewStats::zero());
    }

    #[tokio::test]
    async fn seed_data_fills_both_gateways() {
        let seed = SeedData::from_json(include_str!("../../seed/turfs.json")).unwrap();
        assert!(!seed.turfs.is_empty());
        let first = seed.turfs[0].turf_id.clone();
        let rated = seed.reviews[0].turf_id.clone();

        let (turfs, reviews) = seed.into_gateways();

        let slice = turfs
            .find(&FilterBuilder::public(None, None), PageWindow::new(1, 100))
            .await
            .unwrap();
        assert!(slice.total > 0);
        assert!(slice.items.iter().any(|v| v.turf_id == first));
        assert!(reviews.stats_for(&rated).await.unwrap().total_reviews > 0);
    }

    #[test]
    fn seed_data_rejects_bad_input() {
        assert!(SeedData::from_json("not json").is_err());
        assert!(SeedData::from_json(r#"{"reviews": [{"turfId": "a", "rating": 9}]}"#).is_err());

        let empty = SeedData::from_json("{}").unwrap();
        assert!(empty.turfs.is_empty());
    }
}
