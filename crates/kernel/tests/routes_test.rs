#![allow(clippy::unwrap_used, clippy::expect_used)]
//! HTTP integration tests for the venue listing routes.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;

use common::TestApp;
use turfhub_kernel::config::Config;
use turfhub_kernel::discovery::{
    DiscoveryConfig, EnrichmentFailurePolicy, GatewayError, InMemoryReviewGateway, PageWindow,
    TurfGateway, VenuePredicate, VenueSlice,
};
use turfhub_kernel::state::AppState;
use turfhub_test_utils::{ScriptedReviewGateway, assert, test_venue};

// -------------------------------------------------------------------------
// Public listing
// -------------------------------------------------------------------------

#[tokio::test]
async fn listing_returns_enriched_page() {
    let app = TestApp::new(
        vec![
            test_venue("v1", "Arena One").created(2).build(),
            test_venue("v2", "Bolt Park").created(1).build(),
        ],
        ScriptedReviewGateway::new().with_stats("v1", 4.5, 10),
    );

    let (status, page) = app.get_json("/api/turfs?page=1&pageSize=2&search=").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["currentPage"], 1);
    assert_eq!(page["pageSize"], 2);
    assert_eq!(page["totalVenues"], 2);
    assert_eq!(assert::turf_ids(&page), vec!["v1", "v2"]);
    assert::all_enriched(&page);
    assert_eq!(page["turfs"][0]["reviewStats"]["averageRating"], 4.5);
    assert_eq!(page["turfs"][0]["reviewStats"]["totalReviews"], 10);
    assert_eq!(page["turfs"][1]["reviewStats"]["averageRating"], 0.0);
    assert_eq!(page["turfs"][1]["reviewStats"]["totalReviews"], 0);
}

#[tokio::test]
async fn invalid_paging_is_normalized() {
    let venues = (0..12)
        .map(|i| test_venue(&format!("v{i}"), "Turf").created(i).build())
        .collect();
    let app = TestApp::new(venues, ScriptedReviewGateway::new());

    let (status, page) = app.get_json("/api/turfs?page=-4&pageSize=zero").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["currentPage"], 1);
    assert_eq!(page["pageSize"], 10);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["turfs"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn limit_is_an_alias_for_page_size() {
    let venues = (0..5)
        .map(|i| test_venue(&format!("v{i}"), "Turf").build())
        .collect();
    let app = TestApp::new(venues, ScriptedReviewGateway::new());

    let (_, page) = app.get_json("/api/turfs?limit=2&page=3").await;

    assert_eq!(page["pageSize"], 2);
    assert_eq!(page["currentPage"], 3);
    assert_eq!(page["turfs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn search_matches_name_or_city_and_hides_unapproved() {
    let app = TestApp::new(
        vec![
            test_venue("name-hit", "Arena One").in_city("Oslo").build(),
            test_venue("city-hit", "Kick Park").in_city("Arendal").build(),
            test_venue("miss", "Bolt Park").in_city("Bergen").build(),
            test_venue("pending", "Arena Two").pending().build(),
        ],
        ScriptedReviewGateway::new(),
    );

    let (_, page) = app.get_json("/api/turfs?search=AREN").await;

    let mut ids = assert::turf_ids(&page);
    ids.sort();
    assert_eq!(ids, vec!["city-hit", "name-hit"]);
    assert_eq!(page["totalVenues"], 2);
}

#[tokio::test]
async fn blocked_venues_are_hidden_from_public_listing() {
    let app = TestApp::new(
        vec![
            test_venue("ok", "Arena One").created(2).build(),
            test_venue("blocked", "Arena Two").created(1).blocked().build(),
        ],
        ScriptedReviewGateway::new(),
    );

    let (_, page) = app.get_json("/api/turfs").await;
    assert_eq!(assert::turf_ids(&page), vec!["ok"]);
    assert_eq!(page["totalVenues"], 1);

    let (_, searched) = app.get_json("/api/turfs?search=arena").await;
    assert_eq!(assert::turf_ids(&searched), vec!["ok"]);

    let (_, moderation) = app.get_json("/api/admin/turfs?status=approved").await;
    assert_eq!(assert::turf_ids(&moderation), vec!["ok", "blocked"]);
    assert_eq!(moderation["turfs"][1]["isBlocked"], true);
}

#[tokio::test]
async fn near_me_orders_by_distance() {
    let app = TestApp::new(
        vec![
            test_venue("bergen", "Bergen Turf").at(5.32, 60.39).created(3).build(),
            test_venue("oslo", "Oslo Turf").at(10.76, 59.92).created(1).build(),
            test_venue("drammen", "Drammen Turf").at(10.20, 59.74).created(2).build(),
        ],
        ScriptedReviewGateway::new(),
    );

    let (_, by_pair) = app.get_json("/api/turfs?location=10.75,59.91").await;
    assert_eq!(assert::turf_ids(&by_pair), vec!["oslo", "drammen", "bergen"]);

    let (_, by_fields) = app.get_json("/api/turfs?lng=10.75&lat=59.91").await;
    assert_eq!(assert::turf_ids(&by_fields), assert::turf_ids(&by_pair));

    let (_, unanchored) = app.get_json("/api/turfs").await;
    assert_eq!(assert::turf_ids(&unanchored), vec!["bergen", "drammen", "oslo"]);
}

#[tokio::test]
async fn invalid_location_is_rejected() {
    let app = TestApp::new(vec![], ScriptedReviewGateway::new());

    for uri in [
        "/api/turfs?location=10.75",
        "/api/turfs?location=north,east",
        "/api/turfs?lng=10.75",
        "/api/turfs?lng=500&lat=10",
    ] {
        let (status, body) = app.get_json(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["retryable"], false);
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("bad request"), "{message}");
    }
}

#[tokio::test]
async fn empty_result_has_zero_pages() {
    let app = TestApp::new(vec![], ScriptedReviewGateway::new());

    let (status, page) = app.get_json("/api/turfs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalPages"], 0);
    assert_eq!(page["totalVenues"], 0);
    assert!(page["turfs"].as_array().unwrap().is_empty());
}

// -------------------------------------------------------------------------
// Enrichment failures
// -------------------------------------------------------------------------

#[tokio::test]
async fn failed_review_lookup_yields_zero_stats_by_default() {
    let app = TestApp::new(
        vec![
            test_venue("a", "Arena").created(2).build(),
            test_venue("b", "Bolt").created(1).build(),
        ],
        ScriptedReviewGateway::new()
            .with_stats("a", 3.0, 1)
            .failing_for("b"),
    );

    let (status, page) = app.get_json("/api/turfs").await;

    assert_eq!(status, StatusCode::OK);
    assert::all_enriched(&page);
    assert_eq!(page["turfs"][1]["reviewStats"]["totalReviews"], 0);

    let (_, metrics) = app.get_raw("/metrics").await;
    assert!(metrics.contains("enrichment_fallbacks_total 1"), "{metrics}");
}

#[tokio::test]
async fn fail_page_policy_returns_bad_gateway() {
    let app = TestApp::with_config(
        vec![test_venue("a", "Arena").build()],
        ScriptedReviewGateway::new().failing_for("a"),
        DiscoveryConfig {
            failure_policy: EnrichmentFailurePolicy::FailPage,
            ..Default::default()
        },
    );

    let (status, body) = app.get_json("/api/turfs").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["retryable"], true);
    assert_eq!(body["error"], "failed to load venues");
}

struct DownTurfs;

#[async_trait]
impl TurfGateway for DownTurfs {
    async fn find(
        &self,
        _predicate: &VenuePredicate,
        _window: PageWindow,
    ) -> Result<VenueSlice, GatewayError> {
        Err(GatewayError::Unavailable("connection refused".to_string()))
    }
}

struct StuckTurfs;

#[async_trait]
impl TurfGateway for StuckTurfs {
    async fn find(
        &self,
        _predicate: &VenuePredicate,
        _window: PageWindow,
    ) -> Result<VenueSlice, GatewayError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(VenueSlice::default())
    }
}

#[tokio::test]
async fn turf_gateway_failure_is_not_an_empty_page() {
    let app = TestApp::with_gateways(
        Arc::new(DownTurfs),
        Arc::new(InMemoryReviewGateway::new()),
        DiscoveryConfig::default(),
    );

    let (status, body) = app.get_json("/api/turfs").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["retryable"], true);
}

#[tokio::test]
async fn turf_gateway_timeout_is_gateway_timeout() {
    let app = TestApp::with_gateways(
        Arc::new(StuckTurfs),
        Arc::new(InMemoryReviewGateway::new()),
        DiscoveryConfig {
            query_timeout: Duration::from_millis(50),
            ..Default::default()
        },
    );

    let (status, body) = app.get_json("/api/turfs").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["retryable"], true);
}

// -------------------------------------------------------------------------
// Moderation listing
// -------------------------------------------------------------------------

#[tokio::test]
async fn moderation_listing_filters_by_status() {
    let app = TestApp::new(
        vec![
            test_venue("ok", "Arena One").build(),
            test_venue("wait", "Arena Two").pending().build(),
            test_venue("no", "Arena Three").rejected().build(),
        ],
        ScriptedReviewGateway::new().with_stats("wait", 2.0, 1),
    );

    let (_, pending) = app.get_json("/api/admin/turfs?status=pending").await;
    assert_eq!(assert::turf_ids(&pending), vec!["wait"]);
    assert::all_enriched(&pending);
    assert_eq!(pending["turfs"][0]["reviewStats"]["totalReviews"], 1);

    let (_, blocked) = app.get_json("/api/admin/turfs?status=blocked").await;
    assert_eq!(assert::turf_ids(&blocked), vec!["no"]);

    let (_, default_status) = app.get_json("/api/admin/turfs").await;
    assert_eq!(assert::turf_ids(&default_status), vec!["ok"]);

    let (status, _) = app.get_json("/api/admin/turfs?status=archived").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -------------------------------------------------------------------------
// Memory backend
// -------------------------------------------------------------------------

fn memory_config(seed_file: &str) -> Config {
    let seed_file = seed_file.to_string();
    Config::from_lookup(|name| match name {
        "DISCOVERY_BACKEND" => Some("memory".to_string()),
        "DISCOVERY_SEED_FILE" => Some(seed_file.clone()),
        _ => None,
    })
    .unwrap()
}

#[tokio::test]
async fn memory_backend_serves_seeded_venues() {
    let seed = concat!(env!("CARGO_MANIFEST_DIR"), "/seed/turfs.json");
    let state = AppState::new(&memory_config(seed)).await.unwrap();
    let app = TestApp::from_state(state);

    let (status, page) = app.get_json("/api/turfs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalVenues"], 3);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(
        assert::turf_ids(&page),
        vec!["bandra-box", "koramangala-kickoff", "greenfield-arena"]
    );
    assert_eq!(page["turfs"][2]["reviewStats"]["averageRating"], 4.5);
    assert_eq!(page["turfs"][2]["reviewStats"]["totalReviews"], 2);

    let (_, pending) = app.get_json("/api/admin/turfs?status=pending").await;
    assert_eq!(assert::turf_ids(&pending), vec!["riverside-sports"]);
}

#[tokio::test]
async fn memory_backend_fails_on_missing_seed_file() {
    let result = AppState::new(&memory_config("/nonexistent/turfs.json")).await;
    assert!(result.is_err());
}

// -------------------------------------------------------------------------
// Health and metrics
// -------------------------------------------------------------------------

#[tokio::test]
async fn health_without_database_is_healthy() {
    let app = TestApp::new(vec![], ScriptedReviewGateway::new());

    let (status, body) = app.get_json("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body.get("postgres").is_none());
}

#[tokio::test]
async fn metrics_count_listings() {
    let app = TestApp::new(
        vec![test_venue("a", "Arena").build()],
        ScriptedReviewGateway::new(),
    );

    app.get_json("/api/turfs").await;
    app.get_json("/api/turfs?page=2").await;

    let (status, metrics) = app.get_raw("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        metrics.contains("venue_listings_total{listing=\"public\",outcome=\"ok\"} 2"),
        "{metrics}"
    );
    assert!(metrics.contains("enrichment_lookups_total 1"), "{metrics}");
}
