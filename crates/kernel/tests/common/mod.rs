#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Builds the real kernel router and state around in-memory or scripted
//! gateways, so tests exercise the full HTTP → pipeline path without a
//! database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use turfhub_kernel::discovery::{
    DiscoveryConfig, InMemoryTurfGateway, ReviewStatsGateway, TurfGateway, Venue,
};
use turfhub_kernel::routes;
use turfhub_kernel::state::AppState;
use turfhub_test_utils::ScriptedReviewGateway;

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// App over in-memory venues and scripted reviews.
    pub fn new(venues: Vec<Venue>, reviews: ScriptedReviewGateway) -> Self {
        Self::with_config(venues, reviews, DiscoveryConfig::default())
    }

    pub fn with_config(
        venues: Vec<Venue>,
        reviews: ScriptedReviewGateway,
        config: DiscoveryConfig,
    ) -> Self {
        Self::with_gateways(
            Arc::new(InMemoryTurfGateway::new(venues)),
            Arc::new(reviews),
            config,
        )
    }

    pub fn with_gateways(
        turfs: Arc<dyn TurfGateway>,
        reviews: Arc<dyn ReviewStatsGateway>,
        config: DiscoveryConfig,
    ) -> Self {
        Self::from_state(AppState::with_gateways(turfs, reviews, config, None))
    }

    pub fn from_state(state: AppState) -> Self {
        let router = routes::app(state.clone());
        Self { router, state }
    }

    /// Send a GET request and return status and raw body.
    pub async fn get_raw(&self, uri: &str) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    /// Send a GET request and parse the JSON body.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self.get_raw(uri).await;
        let json = serde_json::from_str(&body)
            .unwrap_or_else(|e| panic!("expected JSON from {uri}, got {body:?}: {e}"));
        (status, json)
    }
}
