//! HTTP route handlers.

pub mod health;
pub mod metrics;
pub mod turfs;

use axum::Router;

use crate::state::AppState;

/// All routes, with state applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(turfs::router())
        .merge(health::router())
        .merge(metrics::router())
        .with_state(state)
}
