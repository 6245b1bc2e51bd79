//! Venue listing routes.
//!
//! - `GET /api/turfs`: public listing (approved venues only)
//! - `GET /api/admin/turfs`: moderation listing filtered by `status`
//!
//! Paging parameters are parsed leniently and normalized by the pipeline.
//! A malformed location is rejected rather than silently ignored.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::discovery::{GeoPoint, ListVenuesRequest, VenuePage, VenueStatus, parse_page_param};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Create the venue listing router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/turfs", get(list_turfs))
        .route("/api/admin/turfs", get(list_turfs_for_moderation))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    page: Option<String>,
    #[serde(alias = "limit")]
    page_size: Option<String>,
    search: Option<String>,
    lng: Option<String>,
    lat: Option<String>,
    /// `lng,lat`
    location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ModerationParams {
    #[serde(flatten)]
    list: ListParams,
    status: Option<String>,
}

async fn list_turfs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<VenuePage>> {
    let request = to_request(params)?;
    let page = state.discovery().list_venues(&request).await?;
    Ok(Json(page))
}

async fn list_turfs_for_moderation(
    State(state): State<AppState>,
    Query(params): Query<ModerationParams>,
) -> AppResult<Json<VenuePage>> {
    let status = match non_blank(params.status.as_deref()) {
        Some(raw) => Some(raw.parse::<VenueStatus>().map_err(AppError::BadRequest)?),
        None => None,
    };
    let request = to_request(params.list)?;
    let page = state.discovery().list_for_moderation(&request, status).await?;
    Ok(Json(page))
}

fn to_request(params: ListParams) -> AppResult<ListVenuesRequest> {
    let location = parse_location(
        params.location.as_deref(),
        params.lng.as_deref(),
        params.lat.as_deref(),
    )?;

    Ok(ListVenuesRequest {
        page: non_blank(params.page.as_deref()).and_then(parse_page_param),
        page_size: non_blank(params.page_size.as_deref()).and_then(parse_page_param),
        search: params.search,
        location,
    })
}

/// Resolve the proximity anchor from `location=lng,lat` or `lng` + `lat`.
fn parse_location(
    location: Option<&str>,
    lng: Option<&str>,
    lat: Option<&str>,
) -> AppResult<Option<GeoPoint>> {
    let (lng, lat) = match (non_blank(location), non_blank(lng), non_blank(lat)) {
        (Some(pair), _, _) => match pair.split_once(',') {
            Some((lng, lat)) => (lng, lat),
            None => return Err(invalid_location(pair)),
        },
        (None, Some(lng), Some(lat)) => (lng, lat),
        (None, None, None) => return Ok(None),
        (None, _, _) => {
            return Err(AppError::BadRequest("both lng and lat are required".to_string()));
        }
    };

    let lng: f64 = lng.trim().parse().map_err(|_| invalid_location(lng))?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid_location(lat))?;

    GeoPoint::new(lng, lat)
        .map(Some)
        .ok_or_else(|| invalid_location(&format!("{lng},{lat}")))
}

fn invalid_location(raw: &str) -> AppError {
    AppError::BadRequest(format!("invalid location: {raw}"))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
