// HTTP request handlers
use crate::application::query_service::ServiceStatus;
use crate::domain::vessel_gps::{MAX_WINDOW_HOURS, QueryRequest, QueryResponse, VesselGpsData};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

const DEFAULT_HOURS: i64 = 24;
const DEFAULT_RECENT_MINUTES: i64 = 15;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub hours: Option<i64>,
}

impl RangeQuery {
    fn hours(&self) -> i64 {
        lookback_hours(self.hours)
    }
}

#[derive(Deserialize)]
pub struct RecentQuery {
    pub minutes: Option<i64>,
}

#[derive(Deserialize)]
pub struct PollRequest {
    pub device_ids: Vec<String>,
    pub hours: Option<i64>,
}

#[derive(Serialize)]
pub struct DevicePoll {
    pub device_id: String,
    #[serde(flatten)]
    pub response: QueryResponse,
}

/// Missing or non-positive values fall back to the default; large ones are capped
fn lookback_hours(hours: Option<i64>) -> i64 {
    hours
        .filter(|h| *h > 0)
        .unwrap_or(DEFAULT_HOURS)
        .min(MAX_WINDOW_HOURS)
}

fn lookback_minutes(minutes: Option<i64>) -> i64 {
    minutes
        .filter(|m| *m > 0)
        .unwrap_or(DEFAULT_RECENT_MINUTES)
        .min(MAX_WINDOW_HOURS * 60)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Raw query proxy; failures come back as a 200 with `success: false`
pub async fn query_gps(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Json<QueryResponse> {
    match payload {
        Ok(Json(request)) => Json(state.query_service.query(&request).await),
        Err(rejection) => {
            tracing::warn!("Rejected query body: {}", rejection.body_text());
            Json(QueryResponse::failure(rejection.body_text()))
        }
    }
}

pub async fn latest_positions(
    Query(range): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<QueryResponse> {
    Json(state.query_service.latest_per_device(range.hours()).await)
}

pub async fn sos_vessels(
    Query(range): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<QueryResponse> {
    Json(state.query_service.vessels_with_sos(range.hours()).await)
}

pub async fn vessel_history(
    Path(device_id): Path<String>,
    Query(range): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<QueryResponse> {
    Json(state.query_service.vessel_history(&device_id, range.hours()).await)
}

pub async fn service_status(State(state): State<Arc<AppState>>) -> Json<ServiceStatus> {
    Json(state.query_service.status())
}

pub async fn latest_for_device(
    Path(device_id): Path<String>,
    Query(range): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<VesselGpsData>, StatusCode> {
    state
        .query_service
        .latest_reading(&device_id, range.hours())
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn grouped_positions(
    Query(range): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, Vec<VesselGpsData>>>, (StatusCode, String)> {
    state
        .query_service
        .readings_by_device(range.hours())
        .await
        .map(Json)
        .map_err(|error| (StatusCode::BAD_GATEWAY, error))
}

pub async fn recent_activity(
    Query(query): Query<RecentQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<QueryResponse> {
    let minutes = lookback_minutes(query.minutes);
    Json(state.query_service.recent_activity(minutes).await)
}

/// Poll several devices in parallel
pub async fn poll_devices(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PollRequest>,
) -> Json<Vec<DevicePoll>> {
    let hours = lookback_hours(request.hours);
    let results = state
        .query_service
        .poll_devices(&request.device_ids, hours)
        .await
        .into_iter()
        .map(|(device_id, response)| DevicePoll { device_id, response })
        .collect();
    Json(results)
}
