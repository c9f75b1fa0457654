// Presentation layer - HTTP routing
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    grouped_positions, health_check, latest_for_device, latest_positions, poll_devices,
    query_gps, recent_activity, service_status, sos_vessels, vessel_history,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/influx/query", post(query_gps))
        .route("/api/vessels/latest", get(latest_positions))
        .route("/api/vessels/sos", get(sos_vessels))
        .route("/api/vessels/grouped", get(grouped_positions))
        .route("/api/vessels/recent", get(recent_activity))
        .route("/api/vessels/poll", post(poll_devices))
        .route("/api/vessels/:device_id/history", get(vessel_history))
        .route("/api/vessels/:device_id/latest", get(latest_for_device))
        .route("/api/status", get(service_status))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::query_service::QueryService;
    use crate::application::telemetry_repository::{QueryError, TelemetryRepository};
    use crate::domain::vessel_gps::QueryResponse;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    struct StaticRepository(Option<&'static str>);

    #[async_trait]
    impl TelemetryRepository for StaticRepository {
        async fn query_csv(&self, _flux: &str) -> Result<String, QueryError> {
            match self.0 {
                Some(body) => Ok(body.to_string()),
                None => Err(QueryError::Status {
                    status: 401,
                    body: "unauthorized".to_string(),
                }),
            }
        }

        fn endpoint(&self) -> &str {
            "http://influx.test:8086"
        }
    }

    fn app(body: Option<&'static str>) -> Router {
        let service = QueryService::new(Arc::new(StaticRepository(body)), "vessel_data".to_string());
        build_router(Arc::new(AppState {
            query_service: service,
        }))
    }

    async fn read_envelope(response: axum::response::Response) -> QueryResponse {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const CSV: &str = "_time,device_id,longitude,latitude,sos_signal\n\
2024-05-01T10:00:00Z,GPS-001,103.85,1.26,true\n\
2024-05-01T10:05:00Z,GPS-002,103.90,1.30,false\n";

    #[tokio::test]
    async fn test_health_check() {
        let response = app(Some(""))
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_query_endpoint() {
        let response = app(Some(CSV))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/influx/query")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"device_id": "GPS-001", "limit": 10}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let envelope = read_envelope(response).await;
        assert!(envelope.success);
        assert_eq!(envelope.total, 2);
    }

    #[tokio::test]
    async fn test_query_endpoint_failure_envelope() {
        let response = app(None)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/influx/query")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let envelope = read_envelope(response).await;
        assert!(!envelope.success);
        assert_eq!(envelope.total, 0);
        assert!(envelope.error.unwrap().contains("authentication"));
    }

    async fn post_query(body: &'static str) -> axum::response::Response {
        app(Some(CSV))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/influx/query")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_query_endpoint_malformed_body() {
        for body in ["{not json", r#"{"limit": -1}"#, r#"{"sos_only": "yes"}"#] {
            let response = post_query(body).await;

            assert_eq!(response.status(), StatusCode::OK);
            let envelope = read_envelope(response).await;
            assert!(!envelope.success);
            assert_eq!(envelope.total, 0);
            assert!(envelope.data.is_empty());
            assert!(envelope.error.is_some());
        }
    }

    #[tokio::test]
    async fn test_sos_endpoint_huge_window() {
        let response = app(Some(CSV))
            .oneshot(
                Request::builder()
                    .uri("/api/vessels/sos?hours=10000000000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(read_envelope(response).await.success);
    }

    #[tokio::test]
    async fn test_recent_endpoint() {
        let response = app(Some(""))
            .oneshot(
                Request::builder()
                    .uri("/api/vessels/recent?minutes=30")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let envelope = read_envelope(response).await;
        assert!(envelope.success);
        assert_eq!(envelope.total, 0);
    }

    #[tokio::test]
    async fn test_sos_endpoint() {
        let response = app(Some(CSV))
            .oneshot(
                Request::builder()
                    .uri("/api/vessels/sos?hours=6")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let envelope = read_envelope(response).await;
        assert_eq!(envelope.total, 1);
        assert_eq!(envelope.data[0].device_id, "GPS-001");
    }

    #[tokio::test]
    async fn test_latest_for_unknown_device_is_not_found() {
        let response = app(Some(""))
            .oneshot(
                Request::builder()
                    .uri("/api/vessels/GPS-404/latest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_grouped_endpoint_failure() {
        let response = app(None)
            .oneshot(
                Request::builder()
                    .uri("/api/vessels/grouped")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_poll_endpoint() {
        let response = app(Some(CSV))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/vessels/poll")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"device_ids": ["GPS-001", "GPS-002"]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let polls: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(polls[0]["device_id"], "GPS-001");
        assert_eq!(polls[1]["success"], true);
    }

    #[tokio::test]
    async fn test_history_endpoint() {
        let response = app(Some(CSV))
            .oneshot(
                Request::builder()
                    .uri("/api/vessels/GPS-002/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(read_envelope(response).await.success);
    }
}
