// Query service - Builds, executes and decodes vessel GPS queries
use crate::application::aggregation;
use crate::application::telemetry_repository::{QueryError, TelemetryRepository};
use crate::domain::vessel_gps::{QueryRequest, QueryResponse, VesselGpsData};
use crate::infrastructure::flux_csv::parse_flux_csv;
use crate::infrastructure::flux_query::build_flux_query;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

const HISTORY_LIMIT: u64 = 1000;
const SOS_LIMIT: u64 = 100;

/// Last observed outcome of the service, for status polling
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceStatus {
    pub last_update: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Clone)]
pub struct QueryService {
    repository: Arc<dyn TelemetryRepository>,
    bucket: String,
    status: Arc<RwLock<ServiceStatus>>,
}

impl QueryService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, bucket: String) -> Self {
        Self {
            repository,
            bucket,
            status: Arc::new(RwLock::new(ServiceStatus::default())),
        }
    }

    /// Run a query. Every failure is reported through the envelope.
    pub async fn query(&self, request: &QueryRequest) -> QueryResponse {
        let flux = build_flux_query(&self.bucket, request);

        match self.repository.query_csv(&flux).await {
            Ok(body) => {
                let data = parse_flux_csv(&body);
                tracing::debug!("Decoded {} GPS readings", data.len());
                self.record_success();
                QueryResponse::success(data)
            }
            Err(err) => {
                tracing::error!("Vessel GPS query failed: {}", err);
                let message = describe_failure(&err, self.repository.endpoint());
                self.record_failure(&message);
                QueryResponse::failure(message)
            }
        }
    }

    pub fn status(&self) -> ServiceStatus {
        self.status
            .read()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Readings for one device over the last `hours`
    pub async fn vessel_history(&self, device_id: &str, hours: i64) -> QueryResponse {
        let request = QueryRequest::window(Some(device_id.to_string()), hours, Some(HISTORY_LIMIT));
        self.query(&request).await
    }

    /// Readings for every device over the last `hours`
    pub async fn all_vessel_history(&self, hours: i64) -> QueryResponse {
        let request = QueryRequest::window(None, hours, Some(HISTORY_LIMIT));
        self.query(&request).await
    }

    /// Newest reading for one device within the last `hours`
    pub async fn latest_reading(&self, device_id: &str, hours: i64) -> Option<VesselGpsData> {
        let mut request = QueryRequest::window(Some(device_id.to_string()), hours, Some(1));
        request.newest_first = Some(true);

        let response = self.query(&request).await;
        aggregation::latest_per_device(&response.data).into_iter().next()
    }

    /// One row per device, reduced by the backend
    pub async fn latest_per_device(&self, hours: i64) -> QueryResponse {
        let mut request = QueryRequest::window(None, hours, None);
        request.latest_only = Some(true);

        let response = self.query(&request).await;
        if !response.success {
            return response;
        }
        QueryResponse::success(aggregation::latest_per_device(&response.data))
    }

    pub async fn vessels_with_sos(&self, hours: i64) -> QueryResponse {
        let mut request = QueryRequest::window(None, hours, Some(SOS_LIMIT));
        request.sos_only = Some(true);
        request.newest_first = Some(true);

        let response = self.query(&request).await;
        if !response.success {
            return response;
        }
        QueryResponse::success(aggregation::sos_only(&response.data))
    }

    pub async fn readings_by_device(
        &self,
        hours: i64,
    ) -> Result<BTreeMap<String, Vec<VesselGpsData>>, String> {
        let response = self.all_vessel_history(hours).await;
        match response.error {
            Some(error) => Err(error),
            None => Ok(aggregation::group_by_device(&response.data)),
        }
    }

    /// Readings newer than `minutes` ago, newest first
    pub async fn recent_activity(&self, minutes: i64) -> QueryResponse {
        let mut request = QueryRequest::recent(None, minutes, Some(HISTORY_LIMIT));
        request.newest_first = Some(true);

        let response = self.query(&request).await;
        if !response.success {
            return response;
        }

        let since = request
            .start_time
            .as_deref()
            .and_then(|start| DateTime::parse_from_rfc3339(start).ok())
            .map(|start| start.with_timezone(&Utc));
        let recent = match since {
            Some(since) => aggregation::within_window(&response.data, since),
            None => response.data,
        };
        QueryResponse::success(aggregation::sorted_by_recency(&recent))
    }

    /// Query several devices concurrently, one envelope per device in input order
    pub async fn poll_devices(&self, device_ids: &[String], hours: i64) -> Vec<(String, QueryResponse)> {
        let queries = device_ids.iter().map(|id| async move {
            (id.clone(), self.vessel_history(id, hours).await)
        });
        futures::future::join_all(queries).await
    }

    fn record_success(&self) {
        let mut status = self.status.write().unwrap_or_else(|p| p.into_inner());
        status.last_update = Some(Utc::now());
        status.last_error = None;
    }

    fn record_failure(&self, message: &str) {
        let mut status = self.status.write().unwrap_or_else(|p| p.into_inner());
        status.last_error = Some(message.to_string());
    }
}

/// Human-readable message for a failed query
pub fn describe_failure(err: &QueryError, endpoint: &str) -> String {
    match err {
        QueryError::Unreachable { .. } => format!(
            "Time-series backend unreachable at {}. Check that InfluxDB is running and the URL is correct.",
            endpoint
        ),
        QueryError::Status { status: 401, .. } => {
            "InfluxDB authentication failed (401). Check the configured auth token.".to_string()
        }
        QueryError::Status { status: 404, .. } => {
            "InfluxDB resource not found (404). Check the organization and bucket names.".to_string()
        }
        QueryError::Status { status: 503, .. } => {
            "InfluxDB service unavailable (503). Try again later.".to_string()
        }
        QueryError::Status { status, .. } => format!("InfluxDB query failed with status {}", status),
        QueryError::Timeout(_) => "InfluxDB query timed out".to_string(),
        QueryError::Transport(message) | QueryError::Body(message) => {
            format!("InfluxDB query failed: {}", message)
        }
    }
}
