// Vessel GPS domain models
use chrono::{SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A single decoded GPS reading for one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselGpsData {
    pub timestamp: String,
    pub device_id: String,
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
    pub priority: f64,
    pub sos_signal: bool,
}

/// Row staged by the CSV parser before its mandatory fields are confirmed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialGpsRecord {
    pub timestamp: Option<String>,
    pub device_id: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub altitude: Option<f64>,
    pub priority: Option<f64>,
    pub sos_signal: Option<bool>,
}

impl PartialGpsRecord {
    /// Returns `None` unless timestamp, device_id, longitude and latitude are all present.
    pub fn promote(self) -> Option<VesselGpsData> {
        Some(VesselGpsData {
            timestamp: self.timestamp?,
            device_id: self.device_id?,
            longitude: self.longitude?,
            latitude: self.latitude?,
            altitude: self.altitude.unwrap_or(0.0),
            priority: self.priority.unwrap_or(0.0),
            sos_signal: self.sos_signal.unwrap_or(false),
        })
    }
}

/// Longest lookback a window query may request (one year)
pub const MAX_WINDOW_HOURS: i64 = 24 * 365;

/// Inbound query against the time-series backend
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct QueryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sos_only: Option<bool>,
    /// Sort by time descending instead of ascending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newest_first: Option<bool>,
    /// Keep only the most recent row per device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_only: Option<bool>,
}

impl QueryRequest {
    /// Absolute window of `hours` ending now, clamped to `1..=MAX_WINDOW_HOURS`
    pub fn window(device_id: Option<String>, hours: i64, limit: Option<u64>) -> Self {
        Self::spanning(device_id, TimeDelta::hours(hours.clamp(1, MAX_WINDOW_HOURS)), limit)
    }

    /// Absolute window of `minutes` ending now, clamped like `window`
    pub fn recent(device_id: Option<String>, minutes: i64, limit: Option<u64>) -> Self {
        Self::spanning(
            device_id,
            TimeDelta::minutes(minutes.clamp(1, MAX_WINDOW_HOURS * 60)),
            limit,
        )
    }

    fn spanning(device_id: Option<String>, span: TimeDelta, limit: Option<u64>) -> Self {
        let end = Utc::now();
        let start = end - span;
        Self {
            device_id,
            start_time: Some(start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            end_time: Some(end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            limit,
            ..Default::default()
        }
    }

    pub fn effective_limit(&self) -> Option<u64> {
        self.limit.filter(|n| *n > 0)
    }

    pub fn effective_offset(&self) -> Option<u64> {
        self.offset.filter(|n| *n > 0)
    }

    pub fn is_sos_only(&self) -> bool {
        self.sos_only.unwrap_or(false)
    }

    pub fn is_newest_first(&self) -> bool {
        self.newest_first.unwrap_or(false)
    }

    pub fn is_latest_only(&self) -> bool {
        self.latest_only.unwrap_or(false)
    }
}

/// Uniform response envelope returned for every query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub data: Vec<VesselGpsData>,
    pub total: usize,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    pub fn success(data: Vec<VesselGpsData>) -> Self {
        Self {
            total: data.len(),
            data,
            success: true,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            success: false,
            error: Some(message.into()),
        }
    }
}
