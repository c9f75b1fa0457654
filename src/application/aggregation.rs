// Post-processing helpers over decoded GPS readings
use crate::domain::vessel_gps::VesselGpsData;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Group readings by device, keeping the input order within each group
pub fn group_by_device(records: &[VesselGpsData]) -> BTreeMap<String, Vec<VesselGpsData>> {
    let mut grouped: BTreeMap<String, Vec<VesselGpsData>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.device_id.clone())
            .or_default()
            .push(record.clone());
    }
    grouped
}

/// Most recent reading for each device, ordered by device id
pub fn latest_per_device(records: &[VesselGpsData]) -> Vec<VesselGpsData> {
    let mut latest: BTreeMap<&str, &VesselGpsData> = BTreeMap::new();
    for record in records {
        let newer = latest
            .get(record.device_id.as_str())
            .is_none_or(|current| recency_key(record) >= recency_key(current));
        if newer {
            latest.insert(record.device_id.as_str(), record);
        }
    }
    latest.into_values().cloned().collect()
}

pub fn sos_only(records: &[VesselGpsData]) -> Vec<VesselGpsData> {
    records.iter().filter(|r| r.sos_signal).cloned().collect()
}

/// Newest first; ties keep their input order
pub fn sorted_by_recency(records: &[VesselGpsData]) -> Vec<VesselGpsData> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| recency_key(b).cmp(&recency_key(a)));
    sorted
}

/// Readings at or after `since`. Unparseable timestamps are excluded.
pub fn within_window(records: &[VesselGpsData], since: DateTime<Utc>) -> Vec<VesselGpsData> {
    records
        .iter()
        .filter(|r| parse_timestamp(&r.timestamp).is_some_and(|t| t >= since))
        .cloned()
        .collect()
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

// Unparseable timestamps sort as oldest
fn recency_key(record: &VesselGpsData) -> Option<DateTime<Utc>> {
    parse_timestamp(&record.timestamp)
}
