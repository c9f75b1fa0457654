// Parser for InfluxDB annotated CSV responses
use crate::domain::vessel_gps::{PartialGpsRecord, VesselGpsData};

const ANNOTATION_MARKER: char = '#';
const TIME_COLUMN: &str = "_time";
/// Lines after this index are never treated as a `result,table` header
const HEADER_SCAN_LINES: usize = 5;

/// Decode a (possibly multi-table) CSV response into GPS readings.
///
/// Every header line resets the active column layout, so each table is read
/// against its own header. Rows missing a mandatory field are dropped.
pub fn parse_flux_csv(body: &str) -> Vec<VesselGpsData> {
    if body.lines().filter(|l| !l.trim_end().is_empty()).count() < 2 {
        return Vec::new();
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut header: Option<Vec<String>> = None;
    let mut records = Vec::new();
    let mut dropped = 0usize;

    for result in reader.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                tracing::debug!("Skipping unreadable CSV row: {}", e);
                dropped += 1;
                continue;
            }
        };

        if is_blank(&row) || row.get(0).is_some_and(|f| f.starts_with(ANNOTATION_MARKER)) {
            continue;
        }

        // Zero-based line index of the row within the stream
        let index = row
            .position()
            .map(|p| p.line().saturating_sub(1) as usize)
            .unwrap_or(usize::MAX);

        if is_header_line(&row, index) {
            header = Some(row.iter().map(str::to_string).collect());
            continue;
        }

        let Some(columns) = &header else {
            continue;
        };

        match decode_row(columns, &row).promote() {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::debug!("Dropped {} incomplete rows, kept {}", dropped, records.len());
    }

    records
}

fn is_blank(row: &csv::StringRecord) -> bool {
    row.iter().all(str::is_empty)
}

fn is_header_line(row: &csv::StringRecord, index: usize) -> bool {
    let mut has_result = false;
    let mut has_table = false;

    for token in row.iter() {
        match token {
            TIME_COLUMN => return true,
            "result" => has_result = true,
            "table" => has_table = true,
            _ => {}
        }
    }

    index < HEADER_SCAN_LINES && has_result && has_table
}

fn decode_row(columns: &[String], row: &csv::StringRecord) -> PartialGpsRecord {
    let mut partial = PartialGpsRecord::default();

    for (column, value) in columns.iter().zip(row.iter()) {
        if value.is_empty() || value == "null" {
            continue;
        }

        match column.as_str() {
            TIME_COLUMN => partial.timestamp = Some(value.to_string()),
            "device_id" => partial.device_id = Some(value.to_string()),
            "longitude" => partial.longitude = parse_finite(value),
            "latitude" => partial.latitude = parse_finite(value),
            "altitude" => partial.altitude = parse_finite(value),
            "priority" => partial.priority = parse_finite(value),
            "sos_signal" => partial.sos_signal = parse_bool(value),
            _ => {}
        }
    }

    partial
}

// NaN and infinities cannot be represented in the JSON envelope
fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
