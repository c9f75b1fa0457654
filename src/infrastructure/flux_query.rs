// Flux query builder for vessel GPS readings
use crate::domain::vessel_gps::QueryRequest;

const DEFAULT_START: &str = "-24h";
const DEFAULT_STOP: &str = "now()";
const FIELD_ALLOWLIST: &str = "longitude|latitude|altitude|priority|sos_signal";

/// Render a request into a Flux query, appending clauses in a fixed order
pub fn build_flux_query(bucket: &str, request: &QueryRequest) -> String {
    let mut query = format!("from(bucket: {})", flux_string(bucket));

    query.push_str(&format!(
        " |> range(start: {}, stop: {})",
        request.start_time.as_deref().unwrap_or(DEFAULT_START),
        request.end_time.as_deref().unwrap_or(DEFAULT_STOP),
    ));

    if let Some(device_id) = &request.device_id {
        query.push_str(&format!(
            " |> filter(fn: (r) => r.device_id == {})",
            flux_string(device_id)
        ));
    }

    query.push_str(&format!(
        " |> filter(fn: (r) => r._field =~ /^({})$/)",
        FIELD_ALLOWLIST
    ));
    query.push_str(r#" |> pivot(rowKey:["_time", "device_id"], columnKey: ["_field"], valueColumn: "_value")"#);

    if request.is_sos_only() {
        query.push_str(" |> filter(fn: (r) => r.sos_signal == true)");
    }

    if request.is_latest_only() {
        query.push_str(r#" |> group(columns: ["device_id"]) |> sort(columns: ["_time"]) |> last(column: "_time") |> group()"#);
    }

    if request.is_newest_first() {
        query.push_str(r#" |> sort(columns: ["_time"], desc: true)"#);
    } else {
        query.push_str(r#" |> sort(columns: ["_time"])"#);
    }

    if let Some(limit) = request.effective_limit() {
        query.push_str(&format!(" |> limit(n: {})", limit));
    }

    if let Some(offset) = request.effective_offset() {
        query.push_str(&format!(" |> offset(n: {})", offset));
    }

    query
}

/// Quote a value as a Flux string literal.
/// The value is interpolated verbatim; embedded quotes are not escaped.
pub fn flux_string(value: &str) -> String {
    format!("\"{}\"", value)
}
