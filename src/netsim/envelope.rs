//! Wire format of the bridge service.
//!
//! Every bridge response is a JSON envelope `{success, message, data, error}`;
//! query responses carry a tabular payload with column-keyed rows. Rows are
//! decoded leniently: a missing or NULL column maps to `None`/default rather
//! than an error, because the remote schema predates this service and drifts.

use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// A single result row, keyed by the (uppercase) column name.
pub type Row = serde_json::Map<String, Value>;

/// Response envelope shared by every bridge endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Tabular payload of `POST /api/tables/query`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryData {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub total_count: i64,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub page_size: i64,
}

/// Payload of `GET /api/status`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusData {
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub current_database: Option<String>,
}

/// Payload of `POST /api/database/connect`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectData {
    #[serde(default)]
    pub server_version: Option<String>,
    #[serde(default)]
    pub table_count: Option<i64>,
}

/// Payload of `POST /api/tables/order/delivery-date`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateData {
    #[serde(default)]
    pub rows_affected: i64,
}

/// One entry of `GET /api/database/files`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseFile {
    pub name: String,
    #[serde(default)]
    pub size: Option<i64>,
}

/// Reads a textual column. Firebird CHAR columns come back right-padded,
/// so trailing whitespace is stripped; blank values map to `None`.
pub fn str_field(row: &Row, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim_end();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads an integral column. The bridge renders BIGINT values as numbers
/// but some drivers stringify them.
pub fn i64_field(row: &Row, key: &str) -> Option<i64> {
    match row.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Reads a numeric column without losing scale: numbers are re-parsed from
/// their JSON rendering instead of round-tripping through f64.
pub fn decimal_field(row: &Row, key: &str) -> Option<Decimal> {
    match row.get(key)? {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Reads a flag column. The source schema stores flags as SMALLINT 0/1.
pub fn bool_field(row: &Row, key: &str) -> bool {
    match row.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().map(|v| v != 0).unwrap_or(false),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "True"),
        _ => false,
    }
}

/// Reads a DATE/TIMESTAMP column. The bridge emits ISO 8601, with or
/// without a zone designator; DATE columns come through date-only.
pub fn timestamp_field(row: &Row, key: &str) -> Option<NaiveDateTime> {
    let raw = match row.get(key)? {
        Value::String(s) => s.trim(),
        _ => return None,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn envelope_tolerates_missing_fields() {
        let env: BridgeEnvelope<QueryData> = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(env.success);
        assert!(env.data.is_none());
        assert!(env.error.is_none());
    }

    #[test]
    fn query_data_defaults_when_sparse() {
        let env: BridgeEnvelope<QueryData> =
            serde_json::from_str(r#"{"success": true, "data": {"rows": []}}"#).unwrap();
        let data = env.data.unwrap();
        assert!(data.rows.is_empty());
        assert_eq!(data.total_count, 0);
    }

    #[test]
    fn str_field_strips_char_padding() {
        let r = row(json!({"STOKKODU": "MASA-01   ", "BOS": "   "}));
        assert_eq!(str_field(&r, "STOKKODU").as_deref(), Some("MASA-01"));
        assert_eq!(str_field(&r, "BOS"), None);
        assert_eq!(str_field(&r, "YOK"), None);
    }

    #[test]
    fn i64_field_accepts_numbers_and_strings() {
        let r = row(json!({"A": 42, "B": "17", "C": 3.0}));
        assert_eq!(i64_field(&r, "A"), Some(42));
        assert_eq!(i64_field(&r, "B"), Some(17));
        assert_eq!(i64_field(&r, "C"), Some(3));
    }

    #[test]
    fn decimal_field_keeps_scale() {
        let r = row(json!({"TUTAR": 1234.5678, "FIYAT": "99.90"}));
        assert_eq!(decimal_field(&r, "TUTAR"), Some(dec!(1234.5678)));
        assert_eq!(decimal_field(&r, "FIYAT"), Some(dec!(99.90)));
    }

    #[test]
    fn bool_field_reads_smallint_flags() {
        let r = row(json!({"ONAY": 1, "KAPALI": 0, "AKTIF": "1", "X": null}));
        assert!(bool_field(&r, "ONAY"));
        assert!(!bool_field(&r, "KAPALI"));
        assert!(bool_field(&r, "AKTIF"));
        assert!(!bool_field(&r, "X"));
        assert!(!bool_field(&r, "YOK"));
    }

    #[test]
    fn timestamp_field_accepts_common_renderings() {
        let r = row(json!({
            "A": "2024-03-05T13:45:00",
            "B": "2024-03-05 13:45:00",
            "C": "2024-03-05",
            "D": "2024-03-05T13:45:00Z",
        }));
        for key in ["A", "B", "D"] {
            let dt = timestamp_field(&r, key).unwrap();
            assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-03-05 13:45");
        }
        let date_only = timestamp_field(&r, "C").unwrap();
        assert_eq!(date_only.format("%H:%M:%S").to_string(), "00:00:00");
    }
}
