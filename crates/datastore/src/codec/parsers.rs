//! Built-in codecs for the standard property types

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Number, Value as JsonValue};

use super::{encode_default, PropertyCodec};
use crate::backends::{to_iso_string, DatabaseValue};
use crate::error::{DatastoreError, DatastoreResult};

/// Largest integer a double represents exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Unique ids, model references, text, big text and email
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl PropertyCodec for StringCodec {
    fn decode_present(&self, value: &DatabaseValue) -> DatastoreResult<JsonValue> {
        Ok(JsonValue::String(stringify(value)))
    }
}

/// Integers. Text is parsed from its leading integer, floats truncate.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerCodec;

impl PropertyCodec for IntegerCodec {
    fn decode_present(&self, value: &DatabaseValue) -> DatastoreResult<JsonValue> {
        let parsed = match value {
            DatabaseValue::Int64(i) => Some(*i),
            DatabaseValue::Float64(f) if f.is_finite() => Some(f.trunc() as i64),
            DatabaseValue::String(s) => parse_leading_integer(s),
            DatabaseValue::Json(JsonValue::Number(n)) => {
                n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            }
            DatabaseValue::Json(JsonValue::String(s)) => parse_leading_integer(s),
            _ => None,
        };

        parsed
            .map(JsonValue::from)
            .ok_or_else(|| DatastoreError::decode("Integer", value, "not an integer"))
    }
}

/// Floating point numbers. Integral values come back as JSON integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberCodec;

impl PropertyCodec for NumberCodec {
    fn decode_present(&self, value: &DatabaseValue) -> DatastoreResult<JsonValue> {
        let parsed = match value {
            DatabaseValue::Int64(i) => return Ok(JsonValue::from(*i)),
            DatabaseValue::Float64(f) => Some(*f),
            DatabaseValue::String(s) => s.trim().parse::<f64>().ok(),
            DatabaseValue::Json(JsonValue::Number(n)) => n.as_f64(),
            DatabaseValue::Json(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        parsed
            .and_then(number_to_json)
            .ok_or_else(|| DatastoreError::decode("Number", value, "not a finite number"))
    }
}

/// Booleans. Non-boolean scalars are coerced by truthiness.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanCodec;

impl PropertyCodec for BooleanCodec {
    fn decode_present(&self, value: &DatabaseValue) -> DatastoreResult<JsonValue> {
        let truthy = match value {
            DatabaseValue::Bool(b) => *b,
            DatabaseValue::Int64(i) => *i != 0,
            DatabaseValue::Float64(f) => *f != 0.0 && !f.is_nan(),
            DatabaseValue::String(s) => !s.is_empty(),
            DatabaseValue::Bytes(_)
            | DatabaseValue::Uuid(_)
            | DatabaseValue::DateTime(_)
            | DatabaseValue::Date(_) => true,
            DatabaseValue::Json(json) => match json {
                JsonValue::Null => false,
                JsonValue::Bool(b) => *b,
                JsonValue::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
                JsonValue::String(s) => !s.is_empty(),
                JsonValue::Array(_) | JsonValue::Object(_) => true,
            },
            DatabaseValue::Null => false,
        };
        Ok(JsonValue::Bool(truthy))
    }
}

/// Dates and datetimes. Stored as timestamps, read back as normalized
/// ISO-8601 strings (`2022-04-03T00:00:00.000Z`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DateCodec;

impl PropertyCodec for DateCodec {
    fn encode(&self, value: &JsonValue) -> DatabaseValue {
        match value {
            JsonValue::String(s) => match parse_timestamp(s) {
                Some(dt) => DatabaseValue::DateTime(dt),
                None => DatabaseValue::String(s.clone()),
            },
            other => encode_default(other),
        }
    }

    fn decode_present(&self, value: &DatabaseValue) -> DatastoreResult<JsonValue> {
        let parsed = match value {
            DatabaseValue::DateTime(dt) => Some(*dt),
            DatabaseValue::Date(d) => midnight(d),
            DatabaseValue::String(s) => parse_timestamp(s),
            DatabaseValue::Json(JsonValue::String(s)) => parse_timestamp(s),
            DatabaseValue::Int64(millis) => Utc.timestamp_millis_opt(*millis).single(),
            _ => None,
        };

        parsed
            .map(|dt| JsonValue::String(to_iso_string(&dt)))
            .ok_or_else(|| DatastoreError::decode("Date", value, "not a valid date"))
    }
}

/// Objects and arrays, stored as JSON text
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl PropertyCodec for JsonCodec {
    fn decode_present(&self, value: &DatabaseValue) -> DatastoreResult<JsonValue> {
        match value {
            DatabaseValue::String(s) => serde_json::from_str(s)
                .map_err(|e| DatastoreError::decode("Json", value, e.to_string())),
            DatabaseValue::Bytes(b) => serde_json::from_slice(b)
                .map_err(|e| DatastoreError::decode("Json", value, e.to_string())),
            other => Ok(other.to_json()),
        }
    }
}

/// Fallback for types without a registered codec
#[derive(Debug, Clone, Copy, Default)]
pub struct BestGuessCodec;

impl PropertyCodec for BestGuessCodec {
    fn decode_present(&self, value: &DatabaseValue) -> DatastoreResult<JsonValue> {
        match value {
            DatabaseValue::Bool(_) | DatabaseValue::Int64(_) | DatabaseValue::Json(_) => {
                Ok(value.to_json())
            }
            DatabaseValue::Float64(f) => Number::from_f64(*f)
                .map(JsonValue::Number)
                .ok_or_else(|| type_resolution_error(value)),
            // Could be stringified JSON
            DatabaseValue::String(s) => Ok(serde_json::from_str(s)
                .unwrap_or_else(|_| JsonValue::String(s.clone()))),
            DatabaseValue::Uuid(_) | DatabaseValue::DateTime(_) | DatabaseValue::Date(_) => {
                Ok(value.to_json())
            }
            DatabaseValue::Bytes(_) | DatabaseValue::Null => Err(type_resolution_error(value)),
        }
    }
}

fn type_resolution_error(value: &DatabaseValue) -> DatastoreError {
    DatastoreError::TypeResolution {
        value: format!("{:?}", value),
        kind: value.kind().to_string(),
    }
}

/// Render any scalar as text
fn stringify(value: &DatabaseValue) -> String {
    match value {
        DatabaseValue::Null => "null".to_string(),
        DatabaseValue::Bool(b) => b.to_string(),
        DatabaseValue::Int64(i) => i.to_string(),
        DatabaseValue::Float64(f) => format_float(*f),
        DatabaseValue::String(s) => s.clone(),
        DatabaseValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        DatabaseValue::Uuid(u) => u.to_string(),
        DatabaseValue::DateTime(dt) => to_iso_string(dt),
        DatabaseValue::Date(d) => d.to_string(),
        DatabaseValue::Json(JsonValue::String(s)) => s.clone(),
        DatabaseValue::Json(json) => json.to_string(),
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let text = if f > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
        format!("{:.0}", f)
    } else {
        f.to_string()
    }
}

fn number_to_json(f: f64) -> Option<JsonValue> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
        return Some(JsonValue::from(f as i64));
    }
    Number::from_f64(f).map(JsonValue::Number)
}

/// Parse the leading integer of a string, ignoring whatever follows it
fn parse_leading_integer(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn midnight(date: &NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse the timestamp layouts a store may hand back
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| midnight(&d))
}
