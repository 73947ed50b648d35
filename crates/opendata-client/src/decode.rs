//! Decode open-data payloads into typed records.
//!
//! Only the top level is strict: the payload must be a JSON array. Each
//! element is read leniently. Non-object elements are skipped, and a column
//! that is missing or has an odd type is left as `None` for that record.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use schools_common::{Dataset, DecodeError, DecodeResult, SatRecord, School};

type Row = Map<String, Value>;

/// Decode the school directory payload, preserving input order.
pub fn decode_schools(bytes: &[u8]) -> DecodeResult<Vec<School>> {
    let rows = decode_rows(bytes, Dataset::Schools)?;
    Ok(rows.iter().map(school_from_row).collect())
}

/// Decode the SAT results payload, preserving input order.
pub fn decode_sat_records(bytes: &[u8]) -> DecodeResult<Vec<SatRecord>> {
    let rows = decode_rows(bytes, Dataset::SatScores)?;
    Ok(rows.iter().map(sat_record_from_row).collect())
}

fn decode_rows(bytes: &[u8], dataset: Dataset) -> DecodeResult<Vec<Row>> {
    let payload: Value = serde_json::from_slice(bytes)?;

    let elements = match payload {
        Value::Array(elements) => elements,
        other => {
            return Err(DecodeError::NotAnArray {
                found: json_kind(&other),
            })
        }
    };

    let total = elements.len();
    let mut rows = Vec::with_capacity(total);
    for (index, element) in elements.into_iter().enumerate() {
        match element {
            Value::Object(row) => rows.push(row),
            other => {
                warn!(
                    dataset = %dataset,
                    index = index,
                    found = json_kind(&other),
                    "Skipping record that is not a JSON object"
                );
            }
        }
    }

    debug!(dataset = %dataset, total = total, decoded = rows.len(), "Decoded records");
    Ok(rows)
}

fn school_from_row(row: &Row) -> School {
    School::from_columns(|column| text(row, column))
}

fn sat_record_from_row(row: &Row) -> SatRecord {
    SatRecord::from_columns(|column| text(row, column))
}

/// Read a column as text. Numbers and booleans keep their textual form;
/// null, arrays and objects count as missing.
fn text(row: &Row, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
