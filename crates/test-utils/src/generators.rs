//! Payload generators for open-data style JSON.
//!
//! Generated rows use predictable codes so assertions can be written
//! against them: school `i` has code `format!("{:02}X{:03}", i % 32, i)`.

use serde_json::{json, Value};

/// The code generated for school number `index`.
pub fn school_code(index: usize) -> String {
    format!("{:02}X{:03}", index % 32, index)
}

/// A JSON array of `count` school rows named `"School {index}"`.
pub fn school_rows_json(count: usize) -> String {
    let rows: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "dbn": school_code(i),
                "school_name": format!("School {}", i),
                "city": "New York",
                "state_code": "NY",
                "zip": format!("{:05}", 10000 + i),
            })
        })
        .collect();
    Value::Array(rows).to_string()
}

/// A JSON array of SAT rows, one per code, all sections reported.
///
/// The math average of each row is `400 + position` so tie-breaks between
/// duplicate codes can be told apart.
pub fn sat_rows_json(codes: &[&str]) -> String {
    let rows: Vec<Value> = codes
        .iter()
        .enumerate()
        .map(|(position, code)| {
            json!({
                "dbn": code,
                "num_of_sat_test_takers": "50",
                "sat_critical_reading_avg_score": "400",
                "sat_math_avg_score": (400 + position).to_string(),
                "sat_writing_avg_score": "400",
            })
        })
        .collect();
    Value::Array(rows).to_string()
}

/// Like [`school_rows_json`], but element `bad_index` is replaced by a
/// bare number instead of an object.
pub fn school_rows_with_malformed_json(count: usize, bad_index: usize) -> String {
    let rows: Vec<Value> = (0..count)
        .map(|i| {
            if i == bad_index {
                json!(12345)
            } else {
                json!({
                    "dbn": school_code(i),
                    "school_name": format!("School {}", i),
                })
            }
        })
        .collect();
    Value::Array(rows).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_school_rows_json_count() {
        let rows: Vec<Value> = serde_json::from_str(&school_rows_json(10)).unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[3]["dbn"], school_code(3));
    }

    #[test]
    fn test_malformed_row_position() {
        let rows: Vec<Value> =
            serde_json::from_str(&school_rows_with_malformed_json(10, 4)).unwrap();
        assert!(rows[4].is_number());
        assert!(rows[5].is_object());
    }
}
