//! School directory records.

use serde::Serialize;

use crate::sat::SatRecord;

/// A single row of the high school directory.
///
/// Every column is optional: the open-data feed omits keys freely, and a
/// missing column is kept as `None` rather than an empty string. The only
/// slot written after decoding is `sat_scores`, filled in by the merge step.
///
/// Serializes under the feed's column names. Decoding goes through
/// [`School::from_columns`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct School {
    /// School code (DBN), the join key against SAT results.
    pub dbn: Option<String>,
    #[serde(rename = "school_name")]
    pub name: Option<String>,
    pub borough: Option<String>,
    pub neighborhood: Option<String>,
    #[serde(rename = "primary_address_line_1")]
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub zip: Option<String>,
    pub phone_number: Option<String>,
    pub school_email: Option<String>,
    pub website: Option<String>,
    pub total_students: Option<String>,
    pub overview_paragraph: Option<String>,
    sat_scores: Option<SatRecord>,
}

impl School {
    /// Create a school with just a code and a name.
    pub fn new(dbn: &str, name: &str) -> Self {
        Self {
            dbn: Some(dbn.to_string()),
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Build a school by looking up each feed column with `column`.
    pub fn from_columns(mut column: impl FnMut(&str) -> Option<String>) -> Self {
        Self {
            dbn: column("dbn"),
            name: column("school_name"),
            borough: column("borough"),
            neighborhood: column("neighborhood"),
            address_line: column("primary_address_line_1"),
            city: column("city"),
            state_code: column("state_code"),
            zip: column("zip"),
            phone_number: column("phone_number"),
            school_email: column("school_email"),
            website: column("website"),
            total_students: column("total_students"),
            overview_paragraph: column("overview_paragraph"),
            sat_scores: None,
        }
    }

    /// The join key, trimmed. Blank codes count as missing.
    pub fn code(&self) -> Option<&str> {
        self.dbn
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    /// SAT results merged onto this school, if the school reported any.
    pub fn sat_scores(&self) -> Option<&SatRecord> {
        self.sat_scores.as_ref()
    }

    /// Return this school with its SAT slot set to `scores`.
    pub fn with_sat_scores(mut self, scores: Option<SatRecord>) -> Self {
        self.sat_scores = scores;
        self
    }

    /// Single-line address: `"addr, city, state zip"`.
    ///
    /// Missing parts render as empty strings so the separators stay put.
    pub fn display_address(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.address_line.as_deref().unwrap_or(""),
            self.city.as_deref().unwrap_or(""),
            self.state_code.as_deref().unwrap_or(""),
            self.zip.as_deref().unwrap_or("")
        )
    }
}
