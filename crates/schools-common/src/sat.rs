//! SAT result records.

use serde::Serialize;

/// One row of the SAT results dataset.
///
/// Numeric columns are kept exactly as served; use the typed accessors to
/// read them. The feed marks suppressed values with `"s"`.
///
/// Serializes under the feed's column names. Decoding goes through
/// [`SatRecord::from_columns`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SatRecord {
    /// School code (DBN), the join key against the directory.
    pub dbn: Option<String>,
    pub school_name: Option<String>,
    #[serde(rename = "num_of_sat_test_takers")]
    pub test_takers: Option<String>,
    #[serde(rename = "sat_critical_reading_avg_score")]
    pub critical_reading_avg: Option<String>,
    #[serde(rename = "sat_math_avg_score")]
    pub math_avg: Option<String>,
    #[serde(rename = "sat_writing_avg_score")]
    pub writing_avg: Option<String>,
}

/// A parsed numeric column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Score {
    Reported(u32),
    /// Withheld by the publisher (too few test takers).
    Suppressed,
    /// Present but not a number we understand.
    Unparsed(String),
}

impl Score {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("s") {
            return Score::Suppressed;
        }
        match trimmed.parse::<u32>() {
            Ok(value) => Score::Reported(value),
            Err(_) => Score::Unparsed(trimmed.to_string()),
        }
    }

    pub fn value(&self) -> Option<u32> {
        match self {
            Score::Reported(value) => Some(*value),
            _ => None,
        }
    }
}

impl SatRecord {
    /// Create a record with every section reported.
    pub fn new(dbn: &str, test_takers: u32, reading: u32, math: u32, writing: u32) -> Self {
        Self {
            dbn: Some(dbn.to_string()),
            school_name: None,
            test_takers: Some(test_takers.to_string()),
            critical_reading_avg: Some(reading.to_string()),
            math_avg: Some(math.to_string()),
            writing_avg: Some(writing.to_string()),
        }
    }

    /// Build a record by looking up each feed column with `column`.
    pub fn from_columns(mut column: impl FnMut(&str) -> Option<String>) -> Self {
        Self {
            dbn: column("dbn"),
            school_name: column("school_name"),
            test_takers: column("num_of_sat_test_takers"),
            critical_reading_avg: column("sat_critical_reading_avg_score"),
            math_avg: column("sat_math_avg_score"),
            writing_avg: column("sat_writing_avg_score"),
        }
    }

    /// The join key, trimmed. Blank codes count as missing.
    pub fn code(&self) -> Option<&str> {
        self.dbn
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    pub fn test_takers(&self) -> Option<Score> {
        self.test_takers.as_deref().map(Score::parse)
    }

    pub fn critical_reading(&self) -> Option<Score> {
        self.critical_reading_avg.as_deref().map(Score::parse)
    }

    pub fn math(&self) -> Option<Score> {
        self.math_avg.as_deref().map(Score::parse)
    }

    pub fn writing(&self) -> Option<Score> {
        self.writing_avg.as_deref().map(Score::parse)
    }

    /// Sum of the three section averages, when all three are reported.
    ///
    /// `None` if the sum does not fit in a `u32`.
    pub fn combined_average(&self) -> Option<u32> {
        let reading = self.critical_reading()?.value()?;
        let math = self.math()?.value()?;
        let writing = self.writing()?.value()?;
        reading.checked_add(math)?.checked_add(writing)
    }
}
