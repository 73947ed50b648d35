//! Identifiers for the two open-data datasets the directory is built from.

use std::fmt;

use serde::Serialize;

/// One of the open-data datasets fetched during a load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    /// High school directory (one row per school).
    Schools,
    /// SAT results (one row per reporting school).
    SatScores,
}

impl Dataset {
    /// Short label used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Schools => "schools",
            Dataset::SatScores => "sat_scores",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
