//! Endpoint and HTTP settings for the open-data client.
//!
//! Loaded from an optional YAML file; every key has a default, so an empty
//! file (or no file) talks to the public NYC endpoints.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use schools_common::Dataset;

/// DOE high school directory.
pub const SCHOOLS_URL: &str = "https://data.cityofnewyork.us/resource/s3k6-pzi2.json";

/// SAT results by school.
pub const SAT_SCORES_URL: &str = "https://data.cityofnewyork.us/resource/f9bf-2cp4.json";

/// How the two datasets are requested during a load cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// SAT results are requested only after the directory decoded cleanly.
    #[default]
    Sequential,
    /// Both requests go out together; merge waits for both.
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenDataConfig {
    pub schools_url: String,
    pub sat_scores_url: String,
    /// Whole-request timeout
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    pub fetch_mode: FetchMode,
}

impl Default for OpenDataConfig {
    fn default() -> Self {
        Self {
            schools_url: SCHOOLS_URL.to_string(),
            sat_scores_url: SAT_SCORES_URL.to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("school-directory/{}", env!("CARGO_PKG_VERSION")),
            fetch_mode: FetchMode::Sequential,
        }
    }
}

impl OpenDataConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: OpenDataConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded open-data config");
        Ok(config)
    }

    pub fn url_for(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::Schools => &self.schools_url,
            Dataset::SatScores => &self.sat_scores_url,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
