//! Resolve the open-data settings: defaults, then the YAML file, then CLI
//! and environment overrides.

use std::path::Path;

use anyhow::{bail, Result};
use tracing::info;

use opendata_client::{FetchMode, OpenDataConfig};

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub schools_url: Option<String>,
    pub sat_scores_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub parallel: bool,
}

pub fn resolve(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<OpenDataConfig> {
    let mut config = match path {
        Some(path) => {
            info!(path = %path.display(), "Loading config file");
            OpenDataConfig::load(path)?
        }
        None => OpenDataConfig::default(),
    };

    if let Some(url) = &overrides.schools_url {
        config.schools_url = url.clone();
    }
    if let Some(url) = &overrides.sat_scores_url {
        config.sat_scores_url = url.clone();
    }
    if let Some(secs) = overrides.request_timeout_secs {
        config.request_timeout_secs = secs;
    }
    if overrides.parallel {
        config.fetch_mode = FetchMode::Parallel;
    }

    if config.request_timeout_secs == 0 {
        bail!("request timeout must be at least one second");
    }

    Ok(config)
}
