//! Fetch and decode the two datasets of a load cycle.
//!
//! In sequential mode the SAT request is only sent once the school list has
//! been fetched and decoded; a failure there means the SAT endpoint is never
//! hit. Parallel mode sends both at once and fails if either fails. Merging
//! happens in [`DirectoryState`](crate::state::DirectoryState).

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use bytes::Bytes;
use metrics::{counter, histogram};
use tracing::{info, instrument, warn};

use opendata_client::{
    decode_sat_records, decode_schools, Fetch, FetchMode, HttpFetcher, OpenDataConfig,
};
use schools_common::{Dataset, SatRecord, School};

use crate::error::LoadError;

/// Fetches and decodes the two datasets.
#[derive(Clone)]
pub struct DirectoryLoader {
    fetcher: Arc<dyn Fetch>,
    config: OpenDataConfig,
}

impl DirectoryLoader {
    pub fn new(fetcher: Arc<dyn Fetch>, config: OpenDataConfig) -> Self {
        Self { fetcher, config }
    }

    /// Loader backed by the reqwest fetcher built from `config`.
    pub fn from_config(config: OpenDataConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::new(Arc::new(fetcher), config))
    }

    pub fn config(&self) -> &OpenDataConfig {
        &self.config
    }

    pub async fn fetch_schools(&self) -> Result<Vec<School>, LoadError> {
        let body = self.fetch_dataset(Dataset::Schools).await?;
        decode_schools(&body).map_err(|source| LoadError::Decode {
            dataset: Dataset::Schools,
            source,
        })
    }

    pub async fn fetch_sat_records(&self) -> Result<Vec<SatRecord>, LoadError> {
        let body = self.fetch_dataset(Dataset::SatScores).await?;
        decode_sat_records(&body).map_err(|source| LoadError::Decode {
            dataset: Dataset::SatScores,
            source,
        })
    }

    /// Both datasets, honouring the configured fetch mode.
    pub async fn fetch_both(&self) -> Result<(Vec<School>, Vec<SatRecord>), LoadError> {
        match self.config.fetch_mode {
            FetchMode::Sequential => {
                let schools = self.fetch_schools().await?;
                let sat_records = self.fetch_sat_records().await?;
                Ok((schools, sat_records))
            }
            FetchMode::Parallel => {
                tokio::try_join!(self.fetch_schools(), self.fetch_sat_records())
            }
        }
    }

    #[instrument(skip(self, dataset), fields(dataset = %dataset))]
    async fn fetch_dataset(&self, dataset: Dataset) -> Result<Bytes, LoadError> {
        let url = self.config.url_for(dataset);
        let started = Instant::now();

        let result = self.fetcher.fetch(url).await;

        histogram!("opendata_fetch_duration_seconds", "dataset" => dataset.as_str())
            .record(started.elapsed().as_secs_f64());

        match result {
            Ok(body) => {
                counter!("opendata_fetch_total", "dataset" => dataset.as_str(), "outcome" => "ok")
                    .increment(1);
                counter!("opendata_fetch_bytes", "dataset" => dataset.as_str())
                    .increment(body.len() as u64);
                info!(url = %url, bytes = body.len(), "Fetched dataset");
                Ok(body)
            }
            Err(source) => {
                counter!("opendata_fetch_total", "dataset" => dataset.as_str(), "outcome" => source.kind())
                    .increment(1);
                warn!(url = %url, error = %source, "Dataset fetch failed");
                Err(LoadError::Fetch { dataset, source })
            }
        }
    }
}
