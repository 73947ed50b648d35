//! Load cycle failures.

use thiserror::Error;

use opendata_client::FetchError;
use schools_common::{Dataset, DecodeError};

/// Why a load cycle stopped before the merge.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to fetch {dataset}: {source}")]
    Fetch {
        dataset: Dataset,
        #[source]
        source: FetchError,
    },

    #[error("Failed to decode {dataset}: {source}")]
    Decode {
        dataset: Dataset,
        #[source]
        source: DecodeError,
    },

    #[error("Load cancelled")]
    Cancelled,
}

impl LoadError {
    /// The dataset whose step failed, if any.
    pub fn dataset(&self) -> Option<Dataset> {
        match self {
            LoadError::Fetch { dataset, .. } | LoadError::Decode { dataset, .. } => Some(*dataset),
            LoadError::Cancelled => None,
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, LoadError::Fetch { source, .. } if source.is_access_denied())
    }

    /// Text a shell can show to a person.
    pub fn user_message(&self) -> String {
        let what = match self.dataset() {
            Some(Dataset::Schools) => "the school list",
            Some(Dataset::SatScores) => "SAT results",
            None => "school data",
        };

        match self {
            LoadError::Fetch { source, .. } => match source {
                FetchError::AccessDenied { .. } => format!(
                    "Access to {} was denied by the open-data service. Check the endpoint URL.",
                    what
                ),
                FetchError::InvalidUrl { url, .. } => {
                    format!("The address configured for {} is not valid: {}", what, url)
                }
                FetchError::NoData { .. } => {
                    format!("The open-data service returned no data for {}.", what)
                }
                FetchError::UnexpectedStatus { status, .. } => format!(
                    "The open-data service answered with HTTP {} for {}. Try again later.",
                    status, what
                ),
                FetchError::Transport { .. } => format!(
                    "Could not reach the open-data service to load {}. Check your connection.",
                    what
                ),
            },
            LoadError::Decode { .. } => {
                format!("The data received for {} could not be read.", what)
            }
            LoadError::Cancelled => "Loading was cancelled.".to_string(),
        }
    }
}
