//! Client for the NYC open-data school datasets.
//!
//! Two layers, kept apart so each can be tested alone:
//! - [`Fetch`]: GET a URL and hand back the raw body, or a typed failure
//! - [`decode`]: turn a body into ordered `School` / `SatRecord` lists
//!
//! [`OpenDataConfig`] carries the endpoints and HTTP timeouts.

pub mod config;
pub mod decode;
pub mod error;
pub mod fetch;

pub use config::{FetchMode, OpenDataConfig, SAT_SCORES_URL, SCHOOLS_URL};
pub use decode::{decode_sat_records, decode_schools};
pub use error::FetchError;
pub use fetch::{parse_url, Fetch, HttpFetcher, StaticFetcher, StaticResponse};
