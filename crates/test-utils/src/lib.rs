//! Shared test utilities for the school directory workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Open-data JSON fixtures shaped like the real NYC feeds
//! - Payload generators (large lists, malformed elements, duplicate codes)
//! - A local HTTP server that answers like the open-data API
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, MockOpenDataServer};
//! ```

pub mod fixtures;
pub mod generators;
pub mod mock_server;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use mock_server::{closed_port_url, MockOpenDataServer, RecordedRequest};

/// Assert that a list of schools has exactly these names, in this order.
///
/// Works on anything iterable whose items expose a `name: Option<String>`
/// field (owned schools or references).
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_school_names;
///
/// assert_school_names!(search.filtered_schools(), ["PS 101", "ps 22"]);
/// ```
#[macro_export]
macro_rules! assert_school_names {
    ($schools:expr, [$($name:expr),* $(,)?]) => {{
        let actual: Vec<String> = $schools
            .into_iter()
            .map(|school| school.name.clone().unwrap_or_default())
            .collect();
        let expected: Vec<String> = vec![$($name.to_string()),*];
        assert_eq!(actual, expected, "school names differ");
    }};
}
