//! Common types shared across the school directory crates.

pub mod dataset;
pub mod error;
pub mod sat;
pub mod school;

pub use dataset::Dataset;
pub use error::{DecodeError, DecodeResult};
pub use sat::{SatRecord, Score};
pub use school::School;
