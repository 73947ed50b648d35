//! School directory core: load both datasets, join SAT results onto
//! schools, and search the merged list.
//!
//! Layers, leaves first:
//! - [`merge`]: join-by-code of SAT records onto schools
//! - [`search`]: the query/filtered-view model
//! - [`state`]: pure load state machine wrapping the search model
//! - [`loader`]: fetch + decode + merge for one load cycle
//! - [`service`]: async adapter that owns the state, runs cancellable
//!   loads and publishes snapshots to a presentation layer

pub mod error;
pub mod loader;
pub mod merge;
pub mod search;
pub mod service;
pub mod state;

pub use error::LoadError;
pub use loader::DirectoryLoader;
pub use merge::{merge, merge_with_report, MergeReport};
pub use search::SchoolSearch;
pub use service::DirectoryService;
pub use state::{DirectoryEvent, DirectorySnapshot, DirectoryState, LoadPhase, Transition, ViewMode};
