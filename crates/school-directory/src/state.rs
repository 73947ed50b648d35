//! Pure load state machine for the directory.
//!
//! ```text
//! Empty ─LoadStarted─▶ Loading{schools_fetched: false}
//!       ─SchoolsLoaded─▶ Loading{schools_fetched: true}
//!       ─SatScoresLoaded─▶ Merged  (merge + replace_all happen here)
//! Loading{..} ─LoadFailed─▶ Error     (list left untouched)
//! Loading{..} ─LoadCancelled─▶ Merged if a cycle ever succeeded, else Empty
//! ```
//!
//! Events that do not fit the current phase are ignored. Query changes are
//! accepted in every phase.

use metrics::counter;
use tracing::{debug, info};

use schools_common::{SatRecord, School};

use crate::merge::{merge_with_report, MergeReport};
use crate::search::SchoolSearch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Empty,
    Loading { schools_fetched: bool },
    Merged,
    Error { message: String },
}

impl LoadPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadPhase::Loading { .. })
    }
}

/// Which view the presentation layer should index into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Filtering,
    Unfiltered,
}

#[derive(Debug, Clone)]
pub enum DirectoryEvent {
    LoadStarted,
    SchoolsLoaded(Vec<School>),
    SatScoresLoaded(Vec<SatRecord>),
    LoadFailed(String),
    LoadCancelled,
    QueryChanged(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

/// Immutable summary of the state, cheap to clone and publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySnapshot {
    pub phase: LoadPhase,
    /// `Some` once data is present and the phase is `Merged`
    pub view_mode: Option<ViewMode>,
    pub query: String,
    pub is_filtering: bool,
    pub count: usize,
    pub total: usize,
    /// Number of successful merges so far
    pub generation: u64,
}

impl Default for DirectorySnapshot {
    fn default() -> Self {
        DirectoryState::default().snapshot()
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryState {
    phase: LoadPhase,
    search: SchoolSearch,
    pending_schools: Option<Vec<School>>,
    generation: u64,
    last_report: Option<MergeReport>,
}

impl Default for DirectoryState {
    fn default() -> Self {
        Self {
            phase: LoadPhase::Empty,
            search: SchoolSearch::default(),
            pending_schools: None,
            generation: 0,
            last_report: None,
        }
    }
}

impl DirectoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: DirectoryEvent) -> Transition {
        match event {
            DirectoryEvent::LoadStarted => {
                self.pending_schools = None;
                self.phase = LoadPhase::Loading {
                    schools_fetched: false,
                };
                Transition::Applied
            }
            DirectoryEvent::SchoolsLoaded(schools) => {
                if self.phase != (LoadPhase::Loading { schools_fetched: false }) {
                    debug!(phase = ?self.phase, "Ignoring school list outside of a load");
                    return Transition::Ignored;
                }
                self.pending_schools = Some(schools);
                self.phase = LoadPhase::Loading {
                    schools_fetched: true,
                };
                Transition::Applied
            }
            DirectoryEvent::SatScoresLoaded(records) => {
                if self.phase != (LoadPhase::Loading { schools_fetched: true }) {
                    debug!(phase = ?self.phase, "Ignoring SAT results before the school list");
                    return Transition::Ignored;
                }
                let Some(schools) = self.pending_schools.take() else {
                    return Transition::Ignored;
                };

                let (merged, report) = merge_with_report(schools, &records);
                info!(
                    schools = report.schools,
                    matched = report.matched,
                    unmatched = report.unmatched_schools,
                    without_code = report.schools_without_code,
                    unused_sat = report.unused_sat_records,
                    duplicate_sat = report.duplicate_sat_codes,
                    "Merged SAT results into school list"
                );
                counter!("directory_merge_matched_total").increment(report.matched as u64);

                self.search.replace_all(merged);
                self.last_report = Some(report);
                self.generation += 1;
                self.phase = LoadPhase::Merged;
                Transition::Applied
            }
            DirectoryEvent::LoadFailed(message) => {
                if !self.phase.is_loading() {
                    return Transition::Ignored;
                }
                self.pending_schools = None;
                self.phase = LoadPhase::Error { message };
                Transition::Applied
            }
            DirectoryEvent::LoadCancelled => {
                if !self.phase.is_loading() {
                    return Transition::Ignored;
                }
                self.pending_schools = None;
                self.phase = if self.generation > 0 {
                    LoadPhase::Merged
                } else {
                    LoadPhase::Empty
                };
                Transition::Applied
            }
            DirectoryEvent::QueryChanged(query) => {
                self.search.set_query(&query);
                Transition::Applied
            }
        }
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn search(&self) -> &SchoolSearch {
        &self.search
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_merge_report(&self) -> Option<&MergeReport> {
        self.last_report.as_ref()
    }

    pub fn view_mode(&self) -> Option<ViewMode> {
        if self.phase != LoadPhase::Merged {
            return None;
        }
        Some(if self.search.is_filtering() {
            ViewMode::Filtering
        } else {
            ViewMode::Unfiltered
        })
    }

    pub fn snapshot(&self) -> DirectorySnapshot {
        DirectorySnapshot {
            phase: self.phase.clone(),
            view_mode: self.view_mode(),
            query: self.search.query().to_string(),
            is_filtering: self.search.is_filtering(),
            count: self.search.count(),
            total: self.search.total_count(),
            generation: self.generation,
        }
    }
}
