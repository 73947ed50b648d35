//! Async adapter around [`DirectoryState`].
//!
//! Owns the state behind a read-write lock, runs load cycles and publishes
//! a [`DirectorySnapshot`] on a watch channel after every change so a
//! presentation layer can redraw.
//!
//! Loads are cancellable. Starting a new refresh cancels the one in flight,
//! and [`DirectoryService::shutdown`] (or dropping the service) cancels
//! whatever is running. A cancelled or superseded load never writes to the
//! state.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use opendata_client::FetchMode;
use schools_common::School;

use crate::error::LoadError;
use crate::loader::DirectoryLoader;
use crate::merge::MergeReport;
use crate::state::{DirectoryEvent, DirectorySnapshot, DirectoryState};

struct InFlight {
    id: u64,
    token: CancellationToken,
}

pub struct DirectoryService {
    loader: DirectoryLoader,
    state: RwLock<DirectoryState>,
    updates: watch::Sender<DirectorySnapshot>,
    current_load: Mutex<Option<InFlight>>,
    next_load_id: AtomicU64,
    shutdown: CancellationToken,
}

impl DirectoryService {
    pub fn new(loader: DirectoryLoader) -> Self {
        let (updates, _) = watch::channel(DirectorySnapshot::default());
        Self {
            loader,
            state: RwLock::new(DirectoryState::new()),
            updates,
            current_load: Mutex::new(None),
            next_load_id: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
        }
    }

    /// Receive a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<DirectorySnapshot> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> DirectorySnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn set_query(&self, text: &str) -> DirectorySnapshot {
        let mut state = self.state.write().await;
        state.apply(DirectoryEvent::QueryChanged(text.to_string()));
        let snapshot = state.snapshot();
        self.updates.send_replace(snapshot.clone());
        debug!(query = %text, count = snapshot.count, "Query updated");
        snapshot
    }

    pub async fn clear_query(&self) -> DirectorySnapshot {
        self.set_query("").await
    }

    pub async fn count(&self) -> usize {
        self.state.read().await.search().count()
    }

    /// Entry `index` of the active view, or `None` when out of range.
    pub async fn item(&self, index: usize) -> Option<School> {
        self.state.read().await.search().item(index).cloned()
    }

    /// The active view, in list order.
    pub async fn filtered_schools(&self) -> Vec<School> {
        self.state
            .read()
            .await
            .search()
            .filtered_schools()
            .cloned()
            .collect()
    }

    pub async fn last_merge_report(&self) -> Option<MergeReport> {
        self.state.read().await.last_merge_report().cloned()
    }

    /// Run one load cycle to completion.
    ///
    /// On failure the previous list stays in place and the phase becomes
    /// `Error`. Returns `LoadError::Cancelled` if this load was superseded
    /// or the service shut down before it finished.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<DirectorySnapshot, LoadError> {
        let (id, token) = self.begin_load();
        info!(load_id = id, "Starting directory load");

        let result = match self.apply_for(id, DirectoryEvent::LoadStarted).await {
            Ok(()) => self.run_load(id, &token).await,
            Err(e) => Err(e),
        };

        let outcome = match result {
            Ok(()) => {
                let snapshot = self.snapshot().await;
                info!(
                    load_id = id,
                    total = snapshot.total,
                    generation = snapshot.generation,
                    "Directory load complete"
                );
                Ok(snapshot)
            }
            Err(LoadError::Cancelled) => {
                info!(load_id = id, "Directory load cancelled");
                self.apply_for(id, DirectoryEvent::LoadCancelled).await.ok();
                Err(LoadError::Cancelled)
            }
            Err(e) => {
                error!(load_id = id, error = %e, "Directory load failed");
                self.apply_for(id, DirectoryEvent::LoadFailed(e.user_message()))
                    .await
                    .ok();
                Err(e)
            }
        };

        self.finish_load(id);
        outcome
    }

    /// Run [`refresh`](Self::refresh) on a background task.
    pub fn spawn_refresh(self: &Arc<Self>) -> JoinHandle<Result<DirectorySnapshot, LoadError>> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.refresh().await })
    }

    /// Cancel any in-flight load. Later refreshes return `Cancelled`.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    async fn run_load(&self, id: u64, token: &CancellationToken) -> Result<(), LoadError> {
        match self.loader.config().fetch_mode {
            FetchMode::Sequential => {
                let schools = cancellable(token, self.loader.fetch_schools()).await?;
                self.apply_for(id, DirectoryEvent::SchoolsLoaded(schools))
                    .await?;

                let sat_records = cancellable(token, self.loader.fetch_sat_records()).await?;
                self.apply_for(id, DirectoryEvent::SatScoresLoaded(sat_records))
                    .await
            }
            FetchMode::Parallel => {
                let (schools, sat_records) = cancellable(token, self.loader.fetch_both()).await?;
                self.apply_for(id, DirectoryEvent::SchoolsLoaded(schools))
                    .await?;
                self.apply_for(id, DirectoryEvent::SatScoresLoaded(sat_records))
                    .await
            }
        }
    }

    /// Apply `event` if load `id` is still the current one.
    async fn apply_for(&self, id: u64, event: DirectoryEvent) -> Result<(), LoadError> {
        let mut state = self.state.write().await;
        if !self.is_current(id) {
            return Err(LoadError::Cancelled);
        }
        state.apply(event);
        self.updates.send_replace(state.snapshot());
        Ok(())
    }

    fn begin_load(&self) -> (u64, CancellationToken) {
        let id = self.next_load_id.fetch_add(1, Ordering::Relaxed) + 1;
        let token = self.shutdown.child_token();

        let previous = self.lock_current().replace(InFlight {
            id,
            token: token.clone(),
        });
        if let Some(previous) = previous {
            debug!(superseded = previous.id, load_id = id, "Cancelling superseded load");
            previous.token.cancel();
        }

        (id, token)
    }

    fn finish_load(&self, id: u64) {
        let mut current = self.lock_current();
        if current.as_ref().map_or(false, |load| load.id == id) {
            current.take();
        }
    }

    fn is_current(&self, id: u64) -> bool {
        self.lock_current()
            .as_ref()
            .map_or(false, |load| load.id == id)
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.current_load
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DirectoryService {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn cancellable<T, F>(token: &CancellationToken, work: F) -> Result<T, LoadError>
where
    F: Future<Output = Result<T, LoadError>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(LoadError::Cancelled),
        result = work => result,
    }
}
