//! DirectoryService tests: load lifecycle, last-good state, cancellation
//! and snapshot publishing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics::{
    Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use opendata_client::{FetchMode, OpenDataConfig, StaticFetcher};
use school_directory::{DirectoryLoader, DirectoryService, LoadError, LoadPhase, ViewMode};
use test_utils::{paths, MockOpenDataServer, SAT_JSON, SCHOOLS_JSON};

const SCHOOLS: &str = "http://opendata.test/resource/s3k6-pzi2.json";
const SAT: &str = "http://opendata.test/resource/f9bf-2cp4.json";

fn static_service(fetcher: StaticFetcher) -> DirectoryService {
    let config = OpenDataConfig {
        schools_url: SCHOOLS.to_string(),
        sat_scores_url: SAT.to_string(),
        ..OpenDataConfig::default()
    };
    DirectoryService::new(DirectoryLoader::new(Arc::new(fetcher), config))
}

fn http_service(server: &MockOpenDataServer, mode: FetchMode) -> DirectoryService {
    let config = OpenDataConfig {
        schools_url: server.url(paths::SCHOOLS),
        sat_scores_url: server.url(paths::SAT_SCORES),
        fetch_mode: mode,
        ..OpenDataConfig::default()
    };
    DirectoryService::new(DirectoryLoader::from_config(config).unwrap())
}

fn fixture_fetcher() -> StaticFetcher {
    StaticFetcher::new()
        .with_body(SCHOOLS, SCHOOLS_JSON)
        .with_body(SAT, SAT_JSON)
}

// ============================================================================
// Load lifecycle
// ============================================================================

#[tokio::test]
async fn test_new_service_is_empty() {
    let service = static_service(fixture_fetcher());
    let snapshot = service.snapshot().await;

    assert_eq!(snapshot.phase, LoadPhase::Empty);
    assert_eq!(snapshot.view_mode, None);
    assert_eq!(service.count().await, 0);
    assert!(service.item(0).await.is_none());
}

#[tokio::test]
async fn test_refresh_reaches_merged() {
    let service = static_service(fixture_fetcher());

    let snapshot = service.refresh().await.unwrap();

    assert_eq!(snapshot.phase, LoadPhase::Merged);
    assert_eq!(snapshot.view_mode, Some(ViewMode::Unfiltered));
    assert_eq!(snapshot.total, 4);
    assert_eq!(snapshot.generation, 1);

    let first = service.item(0).await.unwrap();
    assert_eq!(first.dbn.as_deref(), Some("02M260"));
    assert!(first.sat_scores().is_some());
    assert!(service.item(4).await.is_none());

    let report = service.last_merge_report().await.unwrap();
    assert_eq!(report.matched, 2);
}

#[tokio::test]
async fn test_query_drives_active_view() {
    let service = static_service(fixture_fetcher());
    service.refresh().await.unwrap();

    let snapshot = service.set_query("SCHOOL").await;
    assert!(snapshot.is_filtering);
    assert_eq!(snapshot.view_mode, Some(ViewMode::Filtering));
    assert_eq!(snapshot.count, 3);

    let names: Vec<_> = service
        .filtered_schools()
        .await
        .into_iter()
        .filter_map(|s| s.name)
        .collect();
    assert_eq!(
        names,
        vec![
            "Clinton School Writers & Artists, M.S. 260".to_string(),
            "Liberation Diploma Plus High School".to_string(),
            "The Michael J. Petrides School".to_string(),
        ]
    );

    let snapshot = service.clear_query().await;
    assert!(!snapshot.is_filtering);
    assert_eq!(snapshot.count, 4);
}

#[tokio::test]
async fn test_access_denied_never_merges() {
    let service = static_service(
        StaticFetcher::new()
            .with_status(SCHOOLS, 403)
            .with_body(SAT, SAT_JSON),
    );

    let err = service.refresh().await.unwrap_err();

    assert!(err.is_access_denied());
    let snapshot = service.snapshot().await;
    assert!(matches!(snapshot.phase, LoadPhase::Error { .. }));
    assert_eq!(snapshot.generation, 0);
    assert_eq!(snapshot.total, 0);
}

#[tokio::test]
async fn test_failed_refresh_keeps_last_good_list() {
    let server = MockOpenDataServer::start().await;
    server.respond(paths::SCHOOLS, 200, SCHOOLS_JSON);
    server.respond(paths::SAT_SCORES, 200, SAT_JSON);
    let service = http_service(&server, FetchMode::Sequential);

    service.refresh().await.unwrap();
    service.set_query("clinton").await;

    server.respond(paths::SAT_SCORES, 500, "");
    let err = service.refresh().await.unwrap_err();
    assert!(matches!(err, LoadError::Fetch { .. }));

    let snapshot = service.snapshot().await;
    match &snapshot.phase {
        LoadPhase::Error { message } => assert!(message.contains("HTTP 500")),
        other => panic!("expected error phase, got {:?}", other),
    }
    assert_eq!(snapshot.total, 4);
    assert_eq!(snapshot.count, 1);
    assert_eq!(snapshot.query, "clinton");
    assert_eq!(snapshot.generation, 1);
}

#[tokio::test]
async fn test_reload_replaces_list_and_keeps_query() {
    let server = MockOpenDataServer::start().await;
    server.respond(paths::SCHOOLS, 200, SCHOOLS_JSON);
    server.respond(paths::SAT_SCORES, 200, SAT_JSON);
    let service = http_service(&server, FetchMode::Parallel);

    service.refresh().await.unwrap();
    service.set_query("academy").await;
    assert_eq!(service.count().await, 1);

    server.respond(
        paths::SCHOOLS,
        200,
        r#"[{"dbn": "10X001", "school_name": "Bronx Academy"}, {"dbn": "10X002", "school_name": "Bronx Prep"}, {"dbn": "10X003", "school_name": "Academy of Finance"}]"#,
    );
    let snapshot = service.refresh().await.unwrap();

    assert_eq!(snapshot.total, 3);
    assert_eq!(snapshot.query, "academy");
    assert_eq!(snapshot.count, 2);
    assert_eq!(snapshot.generation, 2);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_shutdown_cancels_in_flight_load() {
    let service = Arc::new(static_service(
        fixture_fetcher().with_delay(Duration::from_secs(30)),
    ));

    let handle = service.spawn_refresh();
    tokio::time::sleep(Duration::from_millis(50)).await;
    service.shutdown();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("cancelled load should finish promptly")
        .unwrap();

    assert!(matches!(result, Err(LoadError::Cancelled)));
    assert_eq!(service.snapshot().await.phase, LoadPhase::Empty);
}

#[tokio::test]
async fn test_newer_refresh_supersedes_older() {
    let server = MockOpenDataServer::start().await;
    server.respond_with_delay(paths::SCHOOLS, 200, SCHOOLS_JSON, Duration::from_secs(30));
    server.respond(paths::SAT_SCORES, 200, SAT_JSON);
    let service = Arc::new(http_service(&server, FetchMode::Sequential));

    let slow = service.spawn_refresh();
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.respond(paths::SCHOOLS, 200, SCHOOLS_JSON);
    let snapshot = service.refresh().await.unwrap();

    assert_eq!(snapshot.phase, LoadPhase::Merged);
    assert_eq!(snapshot.generation, 1);

    let slow_result = tokio::time::timeout(Duration::from_secs(5), slow)
        .await
        .expect("superseded load should finish promptly")
        .unwrap();
    assert!(matches!(slow_result, Err(LoadError::Cancelled)));

    let after = service.snapshot().await;
    assert_eq!(after.phase, LoadPhase::Merged);
    assert_eq!(after.generation, 1);
}

#[tokio::test]
async fn test_refresh_after_shutdown_is_cancelled() {
    let service = static_service(fixture_fetcher());
    service.shutdown();

    let result = service.refresh().await;

    assert!(matches!(result, Err(LoadError::Cancelled)));
    assert_eq!(service.snapshot().await.phase, LoadPhase::Empty);
}

// ============================================================================
// Snapshot publishing
// ============================================================================

#[tokio::test]
async fn test_subscribers_see_merged_snapshot() {
    let service = static_service(fixture_fetcher());
    let mut updates = service.subscribe();

    service.refresh().await.unwrap();

    updates.changed().await.unwrap();
    let latest = updates.borrow_and_update().clone();
    assert_eq!(latest.phase, LoadPhase::Merged);
    assert_eq!(latest.total, 4);

    service.set_query("petrides").await;
    updates.changed().await.unwrap();
    let latest = updates.borrow_and_update().clone();
    assert_eq!(latest.query, "petrides");
    assert_eq!(latest.count, 1);
}

#[tokio::test]
async fn test_updates_without_subscribers_do_not_fail() {
    let service = static_service(fixture_fetcher());
    drop(service.subscribe());

    service.refresh().await.unwrap();
    let snapshot = service.set_query("x").await;

    assert!(snapshot.is_filtering);
}

// ============================================================================
// Metrics
// ============================================================================

#[derive(Default)]
struct MatchedTotal(AtomicU64);

impl CounterFn for MatchedTotal {
    fn increment(&self, value: u64) {
        self.0.fetch_add(value, Ordering::Relaxed);
    }

    fn absolute(&self, value: u64) {
        self.0.store(value, Ordering::Relaxed);
    }
}

/// Captures `directory_merge_matched_total`; everything else is a no-op.
#[derive(Default)]
struct MergeRecorder {
    matched: Arc<MatchedTotal>,
}

impl MergeRecorder {
    fn matched(&self) -> u64 {
        self.matched.0.load(Ordering::Relaxed)
    }
}

impl Recorder for MergeRecorder {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
        if key.name() == "directory_merge_matched_total" {
            Counter::from_arc(self.matched.clone())
        } else {
            Counter::noop()
        }
    }

    fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

#[test]
fn test_refresh_records_matched_schools() {
    let recorder = MergeRecorder::default();
    let service = static_service(fixture_fetcher());

    metrics::with_local_recorder(&recorder, || {
        tokio_test::block_on(service.refresh()).unwrap();
    });

    assert_eq!(recorder.matched(), 2);
}

#[test]
fn test_failed_refresh_records_no_merge() {
    let recorder = MergeRecorder::default();
    let service = static_service(StaticFetcher::new().with_status(SCHOOLS, 403));

    metrics::with_local_recorder(&recorder, || {
        tokio_test::block_on(service.refresh()).unwrap_err();
    });

    assert_eq!(recorder.matched(), 0);
}
