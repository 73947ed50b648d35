//! Fetch-and-decode tests using the in-memory fetcher and the mock server.

use std::sync::Arc;

use opendata_client::{FetchError, FetchMode, OpenDataConfig, StaticFetcher};
use school_directory::{DirectoryLoader, LoadError};
use schools_common::Dataset;
use test_utils::{paths, MockOpenDataServer, SAT_JSON, SCHOOLS_JSON};

const SCHOOLS: &str = "http://opendata.test/resource/s3k6-pzi2.json";
const SAT: &str = "http://opendata.test/resource/f9bf-2cp4.json";

fn config(mode: FetchMode) -> OpenDataConfig {
    OpenDataConfig {
        schools_url: SCHOOLS.to_string(),
        sat_scores_url: SAT.to_string(),
        fetch_mode: mode,
        ..OpenDataConfig::default()
    }
}

fn loader(fetcher: &Arc<StaticFetcher>, mode: FetchMode) -> DirectoryLoader {
    DirectoryLoader::new(fetcher.clone(), config(mode))
}

// ============================================================================
// Successful cycles
// ============================================================================

#[test]
fn test_fetch_both_decodes_in_order() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_body(SCHOOLS, SCHOOLS_JSON)
            .with_body(SAT, SAT_JSON),
    );

    let (schools, sat_records) =
        tokio_test::block_on(loader(&fetcher, FetchMode::Sequential).fetch_both()).unwrap();

    assert_eq!(schools.len(), 4);
    assert_eq!(schools[0].dbn.as_deref(), Some("02M260"));
    assert!(schools.iter().all(|s| s.sat_scores().is_none()));
    assert_eq!(sat_records.len(), 3);
    assert_eq!(sat_records[0].dbn.as_deref(), Some("21K728"));
    assert_eq!(fetcher.requests(), vec![SCHOOLS.to_string(), SAT.to_string()]);
}

#[tokio::test]
async fn test_parallel_mode_requests_both() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_body(SCHOOLS, SCHOOLS_JSON)
            .with_body(SAT, SAT_JSON),
    );

    let (schools, sat_records) = loader(&fetcher, FetchMode::Parallel)
        .fetch_both()
        .await
        .unwrap();

    assert_eq!(schools.len(), 4);
    assert_eq!(sat_records.len(), 3);
    let mut requested = fetcher.requests();
    requested.sort();
    let mut expected = vec![SCHOOLS.to_string(), SAT.to_string()];
    expected.sort();
    assert_eq!(requested, expected);
}

#[tokio::test]
async fn test_fetch_both_over_http() {
    let server = MockOpenDataServer::start().await;
    server.respond(paths::SCHOOLS, 200, SCHOOLS_JSON);
    server.respond(paths::SAT_SCORES, 200, SAT_JSON);

    let config = OpenDataConfig {
        schools_url: server.url(paths::SCHOOLS),
        sat_scores_url: server.url(paths::SAT_SCORES),
        ..OpenDataConfig::default()
    };
    let loader = DirectoryLoader::from_config(config).unwrap();

    let (schools, sat_records) = loader.fetch_both().await.unwrap();

    assert_eq!(schools.len(), 4);
    assert_eq!(sat_records.len(), 3);
    assert_eq!(server.hits(paths::SCHOOLS), 1);
    assert_eq!(server.hits(paths::SAT_SCORES), 1);
}

// ============================================================================
// Failures stop the cycle
// ============================================================================

#[tokio::test]
async fn test_schools_403_skips_sat_fetch() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_status(SCHOOLS, 403)
            .with_body(SAT, SAT_JSON),
    );

    let err = loader(&fetcher, FetchMode::Sequential)
        .fetch_both()
        .await
        .unwrap_err();

    assert!(err.is_access_denied());
    assert_eq!(err.dataset(), Some(Dataset::Schools));
    assert_eq!(fetcher.requests(), vec![SCHOOLS.to_string()]);
}

#[tokio::test]
async fn test_schools_decode_error_skips_sat_fetch() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_body(SCHOOLS, "<html>maintenance</html>")
            .with_body(SAT, SAT_JSON),
    );

    let err = loader(&fetcher, FetchMode::Sequential)
        .fetch_both()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LoadError::Decode {
            dataset: Dataset::Schools,
            ..
        }
    ));
    assert_eq!(fetcher.requests().len(), 1);
}

#[tokio::test]
async fn test_sat_failure_reports_sat_dataset() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_body(SCHOOLS, SCHOOLS_JSON)
            .with_body(SAT, ""),
    );

    let err = loader(&fetcher, FetchMode::Sequential)
        .fetch_both()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LoadError::Fetch {
            dataset: Dataset::SatScores,
            source: FetchError::NoData { .. },
        }
    ));
    assert!(!err.is_access_denied());
}

#[tokio::test]
async fn test_parallel_failure_yields_no_list() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_body(SCHOOLS, SCHOOLS_JSON)
            .with_status(SAT, 403),
    );

    let err = loader(&fetcher, FetchMode::Parallel)
        .fetch_both()
        .await
        .unwrap_err();

    assert!(err.is_access_denied());
    assert_eq!(err.dataset(), Some(Dataset::SatScores));
}

#[tokio::test]
async fn test_403_over_http_is_distinct_from_transport() {
    let server = MockOpenDataServer::start().await;
    server.respond(paths::SCHOOLS, 403, "");
    server.respond(paths::SAT_SCORES, 200, SAT_JSON);

    let config = OpenDataConfig {
        schools_url: server.url(paths::SCHOOLS),
        sat_scores_url: server.url(paths::SAT_SCORES),
        ..OpenDataConfig::default()
    };
    let err = DirectoryLoader::from_config(config)
        .unwrap()
        .fetch_both()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LoadError::Fetch {
            source: FetchError::AccessDenied { .. },
            ..
        }
    ));
    assert_eq!(server.hits(paths::SAT_SCORES), 0);
}
