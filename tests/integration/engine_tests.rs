//! Integration tests for the task engine
//!
//! These tests use wiremock to stand in for the probed sites and real
//! on-disk backends to exercise restarts end-to-end.

use linkstat::config::ProberConfig;
use linkstat::storage::{JsonFileBackend, SqliteBackend, TaskStore};
use linkstat::{HttpProber, LinkstatError, TaskEngine, TaskId};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an HTTP prober with a short timeout for testing
fn test_prober() -> Arc<HttpProber> {
    let config = ProberConfig {
        timeout_secs: 1,
        ..ProberConfig::default()
    };
    Arc::new(HttpProber::new(&config).expect("Failed to build prober"))
}

fn json_engine(dir: &TempDir) -> TaskEngine {
    let backend = JsonFileBackend::new(dir.path()).expect("Failed to open data dir");
    TaskEngine::new(Arc::new(TaskStore::new(backend)), test_prober())
}

/// Starts a mock server with a reachable, a missing and a slow page
async fn start_sites() -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/up"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    mock_server
}

#[tokio::test]
async fn test_check_end_to_end() {
    let server = start_sites().await;
    let dir = TempDir::new().unwrap();
    let engine = json_engine(&dir);

    let urls = vec![
        format!("{}/up", server.uri()),
        format!("{}/slow", server.uri()),
        format!("{}/down", server.uri()),
        format!("{}/moved", server.uri()),
    ];

    let (id, links) = engine.check(urls.clone()).await.expect("Check failed");
    assert_eq!(id, TaskId::FIRST);

    // Same length, same order, each link judged on its own
    let got: Vec<_> = links.iter().map(|l| l.url.clone()).collect();
    assert_eq!(got, urls);
    let available: Vec<_> = links.iter().map(|l| l.available).collect();
    assert_eq!(available, vec![true, false, false, true]);

    let report = engine.fetch_completed(&[id]).await.unwrap();
    assert_eq!(report[&id], links);
    assert_eq!(engine.stats().await.unwrap().pending, 0);
}

#[tokio::test]
async fn test_pending_task_resumes_after_restart() {
    let server = start_sites().await;
    let dir = TempDir::new().unwrap();
    let url = format!("{}/up", server.uri());

    // First run accepts the task and "crashes" before processing it
    let id = {
        let engine = json_engine(&dir);
        engine.submit([url.clone()]).await.unwrap()
    };
    assert_eq!(id, TaskId::FIRST);

    // Second run recovers it
    let engine = json_engine(&dir);
    assert!(engine.fetch_completed(&[id]).await.unwrap().is_empty());
    assert_eq!(engine.recover_pending_tasks().await.unwrap(), 1);
    assert!(engine.wait_for_recovery(Duration::from_secs(10)).await);

    let report = engine.fetch_completed(&[id]).await.unwrap();
    assert_eq!(report[&id].len(), 1);
    assert_eq!(report[&id][0].url, url);
    assert!(report[&id][0].available);

    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.completed, 1);
}

#[tokio::test]
async fn test_sqlite_backend_survives_restart() {
    let server = start_sites().await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("linkstat.db");
    let open = || {
        let backend = SqliteBackend::new(&db_path).expect("Failed to open DB");
        TaskEngine::new(Arc::new(TaskStore::new(backend)), test_prober())
    };

    let id = open()
        .submit([format!("{}/down", server.uri())])
        .await
        .unwrap();

    let engine = open();
    assert_eq!(engine.recover_pending_tasks().await.unwrap(), 1);
    assert!(engine.wait_for_recovery(Duration::from_secs(10)).await);

    let report = engine.fetch_completed(&[id]).await.unwrap();
    assert!(!report[&id][0].available);
}

#[tokio::test]
async fn test_identifiers_never_reused_across_restarts() {
    let dir = TempDir::new().unwrap();

    {
        let engine = json_engine(&dir);
        assert_eq!(engine.submit(["a.test"]).await.unwrap().get(), 1);
        assert_eq!(engine.submit(["b.test"]).await.unwrap().get(), 2);
    }

    let engine = json_engine(&dir);
    assert_eq!(engine.submit(["c.test"]).await.unwrap().get(), 3);
}

#[tokio::test]
async fn test_fetch_completed_edge_cases() {
    let dir = TempDir::new().unwrap();
    let engine = json_engine(&dir);

    let result = engine.fetch_completed(&[]).await;
    assert!(matches!(result, Err(LinkstatError::Validation(_))));

    let report = engine.fetch_completed(&[TaskId::new(999)]).await.unwrap();
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_corrupt_completed_keeps_task_pending() {
    let server = start_sites().await;
    let dir = TempDir::new().unwrap();
    let engine = json_engine(&dir);

    let id = engine
        .submit([format!("{}/up", server.uri())])
        .await
        .unwrap();
    std::fs::write(dir.path().join("completed.json"), "{ definitely not json").unwrap();

    let result = engine.process(id).await;
    assert!(matches!(result, Err(LinkstatError::Persistence(_))));

    // The move never happened, so the task is still there to retry
    let pending = engine.store().read().await.load_pending().unwrap();
    assert!(pending.contains_key(&id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checks_on_disk() {
    let server = start_sites().await;
    let dir = TempDir::new().unwrap();
    let engine = json_engine(&dir);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            let url = format!("{}/up", server.uri());
            tokio::spawn(async move { engine.check([url]).await })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        let (id, links) = handle.await.unwrap().expect("Check failed");
        assert!(links[0].available);
        ids.push(id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);

    let report = engine.fetch_completed(&ids).await.unwrap();
    assert_eq!(report.len(), 8);
}
