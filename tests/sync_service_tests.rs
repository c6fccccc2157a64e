//! End-to-end runs over a feed file against a scripted catalog

mod common;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::NamedTempFile;

use common::{Call, FakeCatalog, LogCapture, WriteFailure};
use stock_sync_lib::application::{StockReconciler, SyncService};
use stock_sync_lib::domain::{FetchError, LocationId};
use stock_sync_lib::infrastructure::feed_source::FileFeedSource;

const EXAMPLE_FEED: &str = "ean;stock;name\n111;5;Widget\n;3;Blank\n222;abc;Broken\n333;0;Gadget\n";

fn feed_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn service(path: PathBuf, catalog: &Arc<FakeCatalog>) -> SyncService<FakeCatalog> {
    let reconciler = StockReconciler::new(Arc::clone(catalog), LocationId::new("655441491"));
    SyncService::new(Box::new(FileFeedSource::new(path)), reconciler)
}

#[tokio::test(start_paused = true)]
async fn example_feed_runs_end_to_end() {
    let feed = feed_file(EXAMPLE_FEED);
    let catalog = Arc::new(FakeCatalog::new().with_item("111", "INV-1"));

    let summary = service(feed.path().to_path_buf(), &catalog).run().await.unwrap();

    assert_eq!(summary.parse.rows_read, 4);
    assert_eq!(summary.parse.rows_accepted, 2);
    assert_eq!(summary.parse.rows_rejected, 2);
    assert!(!summary.parse.truncated);
    assert_eq!(summary.written, 1);
    assert_eq!(summary.skipped_no_match, 1);
    assert_eq!(summary.items_processed(), 2);
    assert!(summary.finished_at.is_some());

    let lookups: Vec<Call> = catalog
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::Lookup(_)))
        .collect();
    assert_eq!(
        lookups,
        vec![Call::Lookup("111".to_string()), Call::Lookup("333".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn item_failures_never_fail_the_run() {
    let feed = feed_file("ean;stock\n111;1\n222;2\n333;3\n");
    let catalog = Arc::new(
        FakeCatalog::new()
            .with_item("111", "INV-1")
            .with_item("222", "INV-2")
            .with_item("333", "INV-3")
            .with_lookup_failure("111")
            .with_write_failure("INV-2", WriteFailure::AlwaysReset),
    );

    let summary = service(feed.path().to_path_buf(), &catalog).run().await.unwrap();

    assert_eq!(summary.abandoned, 2);
    assert_eq!(summary.written, 1);
    assert_eq!(summary.write_retries, 2);
}

#[tokio::test(start_paused = true)]
async fn header_only_feed_does_nothing() {
    let feed = feed_file("ean;stock\n");
    let catalog = Arc::new(FakeCatalog::new());

    let summary = service(feed.path().to_path_buf(), &catalog).run().await.unwrap();

    assert_eq!(summary.parse.rows_read, 0);
    assert_eq!(summary.items_processed(), 0);
    assert!(catalog.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_feed_file_is_a_fetch_error() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Arc::new(FakeCatalog::new());

    let result = service(dir.path().join("absent.csv"), &catalog).run().await;

    assert!(matches!(result, Err(FetchError::Io { .. })));
    assert!(catalog.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn rejected_rows_are_logged_before_validation() {
    let logs = LogCapture::default();
    let _guard = logs.install();
    let feed = feed_file(EXAMPLE_FEED);
    let catalog = Arc::new(FakeCatalog::new().with_item("111", "INV-1"));

    let summary = service(feed.path().to_path_buf(), &catalog).run().await.unwrap();
    assert_eq!(summary.parse.rows_rejected, 2);

    let output = logs.contents();
    let received = output.lines().filter(|line| line.contains("Row received")).count();
    assert_eq!(received, 4, "{output}");
    assert!(output.contains(r#""stock": "abc""#), "{output}");
    assert!(output.contains("Skipping row"), "{output}");
}
