use super::*;
use crate::outcome::{FailureKind, OutcomeExt};
use crate::snapshot::{FsObjectStore, MemoryObjectStore, SnapshotResolver};
use crate::structured_logger::null_logger;
use crate::types::WorkflowId;
use chrono::TimeZone;
use tempfile::tempdir;

fn config() -> ResolverConfig {
    ResolverConfig::new(Some("workflow-state".to_string()), "workflows")
}

fn aggregate(query: &str) -> WorkflowAggregate {
    WorkflowAggregate::parse(
        &json!({
            "workflowId": "wf-000123",
            "instructions": {"query": query},
            "steps": []
        })
        .to_string(),
    )
    .unwrap()
}

fn at(minute: u32) -> TimestampUtc {
    TimestampUtc::from_datetime(chrono::Utc.with_ymd_and_hms(2024, 8, 1, 10, minute, 0).unwrap())
}

#[tokio::test]
async fn written_snapshot_is_resolved_as_latest() {
    let store = Arc::new(MemoryObjectStore::new());
    let writer = SnapshotWriter::new(config(), store.clone(), null_logger());
    let resolver = SnapshotResolver::new(config(), store, null_logger());

    writer.write_at(&aggregate("first"), at(0)).await.unwrap();
    let key = writer.write_at(&aggregate("second"), at(5)).await.unwrap();

    assert!(key
        .to_string()
        .starts_with("workflows/wf-000123/2024-08-01T10:05:00.000000Z-"));
    let latest = resolver.read_latest("wf-000123").await.unwrap();
    assert_eq!(latest.instructions.query, "second");
}

#[tokio::test]
async fn each_write_gets_a_new_key() {
    let store = Arc::new(MemoryObjectStore::new());
    let writer = SnapshotWriter::new(config(), store.clone(), null_logger());

    let a = writer.write_at(&aggregate("q"), at(0)).await.unwrap();
    let b = writer.write_at(&aggregate("q"), at(0)).await.unwrap();
    assert_ne!(a, b);

    let listed = store
        .list("workflow-state", "workflows/wf-000123/")
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn invalid_aggregate_is_rejected() {
    let store = Arc::new(MemoryObjectStore::new());
    let writer = SnapshotWriter::new(config(), store, null_logger());
    let mut bad = aggregate("q");
    bad.instructions.query = String::new();

    let outcome = writer.write(&bad).await;
    assert!(outcome.is_failure_of_kind(&FailureKind::InvalidArguments));
}

#[tokio::test]
async fn nested_workflow_id_is_rejected() {
    let store = Arc::new(MemoryObjectStore::new());
    let writer = SnapshotWriter::new(config(), store.clone(), null_logger());
    let mut nested = aggregate("q");
    nested.workflow_id = WorkflowId::from("wf-000123/child");

    let outcome = writer.write(&nested).await;
    assert!(outcome.is_failure_of_kind(&FailureKind::InvalidArguments));
    assert!(store.list("workflow-state", "").await.unwrap().is_empty());
}

#[tokio::test]
async fn nested_write_does_not_shadow_parent() {
    let store = Arc::new(MemoryObjectStore::new());
    let writer = SnapshotWriter::new(config(), store.clone(), null_logger());
    let resolver = SnapshotResolver::new(config(), store, null_logger());
    let mut nested = aggregate("nested");
    nested.workflow_id = WorkflowId::from("wf-000123/child");

    writer.write_at(&aggregate("parent"), at(5)).await.unwrap();
    let _ = writer.write_at(&nested, at(0)).await;

    let latest = resolver.read_latest("wf-000123").await.unwrap();
    assert_eq!(latest.instructions.query, "parent");
}

#[tokio::test]
async fn missing_bucket_is_rejected() {
    let store = Arc::new(MemoryObjectStore::new());
    let writer = SnapshotWriter::new(ResolverConfig::new(None, "workflows"), store, null_logger());

    let outcome = writer.write(&aggregate("q")).await;
    assert!(outcome.is_failure_of_kind(&FailureKind::InvalidArguments));
}

#[tokio::test]
async fn filesystem_store_round_trip() {
    let dir = tempdir().expect("temp dir");
    let store = Arc::new(FsObjectStore::new(dir.path().to_path_buf()));
    let writer = SnapshotWriter::new(config(), store.clone(), null_logger());
    let resolver = SnapshotResolver::new(config(), store, null_logger());

    writer.write_at(&aggregate("older"), at(0)).await.unwrap();
    writer.write_at(&aggregate("newer"), at(1)).await.unwrap();

    let latest = resolver.read_latest("wf-000123").await.unwrap();
    assert_eq!(latest.instructions.query, "newer");
}
