use super::*;
use crate::event_store::MemoryEventLog;
use crate::snapshot::{MemoryObjectStore, ResolverConfig};
use crate::structured_logger::null_logger;
use std::sync::Arc;

fn handlers(bucket: Option<&str>) -> EngineHandlers<MemoryEventLog, MemoryObjectStore> {
    let config = ResolverConfig::new(bucket.map(str::to_string), "workflows");
    let store = Arc::new(MemoryObjectStore::new());
    EngineHandlers::new(
        EventStore::new(MemoryEventLog::new(), null_logger()),
        SnapshotResolver::new(config.clone(), store.clone(), null_logger()),
        SnapshotWriter::new(config, store, null_logger()),
    )
}

fn workflow_body(workflow_id: &str) -> Value {
    json!({
        "workflowId": workflow_id,
        "instructions": {"query": "summarize the report", "responseEnhanceRounds": 2},
        "steps": [{
            "stepId": "step-1",
            "executionOrder": 1,
            "stepStatus": "Completed",
            "assistant": {
                "name": "Researcher",
                "role": "researcher",
                "system": "You research.",
                "prompt": "{query}",
                "phaseName": "research"
            },
            "llmSystem": "You research.",
            "llmPrompt": "summarize the report",
            "llmResult": "done"
        }]
    })
}

#[test]
fn status_mapping() {
    assert_eq!(status_for(&Failure::invalid_arguments("x")), 400);
    assert_eq!(status_for(&Failure::duplicate_event("x")), 200);
    assert_eq!(status_for(&Failure::not_found("x")), 404);
    assert_eq!(status_for(&Failure::corrupted("x")), 422);
    assert_eq!(status_for(&Failure::unrecognized("x")), 500);
    let domain = Failure::new(FailureKind::Domain("QuotaExceeded".to_string()), "x", false);
    assert_eq!(status_for(&domain), 500);
}

#[test]
fn failure_body_carries_kind_and_transience() {
    let response = HandlerResponse::from_failure(&Failure::unrecognized("timeout"));
    assert_eq!(response.status, 500);
    assert_eq!(response.body["detail"], "timeout");
    assert_eq!(response.body["transient"], true);
    assert!(!response.is_success());
}

#[tokio::test]
async fn duplicate_publish_is_a_success() {
    let handlers = handlers(Some("workflow-state"));
    let data = json!({"jobId": "job-123456", "created": true});

    let first = handlers.publish_job_created(Some(&data)).await;
    let second = handlers.publish_job_created(Some(&data)).await;

    assert_eq!(first.status, 201);
    assert_eq!(first.body["duplicate"], false);
    assert_eq!(second.status, 200);
    assert_eq!(second.body["duplicate"], true);
    assert_eq!(first.body["idempotencyKey"], second.body["idempotencyKey"]);
}

#[tokio::test]
async fn invalid_publish_is_bad_request() {
    let handlers = handlers(Some("workflow-state"));

    assert_eq!(handlers.publish_job_created(None).await.status, 400);
    let response = handlers
        .publish_workflow_created(Some(&json!({
            "workflowId": "wf-000123",
            "objectKey": "queries/wf-000123.json",
            "promptEnhanceRounds": 0,
            "responseEnhanceRounds": 1
        })))
        .await;
    assert_eq!(response.status, 400);
    assert_eq!(response.body["transient"], false);
}

#[tokio::test]
async fn write_then_read_latest() {
    let handlers = handlers(Some("workflow-state"));

    let written = handlers.write_snapshot(Some(&workflow_body("wf-000123"))).await;
    assert_eq!(written.status, 201);
    assert!(written.body["key"]
        .as_str()
        .unwrap()
        .starts_with("workflows/wf-000123/"));

    let read = handlers.read_latest_workflow("wf-000123").await;
    assert_eq!(read.status, 200);
    assert_eq!(read.body, workflow_body("wf-000123"));
}

#[tokio::test]
async fn read_latest_failures_map_to_statuses() {
    assert_eq!(
        handlers(Some("workflow-state"))
            .read_latest_workflow("wf-unknown")
            .await
            .status,
        404
    );
    assert_eq!(handlers(None).read_latest_workflow("wf-000123").await.status, 400);
    assert_eq!(
        handlers(Some("workflow-state"))
            .read_latest_workflow("  ")
            .await
            .status,
        400
    );
}

#[tokio::test]
async fn malformed_snapshot_input_is_bad_request() {
    let handlers = handlers(Some("workflow-state"));

    assert_eq!(handlers.write_snapshot(None).await.status, 400);
    let response = handlers
        .write_snapshot(Some(&json!({"shape": "unknown"})))
        .await;
    assert_eq!(response.status, 400);
}
