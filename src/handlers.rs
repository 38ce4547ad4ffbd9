//! Boundary adapters between inbound requests and the engine.
//!
//! Each handler turns an `Outcome` into a [`HandlerResponse`] carrying an
//! HTTP-style status. Duplicate publishes are successes at this layer: the
//! caller's intent (the event exists exactly once) is satisfied.

use crate::event_store::{EventLogBackend, EventStore};
use crate::events::{Event, EventPayload, JobCreated, WorkflowCreated};
use crate::outcome::{Failure, FailureKind, Outcome};
use crate::snapshot::{ObjectStore, SnapshotResolver, SnapshotWriter};
use crate::workflow::WorkflowAggregate;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: Value,
}

impl HandlerResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn from_failure(failure: &Failure) -> Self {
        Self::new(
            status_for(failure),
            json!({
                "error": failure.kind.display_name(),
                "detail": failure.detail,
                "transient": failure.transient,
            }),
        )
    }

    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// Maps a failure to its boundary status.
pub fn status_for(failure: &Failure) -> u16 {
    match failure.kind {
        FailureKind::InvalidArguments => 400,
        FailureKind::DuplicateEvent => 200,
        FailureKind::NotFound => 404,
        FailureKind::Corrupted => 422,
        FailureKind::Unrecognized | FailureKind::Domain(_) => 500,
    }
}

pub struct EngineHandlers<B: EventLogBackend, S: ObjectStore> {
    events: EventStore<B>,
    resolver: SnapshotResolver<S>,
    writer: SnapshotWriter<S>,
}

impl<B: EventLogBackend, S: ObjectStore> EngineHandlers<B, S> {
    pub fn new(
        events: EventStore<B>,
        resolver: SnapshotResolver<S>,
        writer: SnapshotWriter<S>,
    ) -> Self {
        Self {
            events,
            resolver,
            writer,
        }
    }

    pub async fn publish_job_created(&self, data: Option<&Value>) -> HandlerResponse {
        self.publish::<JobCreated>(data).await
    }

    pub async fn publish_workflow_created(&self, data: Option<&Value>) -> HandlerResponse {
        self.publish::<WorkflowCreated>(data).await
    }

    async fn publish<P: EventPayload>(&self, data: Option<&Value>) -> HandlerResponse {
        let event = match Event::<P>::from_data(data) {
            Ok(event) => event,
            Err(failure) => return HandlerResponse::from_failure(&failure),
        };
        let body = |duplicate: bool| {
            json!({
                "idempotencyKey": event.idempotency_key().as_str(),
                "eventName": event.event_name(),
                "duplicate": duplicate,
            })
        };

        match self.events.publish(&event).await {
            Ok(()) => HandlerResponse::new(201, body(false)),
            Err(failure) if failure.kind == FailureKind::DuplicateEvent => {
                HandlerResponse::new(status_for(&failure), body(true))
            }
            Err(failure) => HandlerResponse::from_failure(&failure),
        }
    }

    pub async fn read_latest_workflow(&self, workflow_id: &str) -> HandlerResponse {
        respond(self.resolver.read_latest(workflow_id).await, |aggregate| {
            serde_json::to_value(aggregate)
                .map(|body| HandlerResponse::new(200, body))
                .unwrap_or_else(|e| {
                    HandlerResponse::from_failure(&Failure::unrecognized(format!(
                        "serializing workflow failed: {}",
                        e
                    )))
                })
        })
    }

    /// Persists a caller-supplied aggregate as a new snapshot.
    pub async fn write_snapshot(&self, data: Option<&Value>) -> HandlerResponse {
        let aggregate = match parse_inbound_aggregate(data) {
            Ok(aggregate) => aggregate,
            Err(failure) => return HandlerResponse::from_failure(&failure),
        };
        respond(self.writer.write(&aggregate).await, |key| {
            HandlerResponse::new(201, json!({ "key": key.to_string() }))
        })
    }
}

fn respond<T>(outcome: Outcome<T>, on_success: impl FnOnce(T) -> HandlerResponse) -> HandlerResponse {
    match outcome {
        Ok(value) => on_success(value),
        Err(failure) => HandlerResponse::from_failure(&failure),
    }
}

/// Inbound bodies are caller input, so shape problems are `InvalidArguments`
/// rather than `Corrupted`.
fn parse_inbound_aggregate(data: Option<&Value>) -> Outcome<WorkflowAggregate> {
    let data = data.ok_or_else(|| Failure::invalid_arguments("workflow body is required"))?;
    WorkflowAggregate::parse(&data.to_string())
        .map_err(|failure| Failure::invalid_arguments(failure.detail))
}

#[cfg(test)]
#[path = "tests/handlers_tests.rs"]
mod tests;
