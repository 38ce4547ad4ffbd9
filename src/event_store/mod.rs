//! Idempotent, append-only event log.
//!
//! Every record is keyed by its event's idempotency key and the backend
//! inserts only when the key is absent. Publishing the same logical event
//! twice therefore persists exactly one record; the second attempt reports
//! [`FailureKind::DuplicateEvent`](crate::outcome::FailureKind::DuplicateEvent),
//! which callers treat as an already-applied success.

pub mod file_store;
pub mod memory_log;

pub use file_store::FileEventLog;
pub use memory_log::MemoryEventLog;

use crate::events::{Event, EventPayload, EventRecord};
use crate::outcome::{Failure, FailureKind, Outcome};
use crate::structured_logger::EngineLogger;
use crate::types::IdempotencyKey;
use async_trait::async_trait;
use serde_json::json;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

const COMPONENT: &str = "EventStore";

/// Errors raised by an event log backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventLogError {
    /// A record with this key already exists.
    AlreadyExists { key: String },
    /// No record with this key exists.
    NotFound { key: String },
    /// Connectivity, I/O, throttling or malformed data.
    Backend { message: String },
}

impl Display for EventLogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists { key } => write!(f, "record already exists: {}", key),
            Self::NotFound { key } => write!(f, "record not found: {}", key),
            Self::Backend { message } => write!(f, "event log backend error: {}", message),
        }
    }
}

impl std::error::Error for EventLogError {}

impl EventLogError {
    pub fn backend(message: impl Display) -> Self {
        Self::Backend {
            message: message.to_string(),
        }
    }
}

/// Durable keyed store for event records.
#[async_trait]
pub trait EventLogBackend: Send + Sync {
    /// Inserts `record` only if no record with its key exists.
    ///
    /// Must be atomic with respect to concurrent writers of the same key.
    async fn insert_if_absent(&self, record: EventRecord) -> Result<(), EventLogError>;

    /// Reads the record stored under `key`.
    async fn get(&self, key: &str) -> Result<EventRecord, EventLogError>;
}

/// Publishes events to a backend and classifies every outcome.
pub struct EventStore<B: EventLogBackend> {
    backend: B,
    logger: Arc<dyn EngineLogger>,
}

impl<B: EventLogBackend> EventStore<B> {
    pub fn new(backend: B, logger: Arc<dyn EngineLogger>) -> Self {
        Self { backend, logger }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Appends `event` unless its idempotency key was already published.
    ///
    /// - key already present: `DuplicateEvent`, not transient
    /// - any other backend failure: `Unrecognized`, transient
    pub async fn publish<P: EventPayload>(&self, event: &Event<P>) -> Outcome<()> {
        let record = event.to_record()?;
        let key = record.idempotency_key.clone();

        match self.backend.insert_if_absent(record).await {
            Ok(()) => {
                self.logger.log(
                    COMPONENT,
                    json!({
                        "type": "EventPublished",
                        "idempotencyKey": key,
                        "eventName": event.event_name(),
                    }),
                );
                Ok(())
            }
            Err(EventLogError::AlreadyExists { .. }) => {
                self.logger.log(
                    COMPONENT,
                    json!({
                        "type": "DuplicateEvent",
                        "idempotencyKey": key,
                        "eventName": event.event_name(),
                    }),
                );
                Err(Failure::duplicate_event(format!(
                    "event {} was already published",
                    key
                )))
            }
            Err(e) => {
                self.logger.log(
                    COMPONENT,
                    json!({
                        "type": "PublishFailed",
                        "idempotencyKey": key,
                        "error": e.to_string(),
                    }),
                );
                Err(Failure::unrecognized(e.to_string()))
            }
        }
    }

    /// Reads a published event back and rehydrates it without re-deriving its key.
    pub async fn load<P: EventPayload>(&self, key: &IdempotencyKey) -> Outcome<Event<P>> {
        if key.as_str().trim().is_empty() {
            return Err(Failure::invalid_arguments("idempotencyKey is required"));
        }

        let record = match self.backend.get(key.as_str()).await {
            Ok(record) => record,
            Err(EventLogError::NotFound { key }) => {
                return Err(Failure::not_found(format!("no event stored under {}", key)))
            }
            Err(e) => return Err(Failure::unrecognized(e.to_string())),
        };

        Event::<P>::from_record(&record).map_err(|failure| {
            if failure.kind == FailureKind::InvalidArguments {
                self.logger.log(
                    COMPONENT,
                    json!({
                        "type": "CorruptedRecord",
                        "idempotencyKey": key.as_str(),
                        "error": failure.detail,
                    }),
                );
                Failure::corrupted(format!("stored event {} is invalid: {}", key, failure.detail))
            } else {
                failure
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/event_store_tests.rs"]
mod tests;
