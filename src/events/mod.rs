//! Immutable domain events with deterministic idempotency keys.
//!
//! Events are only obtainable through two factories:
//!
//! - [`Event::from_data`] mints a new identity: it validates raw input, derives
//!   the idempotency key and stamps the creation time.
//! - [`Event::reconstitute`] rehydrates a persisted identity: it re-validates
//!   the payload but keeps the stored key and timestamp as they are.
//!
//! Keeping the two paths apart means a replay or read-path bug can never mint a
//! different key for an event that was already persisted.

pub mod payloads;
pub mod validation;

pub use payloads::{JobCreated, WorkflowCreated};

use crate::outcome::{Failure, Outcome};
use crate::types::{IdempotencyKey, TimestampUtc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt::Debug;
use validation::require_present;

/// A typed event shape.
pub trait EventPayload:
    Serialize + DeserializeOwned + Clone + PartialEq + Debug + Send + Sync
{
    /// Stable event name stored alongside the payload.
    const EVENT_NAME: &'static str;

    /// Checks field rules and returns the normalized payload.
    fn validate(self) -> Outcome<Self>;

    /// Field values that identify the logical event, in a fixed order.
    fn identity(&self) -> Vec<Value>;
}

/// A validated event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<P: EventPayload> {
    idempotency_key: IdempotencyKey,
    event_data: P,
    created_at: TimestampUtc,
}

/// On-store representation of an event, keyed by `idempotency_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub idempotency_key: String,
    pub event_name: String,
    pub event_data: Map<String, Value>,
    pub created_at: String,
}

impl<P: EventPayload> Event<P> {
    /// Builds a new event from raw request data, stamped with the current time.
    pub fn from_data(raw: Option<&Value>) -> Outcome<Self> {
        Self::from_data_at(raw, TimestampUtc::now())
    }

    /// Builds a new event from raw request data with an explicit creation time.
    pub fn from_data_at(raw: Option<&Value>, created_at: TimestampUtc) -> Outcome<Self> {
        let event_data = parse_payload::<P>(raw)?;
        let idempotency_key = derive_idempotency_key(&event_data);
        Ok(Self {
            idempotency_key,
            event_data,
            created_at,
        })
    }

    /// Rehydrates an event persisted under a previously derived key.
    pub fn reconstitute(
        event_data: Option<&Value>,
        idempotency_key: Option<&str>,
        created_at: Option<&str>,
    ) -> Outcome<Self> {
        let event_data = parse_payload::<P>(event_data)?;
        let idempotency_key = require_present("idempotencyKey", idempotency_key)?;
        let created_at = require_present("createdAt", created_at)?;
        let created_at = TimestampUtc::parse_rfc3339(created_at).map_err(|e| {
            Failure::invalid_arguments(format!("createdAt is not RFC 3339: {}", e))
        })?;

        Ok(Self {
            idempotency_key: IdempotencyKey::from(idempotency_key),
            event_data,
            created_at,
        })
    }

    /// Rehydrates an event from its stored record.
    pub fn from_record(record: &EventRecord) -> Outcome<Self> {
        if record.event_name != P::EVENT_NAME {
            return Err(Failure::invalid_arguments(format!(
                "expected event {}, record holds {}",
                P::EVENT_NAME,
                record.event_name
            )));
        }
        let data = Value::Object(record.event_data.clone());
        Self::reconstitute(
            Some(&data),
            Some(&record.idempotency_key),
            Some(&record.created_at),
        )
    }

    /// Serializes the event into its stored record.
    pub fn to_record(&self) -> Outcome<EventRecord> {
        let event_data = match serde_json::to_value(&self.event_data) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(Failure::invalid_arguments(format!(
                    "{} data must serialize to an object, got {}",
                    P::EVENT_NAME,
                    other
                )))
            }
            Err(e) => {
                return Err(Failure::invalid_arguments(format!(
                    "{} data is not serializable: {}",
                    P::EVENT_NAME,
                    e
                )))
            }
        };

        Ok(EventRecord {
            idempotency_key: self.idempotency_key.0.clone(),
            event_name: P::EVENT_NAME.to_string(),
            event_data,
            created_at: self.created_at.to_rfc3339(),
        })
    }

    pub fn idempotency_key(&self) -> &IdempotencyKey {
        &self.idempotency_key
    }

    pub fn event_name(&self) -> &'static str {
        P::EVENT_NAME
    }

    pub fn event_data(&self) -> &P {
        &self.event_data
    }

    pub fn created_at(&self) -> TimestampUtc {
        self.created_at
    }
}

fn parse_payload<P: EventPayload>(raw: Option<&Value>) -> Outcome<P> {
    let raw = match raw {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        Some(other) => {
            return Err(Failure::invalid_arguments(format!(
                "{} data must be an object, got {}",
                P::EVENT_NAME,
                json_type_name(other)
            )))
        }
        None => {
            return Err(Failure::invalid_arguments(format!(
                "{} data is required",
                P::EVENT_NAME
            )))
        }
    };

    let payload: P = serde_json::from_value(raw).map_err(|e| {
        Failure::invalid_arguments(format!("invalid {} data: {}", P::EVENT_NAME, e))
    })?;
    payload.validate()
}

/// Derives `<EventName>-<sha256 hex>` over the event name and identity fields.
///
/// Identity fields are hashed as a JSON array so field boundaries stay
/// unambiguous whatever characters the values contain.
pub fn derive_idempotency_key<P: EventPayload>(payload: &P) -> IdempotencyKey {
    let mut parts = vec![Value::String(P::EVENT_NAME.to_string())];
    parts.extend(payload.identity());
    let canonical = Value::Array(parts).to_string();

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();

    IdempotencyKey(format!("{}-{}", P::EVENT_NAME, hex_encode(&digest)))
}

/// Encodes bytes as lowercase hexadecimal.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "tests/event_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/event_props.rs"]
mod props;
