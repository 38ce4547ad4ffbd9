//! In-process event log backend.

use super::{EventLogBackend, EventLogError};
use crate::events::EventRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Event log held in memory. The map lock makes check-and-insert atomic.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    records: Mutex<HashMap<String, EventRecord>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventLogBackend for MemoryEventLog {
    async fn insert_if_absent(&self, record: EventRecord) -> Result<(), EventLogError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| EventLogError::backend(format!("event log lock poisoned: {}", e)))?;

        if records.contains_key(&record.idempotency_key) {
            return Err(EventLogError::AlreadyExists {
                key: record.idempotency_key,
            });
        }
        records.insert(record.idempotency_key.clone(), record);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<EventRecord, EventLogError> {
        let records = self
            .records
            .lock()
            .map_err(|e| EventLogError::backend(format!("event log lock poisoned: {}", e)))?;

        records
            .get(key)
            .cloned()
            .ok_or_else(|| EventLogError::NotFound {
                key: key.to_string(),
            })
    }
}
