//! Appends new snapshots. Existing snapshots are never rewritten.

use super::{ObjectStore, ResolverConfig, SnapshotKey};
use crate::outcome::{Failure, Outcome};
use crate::structured_logger::EngineLogger;
use crate::types::TimestampUtc;
use crate::workflow::WorkflowAggregate;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

const COMPONENT: &str = "SnapshotWriter";

/// Writes a fresh snapshot every time a workflow advances.
pub struct SnapshotWriter<S: ObjectStore> {
    config: ResolverConfig,
    store: Arc<S>,
    logger: Arc<dyn EngineLogger>,
}

impl<S: ObjectStore> SnapshotWriter<S> {
    pub fn new(config: ResolverConfig, store: Arc<S>, logger: Arc<dyn EngineLogger>) -> Self {
        Self {
            config,
            store,
            logger,
        }
    }

    /// Stores `aggregate` under a new key stamped with the current time.
    pub async fn write(&self, aggregate: &WorkflowAggregate) -> Outcome<SnapshotKey> {
        self.write_at(aggregate, TimestampUtc::now()).await
    }

    /// Stores `aggregate` under a new key stamped with `at`.
    pub async fn write_at(
        &self,
        aggregate: &WorkflowAggregate,
        at: TimestampUtc,
    ) -> Outcome<SnapshotKey> {
        aggregate
            .validate()
            .map_err(|failure| Failure::invalid_arguments(failure.detail))?;
        let bucket = self
            .config
            .bucket()
            .ok_or_else(|| Failure::invalid_arguments("snapshot bucket is not configured"))?;

        let suffix = Uuid::new_v4().simple().to_string();
        let key = SnapshotKey::new(&self.config.prefix, &aggregate.workflow_id, at.0, &suffix);
        let body = aggregate.to_body()?;

        self.store
            .put(bucket, &key.to_string(), body.into_bytes())
            .await
            .map_err(|e| Failure::unrecognized(format!("writing snapshot {} failed: {}", key, e)))?;

        self.logger.log(
            COMPONENT,
            json!({
                "type": "SnapshotWritten",
                "workflowId": aggregate.workflow_id.as_str(),
                "key": key.to_string(),
                "steps": aggregate.steps.len(),
            }),
        );
        Ok(key)
    }
}

#[cfg(test)]
#[path = "tests/writer_tests.rs"]
mod tests;
