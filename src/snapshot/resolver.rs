//! Resolves the latest snapshot of a workflow into its aggregate.

use super::{workflow_prefix, ObjectStore, ObjectStoreError, ResolverConfig, SnapshotKey};
use crate::outcome::{Failure, Outcome};
use crate::structured_logger::EngineLogger;
use crate::types::WorkflowId;
use crate::workflow::WorkflowAggregate;
use serde_json::json;
use std::sync::Arc;

const COMPONENT: &str = "SnapshotResolver";

/// Reads the most recent snapshot of a workflow.
///
/// Each call is a list followed by a get with no isolation between them, so a
/// snapshot written in between may or may not be observed. Callers poll.
pub struct SnapshotResolver<S: ObjectStore> {
    config: ResolverConfig,
    store: Arc<S>,
    logger: Arc<dyn EngineLogger>,
}

impl<S: ObjectStore> SnapshotResolver<S> {
    pub fn new(config: ResolverConfig, store: Arc<S>, logger: Arc<dyn EngineLogger>) -> Self {
        Self {
            config,
            store,
            logger,
        }
    }

    /// Returns the aggregate stored in the lexicographically greatest snapshot
    /// key under the workflow's prefix.
    ///
    /// Failure kinds:
    /// - blank `workflow_id`, one containing `/`, or no configured bucket:
    ///   `InvalidArguments`
    /// - listing failed: `Unrecognized` (transient)
    /// - no snapshots, or none with a usable key: `NotFound`
    /// - body vanished between list and get: `NotFound`
    /// - fetch failed otherwise: `Unrecognized` (transient)
    /// - body empty, unparseable or structurally invalid: `Corrupted`
    pub async fn read_latest(&self, workflow_id: &str) -> Outcome<WorkflowAggregate> {
        let outcome = self.resolve(workflow_id).await;
        if let Err(failure) = &outcome {
            self.logger.log(
                COMPONENT,
                json!({
                    "type": "ResolveFailed",
                    "workflowId": workflow_id,
                    "kind": failure.kind.display_name(),
                    "transient": failure.transient,
                    "detail": failure.detail,
                }),
            );
        }
        outcome
    }

    async fn resolve(&self, workflow_id: &str) -> Outcome<WorkflowAggregate> {
        let workflow_id = workflow_id.trim();
        if workflow_id.is_empty() {
            return Err(Failure::invalid_arguments("workflowId is required"));
        }
        if !WorkflowId::is_key_segment(workflow_id) {
            return Err(Failure::invalid_arguments(format!(
                "workflowId {} must not contain '/' or be a dot segment",
                workflow_id
            )));
        }
        let bucket = self
            .config
            .bucket()
            .ok_or_else(|| Failure::invalid_arguments("snapshot bucket is not configured"))?;

        let prefix = workflow_prefix(&self.config.prefix, workflow_id);
        let listing = self
            .store
            .list(bucket, &prefix)
            .await
            .map_err(|e| Failure::unrecognized(format!("listing {} failed: {}", prefix, e)))?;

        if listing.is_empty() {
            return Err(Failure::not_found(format!(
                "no snapshots for workflow {}",
                workflow_id
            )));
        }
        let listed = listing.len();

        // Listing order is not trusted; take the maximum explicitly. Only
        // direct children of the prefix are snapshots of this workflow.
        let latest = listing
            .into_iter()
            .filter_map(|entry| entry.key)
            .filter(|key| {
                key.strip_prefix(prefix.as_str())
                    .is_some_and(|leaf| !leaf.trim().is_empty() && !leaf.contains('/'))
            })
            .max()
            .ok_or_else(|| {
                Failure::not_found(format!(
                    "snapshot listing for workflow {} has no usable keys",
                    workflow_id
                ))
            })?;

        self.logger.log(
            COMPONENT,
            json!({
                "type": "SnapshotSelected",
                "workflowId": workflow_id,
                "listed": listed,
                "key": latest,
                "takenAt": SnapshotKey::parse(&latest).map(|k| k.timestamp),
            }),
        );

        let body = match self.store.get(bucket, &latest).await {
            Ok(body) => body,
            Err(ObjectStoreError::NotFound { key }) => {
                return Err(Failure::not_found(format!(
                    "snapshot {} disappeared before it could be read",
                    key
                )))
            }
            Err(e) => {
                return Err(Failure::unrecognized(format!(
                    "fetching {} failed: {}",
                    latest, e
                )))
            }
        };

        let body = String::from_utf8(body)
            .map_err(|e| Failure::corrupted(format!("snapshot {} is not UTF-8: {}", latest, e)))?;
        let aggregate = WorkflowAggregate::parse(&body).map_err(|failure| {
            Failure::corrupted(format!("snapshot {}: {}", latest, failure.detail))
        })?;

        if aggregate.workflow_id.as_str() != workflow_id {
            return Err(Failure::corrupted(format!(
                "snapshot {} belongs to workflow {}",
                latest, aggregate.workflow_id
            )));
        }
        Ok(aggregate)
    }
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
