//! Snapshot key layout: `<prefix>/<workflow_id>/<timestamp>-<suffix>`.

use crate::types::WorkflowId;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::fmt::{Display, Formatter};
use std::sync::OnceLock;

/// Fixed-width UTC format used for new keys; lexicographic order equals time order.
pub const KEY_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

fn leaf_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<ts>\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?Z)-(?P<suffix>.+)$")
            .unwrap_or_else(|e| panic!("invalid snapshot key pattern: {}", e))
    })
}

/// Listing prefix for one workflow's snapshots, always ending in `/`.
pub fn workflow_prefix(prefix: &str, workflow_id: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{}/", workflow_id)
    } else {
        format!("{}/{}/", prefix, workflow_id)
    }
}

/// A parsed snapshot key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotKey {
    pub prefix: String,
    pub workflow_id: WorkflowId,
    pub timestamp: String,
    pub suffix: String,
}

impl SnapshotKey {
    /// Mints a key for a snapshot taken at `at`.
    pub fn new(prefix: &str, workflow_id: &WorkflowId, at: DateTime<Utc>, suffix: &str) -> Self {
        Self {
            prefix: prefix.trim_matches('/').to_string(),
            workflow_id: workflow_id.clone(),
            timestamp: at.format(KEY_TIMESTAMP_FORMAT).to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// Parses a full object key. Returns `None` if it does not follow the layout.
    pub fn parse(key: &str) -> Option<Self> {
        let mut segments: Vec<&str> = key.split('/').collect();
        let leaf = segments.pop()?;
        let workflow_id = segments.pop().filter(|s| !s.is_empty())?;
        let prefix = segments.join("/");

        let captures = leaf_pattern().captures(leaf)?;
        Some(Self {
            prefix,
            workflow_id: WorkflowId::from(workflow_id),
            timestamp: captures.name("ts")?.as_str().to_string(),
            suffix: captures.name("suffix")?.as_str().to_string(),
        })
    }

    /// Parses the timestamp segment.
    pub fn taken_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|at| at.with_timezone(&Utc))
    }
}

impl Display for SnapshotKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}-{}",
            workflow_prefix(&self.prefix, self.workflow_id.as_str()),
            self.timestamp,
            self.suffix
        )
    }
}

#[cfg(test)]
#[path = "tests/key_tests.rs"]
mod tests;
