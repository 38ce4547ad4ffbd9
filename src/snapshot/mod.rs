//! Snapshot storage and latest-state resolution.
//!
//! Snapshots are immutable JSON serializations of a [`WorkflowAggregate`]
//! stored in a prefix-listable object store under
//! `<prefix>/<workflow_id>/<ISO-8601 timestamp>-<suffix>`. Keys of one
//! workflow sort lexicographically in creation order, so the greatest key is
//! the most recent snapshot.
//!
//! [`WorkflowAggregate`]: crate::workflow::WorkflowAggregate

pub mod fs_store;
pub mod key;
pub mod memory_store;
pub mod resolver;
pub mod writer;

pub use fs_store::FsObjectStore;
pub use key::{workflow_prefix, SnapshotKey};
pub use memory_store::MemoryObjectStore;
pub use resolver::SnapshotResolver;
pub use writer::SnapshotWriter;

use async_trait::async_trait;
use std::fmt::{Display, Formatter};

/// Where snapshots live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Logical container (bucket) holding snapshots. `None` when unconfigured.
    pub bucket: Option<String>,
    /// Key prefix shared by all workflows. May be empty.
    pub prefix: String,
}

impl ResolverConfig {
    pub fn new(bucket: Option<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket,
            prefix: prefix.into(),
        }
    }

    /// The configured bucket, ignoring blank values.
    pub fn bucket(&self) -> Option<&str> {
        self.bucket
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }
}

/// One entry of a prefix listing. Some stores may return entries without a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedObject {
    pub key: Option<String>,
}

impl ListedObject {
    pub fn keyed(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }
}

/// Errors raised by an object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectStoreError {
    /// No object exists at the requested key.
    NotFound { key: String },
    /// Connectivity, permission, throttling or I/O failure.
    Backend { message: String },
}

impl ObjectStoreError {
    pub fn backend(message: impl Display) -> Self {
        Self::Backend {
            message: message.to_string(),
        }
    }
}

impl Display for ObjectStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { key } => write!(f, "object not found: {}", key),
            Self::Backend { message } => write!(f, "object store error: {}", message),
        }
    }
}

impl std::error::Error for ObjectStoreError {}

/// Prefix-listable object store.
///
/// Listing order is unspecified; callers must not rely on it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists every object whose key starts with `prefix`.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ListedObject>, ObjectStoreError>;

    /// Fetches the body stored at exactly `key`.
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError>;

    /// Stores `body` at `key`.
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), ObjectStoreError>;
}
