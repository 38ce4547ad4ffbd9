//! Directory-backed object store.
//!
//! Layout: `<root>/<bucket>/<key>`, where each `/`-separated key segment is a
//! directory level. Writes go to a temp file first, then rename into place.

use super::{ListedObject, ObjectStore, ObjectStoreError};
use async_trait::async_trait;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const TEMP_EXTENSION: &str = "tmp";

/// Object store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, ObjectStoreError> {
        let mut path = self.bucket_dir(bucket)?;
        for segment in key.split('/') {
            if !is_safe_segment(segment) {
                return Err(ObjectStoreError::backend(format!(
                    "invalid object key: {}",
                    key
                )));
            }
            path.push(segment);
        }
        Ok(path)
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, ObjectStoreError> {
        if !is_safe_segment(bucket) {
            return Err(ObjectStoreError::backend(format!(
                "invalid bucket name: {}",
                bucket
            )));
        }
        Ok(self.root.join(bucket))
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('\\')
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ListedObject>, ObjectStoreError> {
        let bucket_dir = self.bucket_dir(bucket)?;
        let start_dir = prefix_dir(&bucket_dir, prefix)?;
        let prefix = prefix.to_string();
        tokio::task::spawn_blocking(move || {
            let mut keys = Vec::new();
            collect_keys(&bucket_dir, &start_dir, &mut keys)?;
            Ok(keys
                .into_iter()
                .filter(|k| k.starts_with(&prefix))
                .map(ListedObject::keyed)
                .collect())
        })
        .await
        .map_err(ObjectStoreError::backend)?
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let path = self.object_path(bucket, key)?;
        let key = key.to_string();
        tokio::task::spawn_blocking(move || match fs::read(&path) {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ObjectStoreError::NotFound { key }),
            Err(e) => Err(ObjectStoreError::backend(e)),
        })
        .await
        .map_err(ObjectStoreError::backend)?
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), ObjectStoreError> {
        let path = self.object_path(bucket, key)?;
        tokio::task::spawn_blocking(move || {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(ObjectStoreError::backend)?;
            }
            let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
            tmp_name.push(".");
            tmp_name.push(TEMP_EXTENSION);
            let tmp_path = path.with_file_name(tmp_name);
            fs::write(&tmp_path, body).map_err(ObjectStoreError::backend)?;
            fs::rename(&tmp_path, &path).map_err(ObjectStoreError::backend)
        })
        .await
        .map_err(ObjectStoreError::backend)?
    }
}

/// Directory holding every key under `prefix`: the bucket directory joined
/// with the prefix's complete segments. A trailing partial segment is left to
/// the string filter.
fn prefix_dir(bucket_dir: &Path, prefix: &str) -> Result<PathBuf, ObjectStoreError> {
    let mut dir = bucket_dir.to_path_buf();
    let mut segments: Vec<&str> = prefix.split('/').collect();
    segments.pop();
    for segment in segments {
        if !is_safe_segment(segment) {
            return Err(ObjectStoreError::backend(format!(
                "invalid listing prefix: {}",
                prefix
            )));
        }
        dir.push(segment);
    }
    Ok(dir)
}

/// Walks `dir`, pushing `/`-joined keys relative to `bucket_dir`.
///
/// A bucket directory that does not exist yet lists as empty.
fn collect_keys(bucket_dir: &Path, dir: &Path, keys: &mut Vec<String>) -> Result<(), ObjectStoreError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(ObjectStoreError::backend(e)),
    };

    for entry in entries {
        let path = entry.map_err(ObjectStoreError::backend)?.path();
        if path.is_dir() {
            collect_keys(bucket_dir, &path, keys)?;
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) == Some(TEMP_EXTENSION) {
            continue;
        }
        if let Ok(relative) = path.strip_prefix(bucket_dir) {
            let segments: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            keys.push(segments.join("/"));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/fs_store_tests.rs"]
mod tests;
