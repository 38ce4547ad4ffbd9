//! File-based event log backend.
//!
//! Stores records as JSONL (one JSON object per line) with:
//! - Write-if-absent enforced under an exclusive file lock, so concurrent
//!   processes linearize on the lock
//! - Shared locks for reads
//! - `sync_all` after every append

use super::{EventLogBackend, EventLogError};
use crate::events::EventRecord;
use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// JSONL event log at a fixed path.
#[derive(Debug, Clone)]
pub struct FileEventLog {
    /// Path to the JSONL event log file.
    pub log_path: PathBuf,
}

impl FileEventLog {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Reads every record in the log, in append order.
    pub fn read_all(&self) -> Result<Vec<EventRecord>, EventLogError> {
        let file = match File::open(&self.log_path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(EventLogError::backend(e)),
        };
        file.lock_shared().map_err(EventLogError::backend)?;
        read_records(&file)
    }
}

#[async_trait]
impl EventLogBackend for FileEventLog {
    async fn insert_if_absent(&self, record: EventRecord) -> Result<(), EventLogError> {
        let path = self.log_path.clone();
        tokio::task::spawn_blocking(move || append_if_absent(&path, record))
            .await
            .map_err(EventLogError::backend)?
    }

    async fn get(&self, key: &str) -> Result<EventRecord, EventLogError> {
        let log = self.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            log.read_all()?
                .into_iter()
                .find(|r| r.idempotency_key == key)
                .ok_or(EventLogError::NotFound { key })
        })
        .await
        .map_err(EventLogError::backend)?
    }
}

fn append_if_absent(path: &Path, record: EventRecord) -> Result<(), EventLogError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(EventLogError::backend)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .map_err(EventLogError::backend)?;

    // Held until `file` drops at the end of this function.
    file.lock_exclusive().map_err(EventLogError::backend)?;

    let existing = read_records(&file)?;
    if existing
        .iter()
        .any(|r| r.idempotency_key == record.idempotency_key)
    {
        return Err(EventLogError::AlreadyExists {
            key: record.idempotency_key,
        });
    }

    let line = serde_json::to_string(&record).map_err(EventLogError::backend)?;
    writeln!(file, "{}", line).map_err(EventLogError::backend)?;

    file.flush().map_err(EventLogError::backend)?;
    file.sync_all().map_err(EventLogError::backend)?;
    Ok(())
}

fn read_records(file: &File) -> Result<Vec<EventRecord>, EventLogError> {
    let mut reader = BufReader::new(file.try_clone().map_err(EventLogError::backend)?);
    reader
        .seek(SeekFrom::Start(0))
        .map_err(EventLogError::backend)?;

    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(EventLogError::backend)?;
        if line.trim().is_empty() {
            continue;
        }
        let record: EventRecord = serde_json::from_str(&line).map_err(|e| {
            EventLogError::backend(format!("unparseable event log line {}: {}", index + 1, e))
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
#[path = "tests/file_store_tests.rs"]
mod tests;
