//! Home-based storage paths for the workflow engine.
//!
//! Everything lives under `~/.workflow-engine/` unless the config sets a
//! different `storage_root`:
//! - `config.yaml` - Engine configuration
//! - `events.jsonl` - Default event log
//! - `snapshots/<bucket>/...` - Filesystem snapshot store
//! - `logs/` - Structured JSONL logs

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const ENGINE_DIR: &str = ".workflow-engine";

pub const CONFIG_FILE: &str = "config.yaml";
pub const SNAPSHOTS_DIR: &str = "snapshots";
pub const LOGS_DIR: &str = "logs";

/// Returns the home-based engine directory: `~/.workflow-engine/`
///
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined or the
/// directory cannot be created.
pub fn engine_home_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory for engine storage")?;
    let dir = home.join(ENGINE_DIR);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create engine directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the default config path: `~/.workflow-engine/config.yaml`
pub fn default_config_path() -> Result<PathBuf> {
    Ok(engine_home_dir()?.join(CONFIG_FILE))
}

/// Creates `dir` (and parents) if missing and returns it.
pub fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(dir.to_path_buf())
}

/// Creates the parent directory of `file` if it has one.
pub fn ensure_parent_dir(file: &Path) -> Result<()> {
    if let Some(parent) = file.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/engine_paths_tests.rs"]
mod tests;
