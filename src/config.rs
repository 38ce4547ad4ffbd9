use crate::engine_paths;
use crate::snapshot::ResolverConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides `snapshots.bucket` when set to a non-empty value.
pub const SNAPSHOT_BUCKET_ENV: &str = "WORKFLOW_ENGINE_SNAPSHOT_BUCKET";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Root for the event log, filesystem snapshots and logs.
    /// Defaults to `~/.workflow-engine/`.
    #[serde(default)]
    pub storage_root: Option<PathBuf>,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub snapshots: SnapshotsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EventsConfig {
    /// Event log file, relative to the storage root unless absolute.
    #[serde(default = "default_event_log_file")]
    pub log_file: PathBuf,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            log_file: default_event_log_file(),
        }
    }
}

fn default_event_log_file() -> PathBuf {
    PathBuf::from("events.jsonl")
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SnapshotsConfig {
    /// Logical container for snapshots. Left unset, reads fail with
    /// `InvalidArguments` instead of crashing at startup.
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default = "default_snapshot_prefix")]
    pub prefix: String,
}

impl Default for SnapshotsConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            prefix: default_snapshot_prefix(),
        }
    }
}

fn default_snapshot_prefix() -> String {
    "workflows".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Write JSONL entries under `<storage_root>/logs/`.
    #[serde(default = "default_structured")]
    pub structured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            structured: default_structured(),
        }
    }
}

fn default_structured() -> bool {
    true
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file as YAML: {}", path.display()))
    }

    /// Loads `path` if it exists, otherwise starts from defaults.
    /// The environment override is applied either way.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.events.log_file.as_os_str().is_empty() {
            anyhow::bail!("events.log_file must not be empty");
        }
        if self.snapshots.prefix.split('/').any(|s| s == "..") {
            anyhow::bail!(
                "snapshots.prefix must not contain '..' segments: {}",
                self.snapshots.prefix
            );
        }
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(bucket) = std::env::var(SNAPSHOT_BUCKET_ENV) {
            if !bucket.trim().is_empty() {
                self.snapshots.bucket = Some(bucket.trim().to_string());
            }
        }
    }

    /// Storage root, falling back to the home-based default.
    pub fn storage_root(&self) -> Result<PathBuf> {
        match &self.storage_root {
            Some(root) => Ok(root.clone()),
            None => engine_paths::engine_home_dir(),
        }
    }

    pub fn event_log_path(&self) -> Result<PathBuf> {
        if self.events.log_file.is_absolute() {
            return Ok(self.events.log_file.clone());
        }
        Ok(self.storage_root()?.join(&self.events.log_file))
    }

    pub fn snapshot_root(&self) -> Result<PathBuf> {
        Ok(self.storage_root()?.join(engine_paths::SNAPSHOTS_DIR))
    }

    pub fn logs_dir(&self) -> Result<PathBuf> {
        Ok(self.storage_root()?.join(engine_paths::LOGS_DIR))
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::new(self.snapshots.bucket.clone(), self.snapshots.prefix.clone())
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
