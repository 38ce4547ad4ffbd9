use super::*;
use serial_test::serial;
use tempfile::tempdir;

#[test]
fn test_empty_yaml_uses_defaults() {
    let config = EngineConfig::from_yaml("{}").unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.events.log_file, PathBuf::from("events.jsonl"));
    assert_eq!(config.snapshots.prefix, "workflows");
    assert_eq!(config.snapshots.bucket, None);
    assert!(config.logging.structured);
}

#[test]
fn test_full_yaml() {
    let yaml = r#"
storage_root: /var/lib/engine
events:
  log_file: log/events.jsonl
snapshots:
  bucket: workflow-state
  prefix: runs
logging:
  structured: false
"#;
    let config = EngineConfig::from_yaml(yaml).unwrap();
    assert_eq!(config.storage_root, Some(PathBuf::from("/var/lib/engine")));
    assert_eq!(
        config.event_log_path().unwrap(),
        PathBuf::from("/var/lib/engine/log/events.jsonl")
    );
    assert_eq!(
        config.snapshot_root().unwrap(),
        PathBuf::from("/var/lib/engine/snapshots")
    );
    assert_eq!(config.logs_dir().unwrap(), PathBuf::from("/var/lib/engine/logs"));
    assert_eq!(config.resolver_config().bucket(), Some("workflow-state"));
    assert!(!config.logging.structured);
}

#[test]
fn test_absolute_log_file_ignores_storage_root() {
    let yaml = r#"
storage_root: /var/lib/engine
events:
  log_file: /tmp/events.jsonl
"#;
    let config = EngineConfig::from_yaml(yaml).unwrap();
    assert_eq!(
        config.event_log_path().unwrap(),
        PathBuf::from("/tmp/events.jsonl")
    );
}

#[test]
fn test_unknown_top_level_key_is_rejected() {
    assert!(EngineConfig::from_yaml("agents: {}").is_err());
}

#[test]
fn test_parent_segments_in_prefix_are_rejected() {
    let yaml = r#"
snapshots:
  prefix: workflows/../secrets
"#;
    let err = EngineConfig::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("'..'"));
}

#[test]
fn test_load_reports_path_on_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "events: [not, a, map]").unwrap();

    let err = EngineConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
#[serial]
fn test_load_or_default_without_file() {
    std::env::remove_var(SNAPSHOT_BUCKET_ENV);
    let dir = tempdir().unwrap();

    let config = EngineConfig::load_or_default(&dir.path().join("missing.yaml")).unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
#[serial]
fn test_env_overrides_bucket() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "snapshots:\n  bucket: from-file\n").unwrap();

    std::env::set_var(SNAPSHOT_BUCKET_ENV, " from-env ");
    let config = EngineConfig::load_or_default(&path);
    std::env::remove_var(SNAPSHOT_BUCKET_ENV);

    assert_eq!(
        config.unwrap().snapshots.bucket.as_deref(),
        Some("from-env")
    );
}

#[test]
#[serial]
fn test_blank_env_keeps_file_bucket() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "snapshots:\n  bucket: from-file\n").unwrap();

    std::env::set_var(SNAPSHOT_BUCKET_ENV, "   ");
    let config = EngineConfig::load_or_default(&path);
    std::env::remove_var(SNAPSHOT_BUCKET_ENV);

    assert_eq!(
        config.unwrap().snapshots.bucket.as_deref(),
        Some("from-file")
    );
}
