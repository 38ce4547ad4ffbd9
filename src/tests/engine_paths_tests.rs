use super::*;
use tempfile::tempdir;

#[test]
fn test_engine_home_dir() {
    let dir = engine_home_dir().unwrap();
    assert!(dir.ends_with(".workflow-engine"));
    assert!(dir.exists());
}

#[test]
fn test_default_config_path() {
    let path = default_config_path().unwrap();
    assert!(path.ends_with("config.yaml"));
}

#[test]
fn test_ensure_dir_creates_nested_directories() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("a").join("b");

    let created = ensure_dir(&nested).unwrap();
    assert_eq!(created, nested);
    assert!(nested.is_dir());
}

#[test]
fn test_ensure_parent_dir() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("logs").join("events.jsonl");

    ensure_parent_dir(&file).unwrap();
    assert!(dir.path().join("logs").is_dir());
    assert!(!file.exists());

    // A bare file name has no parent to create.
    ensure_parent_dir(Path::new("events.jsonl")).unwrap();
}
