use super::*;
use tempfile::tempdir;

#[tokio::test]
async fn put_get_and_list() {
    let dir = tempdir().expect("temp dir");
    let store = FsObjectStore::new(dir.path().to_path_buf());

    store
        .put("bucket", "workflows/wf1/2024-08-01T10:00:00Z-a", b"one".to_vec())
        .await
        .unwrap();
    store
        .put("bucket", "workflows/wf2/2024-08-01T10:00:00Z-a", b"two".to_vec())
        .await
        .unwrap();

    assert_eq!(
        store
            .get("bucket", "workflows/wf1/2024-08-01T10:00:00Z-a")
            .await
            .unwrap(),
        b"one".to_vec()
    );

    let listed = store.list("bucket", "workflows/wf1/").await.unwrap();
    assert_eq!(
        listed,
        vec![ListedObject::keyed("workflows/wf1/2024-08-01T10:00:00Z-a")]
    );
}

#[tokio::test]
async fn listing_missing_bucket_is_empty() {
    let dir = tempdir().expect("temp dir");
    let store = FsObjectStore::new(dir.path().to_path_buf());

    assert!(store.list("nothing-here", "wf1/").await.unwrap().is_empty());
}

#[tokio::test]
async fn get_missing_object_is_not_found() {
    let dir = tempdir().expect("temp dir");
    let store = FsObjectStore::new(dir.path().to_path_buf());

    let err = store.get("bucket", "wf1/missing").await.unwrap_err();
    assert_eq!(
        err,
        ObjectStoreError::NotFound {
            key: "wf1/missing".to_string()
        }
    );
}

#[tokio::test]
async fn temp_files_are_not_listed() {
    let dir = tempdir().expect("temp dir");
    let store = FsObjectStore::new(dir.path().to_path_buf());
    store.put("bucket", "wf1/2024-08-01T10:00:00Z-a", b"{}".to_vec()).await.unwrap();
    std::fs::write(
        dir.path().join("bucket/wf1/2024-08-01T10:05:00Z-b.tmp"),
        b"partial",
    )
    .unwrap();

    let listed = store.list("bucket", "wf1/").await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn path_traversal_is_rejected() {
    let dir = tempdir().expect("temp dir");
    let store = FsObjectStore::new(dir.path().to_path_buf());

    let err = store.get("bucket", "../outside").await.unwrap_err();
    assert!(matches!(err, ObjectStoreError::Backend { .. }));
    let err = store.list("..", "").await.unwrap_err();
    assert!(matches!(err, ObjectStoreError::Backend { .. }));
}

#[test]
fn listing_starts_at_the_prefix_directory() {
    let bucket = Path::new("/data/bucket");

    assert_eq!(
        prefix_dir(bucket, "workflows/wf1/").unwrap(),
        PathBuf::from("/data/bucket/workflows/wf1")
    );
    assert_eq!(
        prefix_dir(bucket, "workflows/wf").unwrap(),
        PathBuf::from("/data/bucket/workflows")
    );
    assert_eq!(prefix_dir(bucket, "").unwrap(), PathBuf::from("/data/bucket"));
    assert!(prefix_dir(bucket, "../wf1/").is_err());
}

#[tokio::test]
async fn other_workflows_are_not_listed() {
    let dir = tempdir().expect("temp dir");
    let store = FsObjectStore::new(dir.path().to_path_buf());
    store.put("bucket", "workflows/wf1/2024-08-01T10:00:00Z-a", b"{}".to_vec()).await.unwrap();
    for i in 0..20 {
        let key = format!("workflows/wf2/2024-08-01T10:{:02}:00Z-a", i);
        store.put("bucket", &key, b"{}".to_vec()).await.unwrap();
    }

    let listed = store.list("bucket", "workflows/wf1/").await.unwrap();
    assert_eq!(
        listed,
        vec![ListedObject::keyed("workflows/wf1/2024-08-01T10:00:00Z-a")]
    );
    assert!(store.list("bucket", "workflows/wf3/").await.unwrap().is_empty());
}

#[tokio::test]
async fn partial_last_segment_is_matched_as_a_string_prefix() {
    let dir = tempdir().expect("temp dir");
    let store = FsObjectStore::new(dir.path().to_path_buf());
    store.put("bucket", "workflows/wf1/2024-08-01T10:00:00Z-a", b"{}".to_vec()).await.unwrap();
    store.put("bucket", "workflows/wf2/2024-08-01T10:00:00Z-a", b"{}".to_vec()).await.unwrap();
    store.put("bucket", "other/wf1/2024-08-01T10:00:00Z-a", b"{}".to_vec()).await.unwrap();

    let mut keys: Vec<String> = store
        .list("bucket", "workflows/wf")
        .await
        .unwrap()
        .into_iter()
        .filter_map(|o| o.key)
        .collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "workflows/wf1/2024-08-01T10:00:00Z-a",
            "workflows/wf2/2024-08-01T10:00:00Z-a"
        ]
    );
}
