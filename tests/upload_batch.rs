//! Batch upload semantics against a mocked object store: partial failures are
//! collected, the batch is never aborted early, and keys are built from
//! prefix plus relative path.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bucket_backup::snapshot::FileEntry;
use bucket_backup::store::MockObjectStore;
use bucket_backup::uploader::BucketUploader;

fn entry(relative: &str) -> FileEntry {
    FileEntry {
        local_path: PathBuf::from("/tmp/snapshot").join(relative),
        relative_path: PathBuf::from(relative),
    }
}

#[tokio::test]
async fn upload_files_collects_failures_without_aborting() {
    let attempted: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&attempted);

    let mut store = MockObjectStore::new();
    store.expect_put_object().returning(move |key, _path| {
        seen.lock().unwrap().push(key.to_string());
        if key.ends_with("bad.txt") {
            Err("simulated upload failure".into())
        } else {
            Ok(())
        }
    });

    let uploader = BucketUploader::new(store);
    let entries = vec![
        entry("a.txt"),
        entry("bad.txt"),
        entry("docs/c.txt"),
        entry("docs/d.txt"),
    ];

    let report = uploader.upload_files(&entries, "nightly", true).await;

    assert_eq!(report.uploaded_count(), 3);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failed[0].key, "nightly/bad.txt");
    assert!(report.failed[0].error.contains("simulated upload failure"));

    // Every entry was attempted, in input order, even after the failure.
    let attempted = attempted.lock().unwrap();
    assert_eq!(
        *attempted,
        vec![
            "nightly/a.txt",
            "nightly/bad.txt",
            "nightly/docs/c.txt",
            "nightly/docs/d.txt"
        ]
    );
}

#[tokio::test]
async fn upload_files_with_empty_prefix_uses_bare_relative_keys() {
    let mut store = MockObjectStore::new();
    store
        .expect_put_object()
        .withf(|key, _| key == "a.txt")
        .times(1)
        .returning(|_, _| Ok(()));

    let uploader = BucketUploader::new(store);
    let report = uploader.upload_files(&[entry("a.txt")], "", false).await;
    assert_eq!(report.uploaded, vec!["a.txt"]);
}

#[tokio::test]
async fn upload_single_file_fails_soft() {
    let mut store = MockObjectStore::new();
    store
        .expect_put_object()
        .returning(|_, _| Err("connection reset".into()));

    let uploader = BucketUploader::new(store);
    assert!(
        !uploader
            .upload_single_file(&PathBuf::from("/tmp/x"), "nightly/x")
            .await
    );
}

#[tokio::test]
async fn delete_file_fails_soft_and_list_files_passes_through() {
    let mut store = MockObjectStore::new();
    store
        .expect_delete_object()
        .returning(|_| Err("denied".into()));
    store.expect_list_objects().returning(|_| {
        Ok(vec![
            "nightly/a.txt".to_string(),
            "nightly/b.txt".to_string(),
        ])
    });

    let uploader = BucketUploader::new(store);
    assert!(!uploader.delete_file("nightly/a.txt").await);
    let listed = uploader.list_files("nightly").await.unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn file_exists_surfaces_client_errors() {
    let mut store = MockObjectStore::new();
    store
        .expect_object_exists()
        .returning(|_| Err("timeout".into()));

    let uploader = BucketUploader::new(store);
    assert!(uploader.file_exists("nightly/a.txt").await.is_err());
}
