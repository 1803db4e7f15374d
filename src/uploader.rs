//! Batch upload layer over an [`ObjectStore`].
//!
//! `upload_files` never aborts on an item failure: each failure is recorded
//! in the batch report and logged, and the remaining files are still
//! attempted.

use std::path::Path;

use tracing::{error, info, warn};

use crate::snapshot::FileEntry;
use crate::store::{ObjectStore, StoreError};

/// One failed upload inside a batch: the object key and the client error.
#[derive(Debug, Clone)]
pub struct UploadFailure {
    /// Object key the upload was addressed to.
    pub key: String,
    /// Flattened client error message.
    pub error: String,
}

/// Outcome of a batch upload: which keys landed and which failed.
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    /// Keys uploaded successfully, in completion order.
    pub uploaded: Vec<String>,
    /// Per-item failures, in encounter order.
    pub failed: Vec<UploadFailure>,
}

impl UploadReport {
    /// Number of files uploaded successfully.
    pub fn uploaded_count(&self) -> usize {
        self.uploaded.len()
    }

    /// Number of files that failed.
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Builds the object key for a relative snapshot path under `prefix`.
/// Backslashes are normalized to forward slashes; an empty prefix yields the
/// bare relative key.
pub fn build_key(prefix: &str, relative_path: &Path) -> String {
    let relative = relative_path.to_string_lossy().replace('\\', "/");
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        relative
    } else {
        format!("{prefix}/{relative}")
    }
}

/// Uploads batches of snapshot files to a bucket, one at a time.
pub struct BucketUploader<S> {
    store: S,
}

impl<S: ObjectStore> BucketUploader<S> {
    /// Wraps a connected store.
    pub fn new(store: S) -> Self {
        BucketUploader { store }
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Uploads `entries` in input order under `dest_prefix`.
    ///
    /// Per-file failures are collected into the report and logged; they never
    /// stop the batch. With `show_progress`, a running `i/total` line is
    /// emitted after each completed file.
    pub async fn upload_files(
        &self,
        entries: &[FileEntry],
        dest_prefix: &str,
        show_progress: bool,
    ) -> UploadReport {
        let total = entries.len();
        info!(total, prefix = %dest_prefix, "starting upload batch");

        let mut report = UploadReport::default();
        for (index, entry) in entries.iter().enumerate() {
            let key = build_key(dest_prefix, &entry.relative_path);
            match self.store.put_object(&key, &entry.local_path).await {
                Ok(()) => {
                    if show_progress {
                        info!(
                            progress = format!("{}/{}", index + 1, total),
                            key = %key,
                            "uploaded"
                        );
                    }
                    report.uploaded.push(key);
                }
                Err(e) => {
                    error!(file = %entry.local_path.display(), key = %key, error = %e, "upload failed");
                    report.failed.push(UploadFailure {
                        key,
                        error: e.to_string(),
                    });
                }
            }
        }

        if !report.failed.is_empty() {
            warn!(failed = report.failed_count(), "some files failed to upload");
            for failure in &report.failed {
                warn!(key = %failure.key, error = %failure.error, "failed upload");
            }
        }
        info!(
            uploaded = report.uploaded_count(),
            total,
            "upload batch complete"
        );
        report
    }

    /// Uploads one local file to `key`. Fails soft: logs and returns false.
    pub async fn upload_single_file(&self, local_path: &Path, key: &str) -> bool {
        match self.store.put_object(key, local_path).await {
            Ok(()) => {
                info!(key = %key, "file uploaded");
                true
            }
            Err(e) => {
                error!(file = %local_path.display(), error = %e, "upload failed");
                false
            }
        }
    }

    /// Whether an object exists at `key`. Surfaces the client error directly.
    pub async fn file_exists(&self, key: &str) -> Result<bool, StoreError> {
        self.store.object_exists(key).await
    }

    /// Deletes the object at `key`. Fails soft: logs and returns false.
    pub async fn delete_file(&self, key: &str) -> bool {
        match self.store.delete_object(key).await {
            Ok(()) => {
                info!(key = %key, "object deleted");
                true
            }
            Err(e) => {
                error!(key = %key, error = %e, "delete failed");
                false
            }
        }
    }

    /// Lists all object keys under `prefix`.
    pub async fn list_files(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.store.list_objects(prefix).await
    }
}
