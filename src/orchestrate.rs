//! High-level pipeline: snapshot → enumerate → upload → cleanup.
//!
//! [`BackupRunner`] composes the snapshot functions and the
//! [`BucketUploader`] into one operation and returns a structured
//! [`BackupReport`]. Cleanup of the snapshot runs on every exit path, success
//! or failure, unless retention was requested; a cleanup failure is logged
//! and suppressed, never replacing the primary outcome.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::BackupResult;
use crate::settings::Settings;
use crate::snapshot;
use crate::store::ObjectStore;
use crate::uploader::{BucketUploader, UploadReport};

/// Result of one backup run.
///
/// `files_found` lets callers tell an empty source (`files_found == 0`) apart
/// from a run where every upload failed (`files_found > 0`,
/// `files_uploaded == 0`); `success` is `files_uploaded > 0` in both cases.
#[derive(Debug, Clone)]
pub struct BackupReport {
    /// True when at least one file was uploaded.
    pub success: bool,
    /// Number of regular files found in the snapshot.
    pub files_found: usize,
    /// Number of files uploaded successfully.
    pub files_uploaded: usize,
    /// Snapshot path used for the run (deleted afterwards unless retained).
    pub temp_path: Option<PathBuf>,
    /// Explanation when the run did not succeed.
    pub error: Option<String>,
}

/// Orchestrates backup runs against a configured bucket.
pub struct BackupRunner<S> {
    settings: Settings,
    uploader: BucketUploader<S>,
}

impl<S> std::fmt::Debug for BackupRunner<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupRunner")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<S: ObjectStore> BackupRunner<S> {
    /// Validates `settings` and binds the runner to a connected store.
    /// Configuration errors surface here, before any store I/O.
    pub fn new(settings: Settings, store: S) -> BackupResult<Self> {
        settings.validate().map_err(|e| {
            error!(error = %e, "settings validation failed");
            e
        })?;
        info!(bucket = %settings.bucket, "backup runner initialised");
        Ok(BackupRunner {
            settings,
            uploader: BucketUploader::new(store),
        })
    }

    /// Access the batch uploader, e.g. for single-object operations.
    pub fn uploader(&self) -> &BucketUploader<S> {
        &self.uploader
    }

    /// Configured settings for this runner.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Full pipeline: snapshot the source, upload every file in the snapshot
    /// under the destination prefix, and clean the snapshot up again.
    ///
    /// Explicit arguments override the configured defaults. Hard failures
    /// (snapshot copy, enumeration) are returned as `Err` after the cleanup
    /// step has run; zero uploads is a soft non-success reported in the
    /// returned [`BackupReport`].
    pub async fn process_and_upload(
        &self,
        source: Option<&Path>,
        dest_prefix: Option<&str>,
        keep_temp: Option<bool>,
        show_progress: bool,
    ) -> BackupResult<BackupReport> {
        let source = source.unwrap_or(&self.settings.source_folder);
        let dest_prefix = dest_prefix.unwrap_or(&self.settings.dest_prefix);
        let keep_temp = keep_temp.unwrap_or(self.settings.keep_temp);

        info!(source = %source.display(), prefix = %dest_prefix, "starting backup run");

        let temp_path = snapshot::copy_folder(source, None).map_err(|e| {
            error!(error = %e, "snapshot failed");
            e
        })?;

        // Upload inside its own scope so cleanup runs on every exit path.
        let outcome = self
            .upload_snapshot(&temp_path, dest_prefix, show_progress)
            .await;

        if keep_temp {
            info!(temp_path = %temp_path.display(), "keeping temporary snapshot");
        } else if let Err(e) = snapshot::cleanup_temp(&temp_path) {
            warn!(error = %e, "could not clean up temporary snapshot");
        }

        // Propagate the original failure, not any cleanup failure.
        let (files_found, report) = outcome.map_err(|e| {
            error!(error = %e, "backup run failed");
            e
        })?;

        let files_uploaded = report.uploaded_count();
        let success = files_uploaded > 0;
        let error = if success {
            info!(files_uploaded, "backup run complete");
            None
        } else if files_found == 0 {
            warn!("no files found to upload");
            Some("no files found to upload".to_string())
        } else {
            warn!(files_found, "every upload in the batch failed");
            Some(format!("all {files_found} uploads failed"))
        };

        Ok(BackupReport {
            success,
            files_found,
            files_uploaded,
            temp_path: Some(temp_path),
            error,
        })
    }

    async fn upload_snapshot(
        &self,
        snapshot_path: &Path,
        dest_prefix: &str,
        show_progress: bool,
    ) -> BackupResult<(usize, UploadReport)> {
        let entries = snapshot::get_files_to_upload(snapshot_path)?;
        if entries.is_empty() {
            return Ok((0, UploadReport::default()));
        }

        let folder_size = snapshot::get_folder_size(snapshot_path)?;
        info!(size = %snapshot::format_size(folder_size), "total size to upload");

        let report = self
            .uploader
            .upload_files(&entries, dest_prefix, show_progress)
            .await;
        Ok((entries.len(), report))
    }

    /// Lists objects under `dest_prefix` and compares the count against
    /// `expected_files`. Listing errors are logged and reported as a failed
    /// verification; no diagnosis of which files are missing.
    pub async fn verify_backup(&self, dest_prefix: &str, expected_files: usize) -> bool {
        match self.uploader.list_files(dest_prefix).await {
            Ok(keys) => {
                let actual = keys.len();
                info!(actual, expected = expected_files, "verification count");
                if actual == expected_files {
                    info!("backup verified");
                    true
                } else {
                    warn!(
                        missing = expected_files.saturating_sub(actual),
                        "backup verification mismatch"
                    );
                    false
                }
            }
            Err(e) => {
                error!(error = %e, "backup verification failed");
                false
            }
        }
    }
}
