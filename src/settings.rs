//! Application settings: explicit fields, environment variables, or a static
//! YAML file with environment overrides layered on top.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{BackupError, BackupResult};

fn default_log_level() -> String {
    "info".to_string()
}

/// Backup run parameters. Construct directly, via [`Settings::from_env`], or
/// via [`Settings::load`] for the YAML-file-plus-env path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Target bucket name. Required, must be non-empty.
    pub bucket: String,
    /// Optional AWS shared credentials file; exported to the SDK before the
    /// client is built. Must exist if set.
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
    /// Folder tree to back up. Must exist and be a directory.
    pub source_folder: PathBuf,
    /// Key prefix under which objects are grouped in the bucket.
    #[serde(default)]
    pub dest_prefix: String,
    /// Keep the temporary snapshot after the run instead of deleting it.
    #[serde(default)]
    pub keep_temp: bool,
    /// Bucket region; the SDK default chain applies when unset.
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint URL for S3-compatible stores (MinIO etc.).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Log level filter, tracing `EnvFilter` syntax.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Optional log file written alongside console output.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Builds settings purely from environment variables.
    ///
    /// Variables: `BACKUP_BUCKET`, `BACKUP_CREDENTIALS_FILE`,
    /// `BACKUP_SOURCE_FOLDER`, `BACKUP_DEST_PREFIX`, `BACKUP_KEEP_TEMP`
    /// ("true"/"1"), `BACKUP_S3_REGION`, `BACKUP_S3_ENDPOINT`,
    /// `BACKUP_LOG_LEVEL`, `BACKUP_LOG_FILE`.
    pub fn from_env() -> Self {
        Settings {
            bucket: env::var("BACKUP_BUCKET").unwrap_or_default(),
            credentials_file: env::var("BACKUP_CREDENTIALS_FILE").ok().map(PathBuf::from),
            source_folder: PathBuf::from(
                env::var("BACKUP_SOURCE_FOLDER").unwrap_or_default(),
            ),
            dest_prefix: env::var("BACKUP_DEST_PREFIX").unwrap_or_default(),
            keep_temp: env::var("BACKUP_KEEP_TEMP")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1"))
                .unwrap_or(false),
            region: env::var("BACKUP_S3_REGION").ok(),
            endpoint: env::var("BACKUP_S3_ENDPOINT").ok(),
            log_level: env::var("BACKUP_LOG_LEVEL").unwrap_or_else(|_| default_log_level()),
            log_file: env::var("BACKUP_LOG_FILE").ok().map(PathBuf::from),
        }
    }

    /// Loads settings from a static YAML file, then lets the environment
    /// variables from [`Settings::from_env`] override individual fields.
    /// With no file, the environment alone supplies everything.
    pub fn load(path: Option<&Path>) -> BackupResult<Self> {
        let Some(path) = path else {
            return Ok(Self::from_env());
        };

        info!(config_path = %path.display(), "loading settings file");
        let content = fs::read_to_string(path).map_err(|e| {
            error!(config_path = %path.display(), error = %e, "failed to read settings file");
            BackupError::io("read settings file", path, e)
        })?;
        let mut settings: Settings = serde_yaml::from_str(&content).map_err(|e| {
            error!(config_path = %path.display(), error = %e, "failed to parse settings YAML");
            BackupError::config("settings file", format!("invalid YAML: {e}"))
        })?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(bucket) = env::var("BACKUP_BUCKET") {
            self.bucket = bucket;
        }
        if let Ok(path) = env::var("BACKUP_CREDENTIALS_FILE") {
            self.credentials_file = Some(PathBuf::from(path));
        }
        if let Ok(source) = env::var("BACKUP_SOURCE_FOLDER") {
            self.source_folder = PathBuf::from(source);
        }
        if let Ok(prefix) = env::var("BACKUP_DEST_PREFIX") {
            self.dest_prefix = prefix;
        }
        if let Ok(keep) = env::var("BACKUP_KEEP_TEMP") {
            self.keep_temp = matches!(keep.to_ascii_lowercase().as_str(), "true" | "1");
        }
        if let Ok(region) = env::var("BACKUP_S3_REGION") {
            self.region = Some(region);
        }
        if let Ok(endpoint) = env::var("BACKUP_S3_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Ok(level) = env::var("BACKUP_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Ok(file) = env::var("BACKUP_LOG_FILE") {
            self.log_file = Some(PathBuf::from(file));
        }
    }

    /// Checks the required fields and existence constraints. Fails with a
    /// configuration or not-found error naming the offending field; performs
    /// no I/O beyond existence checks.
    pub fn validate(&self) -> BackupResult<()> {
        if self.bucket.is_empty() {
            return Err(BackupError::config("bucket", "must not be empty"));
        }

        if let Some(credentials) = &self.credentials_file {
            if !credentials.exists() {
                error!(path = %credentials.display(), "credentials file does not exist");
                return Err(BackupError::not_found(credentials.clone()));
            }
        }

        if !self.source_folder.exists() {
            error!(path = %self.source_folder.display(), "source folder does not exist");
            return Err(BackupError::not_found(self.source_folder.clone()));
        }
        if !self.source_folder.is_dir() {
            return Err(BackupError::config(
                "source_folder",
                format!("not a directory: {}", self.source_folder.display()),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn valid_settings(source: &Path) -> Settings {
        Settings {
            bucket: "backup-bucket".to_string(),
            credentials_file: None,
            source_folder: source.to_path_buf(),
            dest_prefix: "nightly".to_string(),
            keep_temp: false,
            region: None,
            endpoint: None,
            log_level: default_log_level(),
            log_file: None,
        }
    }

    #[test]
    fn validate_accepts_existing_source_and_bucket() {
        let dir = tempdir().unwrap();
        assert!(valid_settings(dir.path()).validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_bucket() {
        let dir = tempdir().unwrap();
        let mut settings = valid_settings(dir.path());
        settings.bucket.clear();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("bucket"));
    }

    #[test]
    fn validate_rejects_missing_source_folder() {
        let dir = tempdir().unwrap();
        let mut settings = valid_settings(dir.path());
        settings.source_folder = dir.path().join("gone");
        assert!(matches!(
            settings.validate(),
            Err(BackupError::NotFound { .. })
        ));
    }

    #[test]
    fn validate_rejects_missing_credentials_file() {
        let dir = tempdir().unwrap();
        let mut settings = valid_settings(dir.path());
        settings.credentials_file = Some(dir.path().join("creds.ini"));
        assert!(matches!(
            settings.validate(),
            Err(BackupError::NotFound { .. })
        ));
    }

    #[test]
    fn validate_rejects_file_as_source_folder() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        let mut settings = valid_settings(dir.path());
        settings.source_folder = file;
        assert!(matches!(
            settings.validate(),
            Err(BackupError::Config { .. })
        ));
    }
}
