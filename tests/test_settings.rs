//! Settings loading: environment variables, YAML files, and the env-over-file
//! override order.

use std::env;
use std::fs::write;
use std::path::PathBuf;

use serial_test::serial;
use tempfile::NamedTempFile;

use bucket_backup::settings::Settings;

const VARS: [&str; 9] = [
    "BACKUP_BUCKET",
    "BACKUP_CREDENTIALS_FILE",
    "BACKUP_SOURCE_FOLDER",
    "BACKUP_DEST_PREFIX",
    "BACKUP_KEEP_TEMP",
    "BACKUP_S3_REGION",
    "BACKUP_S3_ENDPOINT",
    "BACKUP_LOG_LEVEL",
    "BACKUP_LOG_FILE",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn from_env_reads_documented_variables_with_defaults() {
    clear_env();
    env::set_var("BACKUP_BUCKET", "env-bucket");
    env::set_var("BACKUP_SOURCE_FOLDER", "/srv/data");
    env::set_var("BACKUP_DEST_PREFIX", "external/backup");
    env::set_var("BACKUP_KEEP_TEMP", "true");

    let settings = Settings::from_env();
    assert_eq!(settings.bucket, "env-bucket");
    assert_eq!(settings.source_folder, PathBuf::from("/srv/data"));
    assert_eq!(settings.dest_prefix, "external/backup");
    assert!(settings.keep_temp);
    assert!(settings.credentials_file.is_none());
    assert_eq!(settings.log_level, "info");

    clear_env();
}

#[test]
#[serial]
fn keep_temp_accepts_one_as_true_and_everything_else_as_false() {
    clear_env();
    env::set_var("BACKUP_KEEP_TEMP", "1");
    assert!(Settings::from_env().keep_temp);
    env::set_var("BACKUP_KEEP_TEMP", "yes");
    assert!(!Settings::from_env().keep_temp);
    clear_env();
}

#[test]
#[serial]
fn load_parses_yaml_file() {
    clear_env();
    let yaml = r#"
bucket: file-bucket
source_folder: /srv/data
dest_prefix: nightly/app
keep_temp: true
region: eu-west-1
log_level: debug
"#;
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();

    let settings = Settings::load(Some(file.path())).expect("settings should load");
    assert_eq!(settings.bucket, "file-bucket");
    assert_eq!(settings.source_folder, PathBuf::from("/srv/data"));
    assert_eq!(settings.dest_prefix, "nightly/app");
    assert!(settings.keep_temp);
    assert_eq!(settings.region.as_deref(), Some("eu-west-1"));
    assert_eq!(settings.log_level, "debug");
    assert!(settings.endpoint.is_none());
}

#[test]
#[serial]
fn environment_overrides_the_settings_file() {
    clear_env();
    let yaml = "bucket: file-bucket\nsource_folder: /srv/data\n";
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();

    env::set_var("BACKUP_BUCKET", "env-wins");
    env::set_var("BACKUP_DEST_PREFIX", "from-env");

    let settings = Settings::load(Some(file.path())).expect("settings should load");
    assert_eq!(settings.bucket, "env-wins");
    assert_eq!(settings.dest_prefix, "from-env");
    assert_eq!(settings.source_folder, PathBuf::from("/srv/data"));

    clear_env();
}

#[test]
#[serial]
fn load_rejects_invalid_yaml() {
    clear_env();
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), b"not-yaml: [:::").unwrap();

    let err = Settings::load(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("YAML"), "got: {err}");
}

#[test]
#[serial]
fn load_rejects_missing_file() {
    clear_env();
    let missing = PathBuf::from("/definitely/not/here.yaml");
    assert!(Settings::load(Some(&missing)).is_err());
}
