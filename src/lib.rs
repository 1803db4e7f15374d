pub mod error;
pub mod logging;
pub mod orchestrate;
pub mod settings;
pub mod snapshot;
pub mod store;
pub mod uploader;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use orchestrate::BackupRunner;
use settings::Settings;
use store::S3Store;

#[derive(Parser)]
#[clap(
    name = "bucket-backup",
    version,
    about = "Snapshot a local folder tree and upload it to an S3-compatible bucket"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Snapshot the source folder and upload it under the destination prefix
    Run {
        /// Path to a YAML settings file; environment variables override it
        #[clap(long)]
        config: Option<PathBuf>,
        /// Source folder to back up (overrides the configured default)
        #[clap(long)]
        source: Option<PathBuf>,
        /// Destination prefix in the bucket (overrides the configured default)
        #[clap(long)]
        prefix: Option<String>,
        /// Keep the temporary snapshot after the run
        #[clap(long)]
        keep_temp: bool,
        /// Suppress the per-file progress lines
        #[clap(long)]
        no_progress: bool,
    },
    /// Compare the object count under a prefix with an expected value
    Verify {
        /// Path to a YAML settings file; environment variables override it
        #[clap(long)]
        config: Option<PathBuf>,
        /// Destination prefix to list
        #[clap(long)]
        prefix: String,
        /// Expected number of objects under the prefix
        #[clap(long)]
        expected: usize,
    },
}

type RunnerAndGuard = (
    BackupRunner<S3Store>,
    Option<tracing_appender::non_blocking::WorkerGuard>,
);

async fn connect_runner(config: Option<&std::path::Path>) -> Result<RunnerAndGuard> {
    let settings = Settings::load(config)?;
    let guard = logging::init(&settings.log_level, settings.log_file.as_deref());
    settings.validate()?;
    let store = S3Store::connect(
        &settings.bucket,
        settings.credentials_file.as_deref(),
        settings.region.as_deref(),
        settings.endpoint.as_deref(),
    )
    .await?;
    Ok((BackupRunner::new(settings, store)?, guard))
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            config,
            source,
            prefix,
            keep_temp,
            no_progress,
        } => {
            let (runner, _guard) = connect_runner(config.as_deref()).await?;
            println!("Backup starting...");
            let report = runner
                .process_and_upload(
                    source.as_deref(),
                    prefix.as_deref(),
                    keep_temp.then_some(true),
                    !no_progress,
                )
                .await?;
            if report.success {
                println!("Backup complete: {} files uploaded", report.files_uploaded);
                Ok(())
            } else {
                let reason = report
                    .error
                    .unwrap_or_else(|| "no files uploaded".to_string());
                eprintln!("[ERROR] Backup did not complete: {reason}");
                Err(anyhow::Error::msg(reason))
            }
        }
        Commands::Verify {
            config,
            prefix,
            expected,
        } => {
            let (runner, _guard) = connect_runner(config.as_deref()).await?;
            if runner.verify_backup(&prefix, expected).await {
                println!("Backup verified: {expected} objects under {prefix}");
                Ok(())
            } else {
                eprintln!("[ERROR] Backup verification failed for prefix {prefix}");
                Err(anyhow::anyhow!(
                    "verification failed: expected {expected} objects under {prefix}"
                ))
            }
        }
    }
}
