//! Tracing setup: console output always, plus an optional non-blocking log
//! file. Constructed once per process run; the returned guard must stay alive
//! so buffered file output is flushed on exit.

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialises the global subscriber. `RUST_LOG` takes precedence over the
/// configured level; a second call in the same process is a no-op. Returns
/// the file writer guard when a log file is set.
pub fn init(level: &str, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            if let Some(dir) = dir {
                // Best effort; the appender will surface real write failures.
                let _ = fs::create_dir_all(dir);
            }
            let file_name = path.file_name().map_or_else(
                || "bucket-backup.log".into(),
                |name| name.to_os_string(),
            );
            let appender = tracing_appender::rolling::never(
                dir.unwrap_or_else(|| Path::new(".")),
                file_name,
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .try_init()
                .ok();
            Some(guard)
        }
        None => {
            registry.try_init().ok();
            None
        }
    }
}
