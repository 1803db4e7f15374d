use bucket_backup::{run, Cli};
use clap::Parser;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Ctrl-C aborts immediately; no cleanup of an in-progress snapshot.
    let code = tokio::select! {
        result = run(cli) => match result {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("[ERROR] Backup failed: {e:#}");
                1
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Interrupted by user");
            130
        }
    };

    std::process::exit(code);
}
