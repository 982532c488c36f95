pub mod commands;
pub mod config;
pub mod models;
pub mod pipeline;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Parse the command line, run it, and map failures to an exit code.
pub fn run() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let cli = commands::Cli::parse();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(configuration = e.is_configuration(), "Run failed: {e}");
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
