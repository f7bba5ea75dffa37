//! forge-updater CLI entry point.
//!
//! Parses arguments, initializes logging, and dispatches to the command
//! implementations in [`forge_updater::cli`].

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use forge_updater::cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Colored output needs explicit enabling on Windows terminals.
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = cli::Cli::parse();
    if let Err(e) = cli.execute().await {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
    Ok(())
}
