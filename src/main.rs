//! Simfleet: batch automation for a fleet of Unity simulation projects.
//!
//! This is the main entry point for the `simfleet` CLI. It sets up logging,
//! parses arguments, dispatches to the selected workflow, and maps errors to
//! exit codes.

mod build;
mod cli;
mod commands;
pub mod config;
mod csharp;
mod encoding;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod git;
mod manifest;
mod project;
mod system_manager;
mod unity;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse_args();

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
