pub mod app;
pub mod archive;
pub mod cli;
pub mod color;
pub mod config;
pub mod convert;
pub mod error;
pub mod keymap;
pub mod logging;
pub mod parser;
pub mod storage;
pub mod theme;
pub use error::{AppError, AppResult};

use std::process::ExitCode;

use clap::Parser;

/// Entrypoint used by the binary: parses arguments, converts, maps the exit code.
pub fn run() -> ExitCode {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!("starting tdroiddesk");

    match cli::run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
