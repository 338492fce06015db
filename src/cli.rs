use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::app::{discover_themes, App, BatchReport};
use crate::config::{load_app_config, load_app_config_from};

pub const EXIT_OK: u8 = 0;
pub const EXIT_THEME_IS_DIRECTORY: u8 = 1;
pub const EXIT_THEME_NOT_FOUND: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "tdroiddesk",
    about = "Convert Telegram Android theme to Telegram Desktop ones.",
    version
)]
pub struct Cli {
    /// Theme to convert. Without it, every *.attheme in the working directory is converted.
    pub theme: Option<PathBuf>,

    /// Directory for the produced .tdesktop-theme files.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Config file to use instead of the one in the user config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log per-key decisions and state transitions.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Runs a conversion and returns the process exit code.
///
/// Failures of individual themes are reported but still exit with success.
pub fn run(cli: Cli) -> anyhow::Result<u8> {
    if let Some(theme) = &cli.theme {
        if theme.is_dir() {
            tracing::error!("{} is a directory", theme.display());
            return Ok(EXIT_THEME_IS_DIRECTORY);
        }
        if !theme.exists() {
            tracing::error!("{} does not exist", theme.display());
            return Ok(EXIT_THEME_NOT_FOUND);
        }
    }

    let mut config = match &cli.config {
        Some(path) => load_app_config_from(path)?,
        None => load_app_config(),
    };
    if cli.output_dir.is_some() {
        config.output_dir = cli.output_dir.clone();
    }

    let app = App::from_config(&config).context("failed to load theme maps")?;
    let themes = match cli.theme {
        Some(theme) => vec![theme],
        None => {
            let cwd = std::env::current_dir().context("failed to resolve working directory")?;
            discover_themes(&cwd)?
        }
    };

    let report = app.convert_batch(themes);
    log_summary(&report);
    Ok(EXIT_OK)
}

fn log_summary(report: &BatchReport) {
    if report.total() == 0 {
        tracing::warn!("no themes to convert");
        return;
    }
    tracing::info!(
        converted = report.converted.len(),
        failed = report.failed.len(),
        "conversion finished"
    );
}
