//! Shared components for CLI commands
//!
//! This module contains common types, utilities, and functions used across
//! multiple CLI command implementations.

use std::path::Path;
use std::time::Duration;

use colored::*;
use tracing::{debug, info};

use crate::app::models::Diagnostic;
use crate::app::services::batch_pipeline::BatchStats;
use crate::cli::args::CommonArgs;
use crate::config::Config;
use crate::{Error, Result};

/// What a command did, for the final exit status
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Signatures generated
    pub artifacts: usize,
    /// Emails sent
    pub messages_sent: usize,
    /// Diagnostics shown to the user
    pub diagnostics: usize,
    /// Total command time
    pub elapsed: Duration,
}

/// Set up structured logging
pub fn setup_logging(common: &CommonArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = common.get_log_level();

    // Create filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("signature_generator={}", log_level)));

    let result = if common.quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        // Standard logging with timestamps
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (file -> env); flags are applied by the caller
pub fn load_configuration(common: &CommonArgs) -> Result<Config> {
    info!("Loading configuration");

    let default_config_path = if common.config_file.is_none() {
        Config::default_config_path().ok()
    } else {
        None
    };

    let config_file = match &common.config_file {
        Some(path) => Some(path.as_path()),
        None => default_config_path
            .as_ref()
            .filter(|path| path.exists())
            .map(|path| path.as_path()),
    };

    if let Some(config_path) = config_file {
        info!("Using config file: {}", config_path.display());
    } else {
        info!("No config file found, using defaults and environment variables");
    }

    Config::load_layered(config_file)
}

/// Read a UTF-8 input file, dropping a leading BOM
pub fn read_source(path: &Path, label: &str) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Failed to read {} {}", label, path.display()), e))?;
    debug!("Read {} bytes from {} {}", content.len(), label, path.display());

    Ok(match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Print timestamped diagnostics to stdout in emission order
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        println!(
            "{} {}",
            format!("[{}]", diagnostic.at.format("%H:%M:%S")).dimmed(),
            diagnostic.message
        );
    }
}

/// Print the final batch summary
pub fn print_batch_summary(stats: &BatchStats, elapsed: Duration) {
    println!("\n{}", "Generation Summary".bright_green().bold());
    println!(
        "  {} {}/{}",
        "Rows attempted:".bright_cyan(),
        stats.rows_attempted.to_string().bright_white().bold(),
        stats.rows_total
    );
    println!(
        "  {} {}",
        "Signatures:".bright_cyan(),
        stats.artifacts_generated.to_string().bright_white().bold()
    );
    if stats.rows_skipped > 0 {
        println!(
            "  {} {}",
            "Skipped rows:".bright_cyan(),
            stats.rows_skipped.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {:.2}s",
        "Elapsed:".bright_cyan(),
        elapsed.as_secs_f64()
    );
}
