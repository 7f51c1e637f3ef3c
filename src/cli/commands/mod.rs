//! Command implementations for the signature generator CLI
//!
//! Each command is implemented in its own module:
//! - `generate`: run the pipeline and export the signatures
//! - `validate`: check a data file against a template
//! - `placeholders`: list template fields, optionally as a CSV template
//! - `smtp_test`: check the SMTP connection

pub mod generate;
pub mod placeholders;
pub mod shared;
pub mod validate;

pub use shared::RunSummary;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Args, Commands};
use crate::{Error, Result};

/// Main command runner
///
/// Dispatches to the subcommand handler. `cancel` is triggered on Ctrl-C and
/// checked between rows and between emails.
pub async fn run(args: Args, cancel: CancellationToken) -> Result<RunSummary> {
    let command = args
        .command
        .ok_or_else(|| Error::configuration("No command given"))?;

    match command {
        Commands::Generate(generate_args) => generate::run_generate(generate_args, cancel).await,
        Commands::Validate(validate_args) => validate::run_validate(validate_args).await,
        Commands::Placeholders(placeholders_args) => {
            placeholders::run_placeholders(placeholders_args).await
        }
        Commands::TestSmtp(smtp_args) => smtp_test::run_test_smtp(smtp_args).await,
    }
}
