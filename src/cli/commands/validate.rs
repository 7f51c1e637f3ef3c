//! Validate command implementation
//!
//! Parses the data file and checks it against the template without rendering
//! or writing anything.

use colored::*;
use tracing::{debug, info};

use super::shared::{RunSummary, load_configuration, read_source, setup_logging};
use crate::app::models::{TokenSyntax, ValidationResult};
use crate::app::services::batch_pipeline::{BatchPipeline, PreparedBatch};
use crate::cli::args::ValidateArgs;
use crate::{Error, Result};

/// Validate command runner
pub async fn run_validate(args: ValidateArgs) -> Result<RunSummary> {
    let start_time = std::time::Instant::now();

    setup_logging(&args.common)?;
    debug!("Validate arguments: {:?}", args);
    args.validate()?;

    let mut config = load_configuration(&args.common)?;
    args.source.apply_to(&mut config);
    config.validate()?;

    let template = read_source(&args.source.template, "template")?;
    let table = read_source(&args.source.data, "data file")?;

    let pipeline = BatchPipeline::new(config.pipeline.clone());
    let prepared = pipeline.prepare(&template, &table);
    let lines = report_lines(pipeline.config().syntax, &prepared);

    print_report(&prepared, &lines);
    info!("Validation finished: {}", prepared.validation.summary());

    if let ValidationResult::Invalid { .. } = prepared.validation {
        return Err(Error::schema(prepared.validation.summary(), lines));
    }

    Ok(RunSummary {
        diagnostics: lines.len(),
        elapsed: start_time.elapsed(),
        ..RunSummary::default()
    })
}

/// Diagnostic lines in the order a batch would emit them
pub fn report_lines(syntax: TokenSyntax, prepared: &PreparedBatch) -> Vec<String> {
    let mut lines: Vec<String> = prepared
        .parsed
        .rejected
        .iter()
        .map(|rejected| rejected.diagnostic())
        .collect();

    if prepared.parsed.table.is_empty() || prepared.parsed.stats.total_records == 0 {
        lines.push("Data file seems empty (needs a header and at least one data row).".to_string());
        return lines;
    }
    if syntax == TokenSyntax::DoubleBrace && prepared.placeholders.is_empty() {
        lines.push("Template contains no {{placeholders}}.".to_string());
        return lines;
    }

    lines.extend(prepared.validation.diagnostics().iter().cloned());
    lines
}

fn print_report(prepared: &PreparedBatch, lines: &[String]) {
    let table = &prepared.parsed.table;

    println!("{}", "Data File".bright_green().bold());
    println!(
        "  {} {} ({} delimiter)",
        "Columns:".bright_cyan(),
        table.headers.join(", "),
        table.delimiter
    );
    println!(
        "  {} {} parsed, {} skipped, {} padded, {} truncated",
        "Rows:".bright_cyan(),
        prepared.parsed.stats.rows_parsed,
        prepared.parsed.stats.rows_skipped,
        prepared.parsed.stats.rows_padded,
        prepared.parsed.stats.rows_truncated
    );
    println!(
        "  {} {}",
        "Fields:".bright_cyan(),
        prepared.placeholders.names().join(", ")
    );

    let status = prepared.validation.summary();
    let status = match prepared.validation {
        ValidationResult::Valid { .. } => status.bright_green().bold(),
        ValidationResult::Invalid { .. } => status.bright_red().bold(),
        ValidationResult::NotAttempted => status.bright_yellow(),
    };
    println!("  {} {}", "Result:".bright_cyan(), status);

    for line in lines {
        println!("  - {}", line);
    }
}
