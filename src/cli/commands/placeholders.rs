//! Placeholders command implementation

use colored::*;
use tracing::{debug, warn};

use super::shared::{RunSummary, read_source, setup_logging};
use crate::app::models::TokenSyntax;
use crate::app::services::export::write_csv_template;
use crate::app::services::placeholder::list_fields;
use crate::cli::args::PlaceholdersArgs;
use crate::Result;

/// List a template's fields and optionally write a matching data file template
pub async fn run_placeholders(args: PlaceholdersArgs) -> Result<RunSummary> {
    let start_time = std::time::Instant::now();

    setup_logging(&args.common)?;
    debug!("Placeholders arguments: {:?}", args);
    args.validate()?;

    let syntax: TokenSyntax = args.syntax.into();
    let template = read_source(&args.template, "template")?;
    let fields = list_fields(&template, syntax);

    if fields.is_empty() {
        warn!("No placeholders found in {}", args.template.display());
        println!("Template contains no {{{{placeholders}}}}.");
        return Ok(RunSummary {
            diagnostics: 1,
            elapsed: start_time.elapsed(),
            ..RunSummary::default()
        });
    }

    println!(
        "{} ({})",
        "Template Fields".bright_green().bold(),
        fields.len().to_string().bright_white().bold()
    );
    for field in &fields {
        println!("  {}", field);
    }

    if let Some(path) = &args.csv_template {
        write_csv_template(path, &fields)?;
        println!(
            "\n{} {}",
            "CSV template written to:".bright_cyan(),
            path.display()
        );
    }

    Ok(RunSummary {
        elapsed: start_time.elapsed(),
        ..RunSummary::default()
    })
}
