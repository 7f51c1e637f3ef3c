//! Batch pipeline orchestration
//!
//! One [`BatchPipeline::run`] call is one batch: the template and table text
//! are read-only inputs, rows are processed strictly in table order and
//! diagnostics are appended in that same order.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::progress::ProgressObserver;
use super::sink::ArtifactSink;
use super::stats::{BatchReport, BatchStats};
use crate::Result;
use crate::app::models::{
    Diagnostic, GeneratedArtifact, PlaceholderSet, Row, RowWidthPolicy, Table, TokenSyntax,
    ValidationResult,
};
use crate::app::services::output_namer::{NamingPolicy, OutputNamer};
use crate::app::services::placeholder::extract_placeholders;
use crate::app::services::renderer::TemplateRenderer;
use crate::app::services::schema_validator;
use crate::app::services::table_reader::{ParsedTable, RejectedRow, TableReader};
use crate::constants::{EMAIL_COLUMNS, NAME_COLUMNS};

/// Which pipeline variant runs and how its outputs are named
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Template token syntax
    pub syntax: TokenSyntax,

    /// Row width policy; `None` uses the syntax's historical default
    pub row_width: Option<RowWidthPolicy>,

    /// Label used when a row has no name-like value
    pub fallback_label: Option<String>,

    /// Suffix appended to every generated name
    pub name_suffix: Option<String>,

    /// Maximum file stem length
    pub max_name_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let naming = NamingPolicy::default();
        Self {
            syntax: TokenSyntax::default(),
            row_width: None,
            fallback_label: naming.fallback_label,
            name_suffix: naming.suffix,
            max_name_length: naming.max_stem_length,
        }
    }
}

impl PipelineConfig {
    /// Direct fill-in: `{field}` tokens, strict row width, no validation
    pub fn direct() -> Self {
        Self {
            syntax: TokenSyntax::SingleBrace,
            ..Self::default()
        }
    }

    /// Validated fill-in: `{{field}}` tokens, lenient row width, schema validation
    pub fn validated() -> Self {
        Self {
            syntax: TokenSyntax::DoubleBrace,
            ..Self::default()
        }
    }

    pub fn with_row_width(mut self, policy: RowWidthPolicy) -> Self {
        self.row_width = Some(policy);
        self
    }

    pub fn effective_row_width(&self) -> RowWidthPolicy {
        self.row_width
            .unwrap_or_else(|| self.syntax.default_row_width())
    }

    pub fn naming_policy(&self) -> NamingPolicy {
        NamingPolicy {
            fallback_label: self.fallback_label.clone(),
            suffix: self.name_suffix.clone(),
            max_stem_length: self.max_name_length,
        }
    }
}

/// Parsed and validated inputs, before any rendering
#[derive(Debug, Clone)]
pub struct PreparedBatch {
    pub parsed: ParsedTable,
    pub placeholders: PlaceholderSet,
    pub validation: ValidationResult,
}

/// One work item in table order
enum RowSlot<'a> {
    Accepted(&'a Row),
    Rejected(&'a RejectedRow),
}

impl RowSlot<'_> {
    fn line_number(&self) -> usize {
        match self {
            RowSlot::Accepted(row) => row.line_number,
            RowSlot::Rejected(rejected) => rejected.line_number,
        }
    }
}

/// Template-fill pipeline
#[derive(Debug, Clone, Default)]
pub struct BatchPipeline {
    config: PipelineConfig,
}

impl BatchPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn reader(&self) -> TableReader {
        TableReader::new(self.config.effective_row_width())
    }

    /// Parse, extract and validate without rendering anything
    ///
    /// For single-brace templates the placeholder set is the table's distinct
    /// headers and validation is `NotAttempted`.
    pub fn prepare(&self, template: &str, table_text: &str) -> PreparedBatch {
        let mut parsed = self.reader().parse_str(table_text);

        match self.config.syntax {
            TokenSyntax::SingleBrace => {
                let placeholders = PlaceholderSet::from_names(parsed.table.distinct_headers());
                PreparedBatch {
                    parsed,
                    placeholders,
                    validation: ValidationResult::NotAttempted,
                }
            }
            TokenSyntax::DoubleBrace => {
                let placeholders = extract_placeholders(template);
                let table = std::mem::take(&mut parsed.table);
                let headers = table.headers.clone();
                let delimiter = table.delimiter;
                let validation = schema_validator::validate(&placeholders, table);

                // The parsed table keeps its shape for reporting; rows live on
                // only inside a valid result.
                parsed.table = Table {
                    headers,
                    rows: Vec::new(),
                    delimiter,
                };
                PreparedBatch {
                    parsed,
                    placeholders,
                    validation,
                }
            }
        }
    }

    /// Run a full batch
    ///
    /// Returns `Err` only for batch-fatal failures (I/O, archive, sink).
    /// Validation failures, skipped rows and cancellation are reported in the
    /// returned [`BatchReport`].
    pub fn run<S, P>(
        &self,
        template: &str,
        table_text: &str,
        sink: &mut S,
        progress: &mut P,
        cancel: &CancellationToken,
    ) -> Result<BatchReport>
    where
        S: ArtifactSink + ?Sized,
        P: ProgressObserver + ?Sized,
    {
        info!(
            "Starting batch: {} syntax, {} row width",
            self.config.syntax,
            self.config.effective_row_width()
        );

        let mut parsed = self.reader().parse_str(table_text);
        let mut report = BatchReport::new(ValidationResult::NotAttempted);

        if parsed.table.is_empty() || (parsed.table.rows.is_empty() && parsed.rejected.is_empty())
        {
            emit(
                &mut report,
                "Data file seems empty (needs a header and at least one data row).",
            );
            return Ok(report);
        }

        let (table, renderer) = match self.config.syntax {
            TokenSyntax::SingleBrace => (
                std::mem::take(&mut parsed.table),
                TemplateRenderer::single_brace(template),
            ),
            TokenSyntax::DoubleBrace => {
                let placeholders = extract_placeholders(template);
                if placeholders.is_empty() {
                    emit(&mut report, "Template contains no {{placeholders}}.");
                    return Ok(report);
                }
                debug!("Template placeholders: {:?}", placeholders.names());

                match schema_validator::validate(&placeholders, std::mem::take(&mut parsed.table)) {
                    ValidationResult::Valid { table } => {
                        (table, TemplateRenderer::double_brace(template, &placeholders))
                    }
                    blocked => {
                        for rejected in &parsed.rejected {
                            emit(&mut report, rejected.diagnostic());
                        }
                        for line in blocked.diagnostics() {
                            emit(&mut report, line.clone());
                        }
                        report.validation = blocked;
                        return Ok(report);
                    }
                }
            }
        };

        self.render_rows(&table, &parsed.rejected, &renderer, sink, progress, cancel, &mut report)?;

        if self.config.syntax == TokenSyntax::DoubleBrace {
            report.validation = ValidationResult::Valid { table };
        }
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn render_rows<S, P>(
        &self,
        table: &Table,
        rejected: &[RejectedRow],
        renderer: &TemplateRenderer,
        sink: &mut S,
        progress: &mut P,
        cancel: &CancellationToken,
        report: &mut BatchReport,
    ) -> Result<()>
    where
        S: ArtifactSink + ?Sized,
        P: ProgressObserver + ?Sized,
    {
        let mut slots: Vec<RowSlot<'_>> = table
            .rows
            .iter()
            .map(RowSlot::Accepted)
            .chain(rejected.iter().map(RowSlot::Rejected))
            .collect();
        slots.sort_by_key(|slot| slot.line_number());

        let mut namer = OutputNamer::new(self.config.naming_policy())
            .with_existing(sink.existing_names()?);
        let mut stats = BatchStats::new(slots.len());
        progress.on_start(stats.rows_total);

        for (position, slot) in slots.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(
                    "Batch cancelled after {} of {} rows",
                    stats.rows_attempted, stats.rows_total
                );
                emit(
                    report,
                    format!(
                        "Cancelled after {} of {} rows.",
                        stats.rows_attempted, stats.rows_total
                    ),
                );
                stats.cancelled = true;
                break;
            }

            match slot {
                RowSlot::Rejected(rejected) => {
                    emit(report, rejected.diagnostic());
                    stats.rows_skipped += 1;
                }
                RowSlot::Accepted(row) => {
                    let artifact = build_artifact(row, renderer, &mut namer, position + 1);
                    match sink.persist(&artifact) {
                        Ok(()) => {
                            debug!("Row {}: generated {}", row.line_number, artifact.file_name);
                            report.artifacts.push(artifact);
                            stats.artifacts_generated += 1;
                        }
                        Err(e) if !e.is_batch_fatal() => {
                            emit(report, format!("Row {}: {}, skipping.", row.line_number, e));
                            stats.rows_skipped += 1;
                        }
                        Err(e) => {
                            progress.on_finish(&stats);
                            return Err(e);
                        }
                    }
                }
            }

            stats.rows_attempted += 1;
            progress.on_row(stats.rows_attempted, stats.rows_total);
        }

        if !stats.cancelled {
            report.target = sink.finish()?;
            if let Some(target) = &report.target {
                emit(
                    report,
                    format!(
                        "Generated {} signatures into: {}",
                        stats.artifacts_generated, target
                    ),
                );
            }
        }

        info!("{}", stats.summary());
        progress.on_finish(&stats);
        report.stats = stats;
        Ok(())
    }
}

/// Render one row into an artifact with a freshly reserved name
fn build_artifact(
    row: &Row,
    renderer: &TemplateRenderer,
    namer: &mut OutputNamer,
    index: usize,
) -> GeneratedArtifact {
    GeneratedArtifact {
        row_number: row.line_number,
        recipient_name: row.first_non_blank(NAME_COLUMNS).map(str::to_string),
        recipient_email: row
            .first_non_blank(EMAIL_COLUMNS)
            .map(|email| email.trim().to_string()),
        content: renderer.render(row),
        file_name: namer.assign(row, index),
    }
}

/// Append a diagnostic and mirror it to the log
fn emit(report: &mut BatchReport, message: impl Into<String>) {
    let diagnostic = Diagnostic::new(message);
    debug!("{}", diagnostic.message);
    report.diagnostics.push(diagnostic);
}
