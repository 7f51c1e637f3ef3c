//! Tests for the single-brace (direct) pipeline variant

use tokio_util::sync::CancellationToken;

use super::{PickySink, RecordingProgress};
use crate::Error;
use crate::app::models::{RowWidthPolicy, ValidationResult};
use crate::app::services::batch_pipeline::{BatchPipeline, MemorySink, NoProgress, PipelineConfig};

const TEMPLATE: &str = "<p>{Name}</p><a href=\"mailto:{Email}\">{Email}</a> {Unknown}";

#[test]
fn test_direct_fill_renders_every_row() {
    let pipeline = BatchPipeline::new(PipelineConfig::direct());
    let table = "Name;Email\nAnn;ann@x.com\nBo;bo@x.com\n";

    let report = pipeline
        .run(
            TEMPLATE,
            table,
            &mut MemorySink::default(),
            &mut NoProgress,
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(report.artifacts.len(), 2);
    assert_eq!(
        report.artifacts[0].content,
        "<p>Ann</p><a href=\"mailto:ann@x.com\">ann@x.com</a> {Unknown}"
    );
    assert_eq!(report.artifacts[1].file_name, "Bo_bo@x.com.html");
    assert_eq!(report.artifacts[1].recipient_email.as_deref(), Some("bo@x.com"));
    assert!(report.diagnostics.is_empty());
    assert_eq!(report.validation, ValidationResult::NotAttempted);
}

#[test]
fn test_strict_skip_counts_rows_below_the_header() {
    let report = BatchPipeline::new(PipelineConfig::direct())
        .run(
            "{name}",
            "name,email\nAnn\nBo,b@x.com\n",
            &mut MemorySink::default(),
            &mut NoProgress,
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(report.messages(), vec!["Row 1: column count mismatch, skipping."]);
    assert_eq!(report.artifacts.len(), 1);
    assert_eq!(report.artifacts[0].content, "Bo");
}

#[test]
fn test_strict_width_skips_mismatched_rows_in_order() {
    let pipeline = BatchPipeline::new(PipelineConfig::direct());
    let table = "Name;Email\nAnn;ann@x.com\nBo;bo@x.com;extra\nCy\nDee;dee@x.com\n";
    let mut progress = RecordingProgress::default();

    let report = pipeline
        .run(
            TEMPLATE,
            table,
            &mut MemorySink::default(),
            &mut progress,
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(
        report.messages(),
        vec![
            "Row 2: column count mismatch, skipping.",
            "Row 3: column count mismatch, skipping.",
        ]
    );
    let rows: Vec<usize> = report.artifacts.iter().map(|a| a.row_number).collect();
    assert_eq!(rows, vec![2, 5]);
    assert_eq!(report.stats.rows_skipped, 2);
    assert_eq!(report.stats.artifacts_generated, 2);
}

#[test]
fn test_lenient_override_pads_short_rows() {
    let config = PipelineConfig::direct().with_row_width(RowWidthPolicy::Lenient);
    let pipeline = BatchPipeline::new(config);

    let report = pipeline
        .run(
            "{Name}<{Email}>",
            "Name;Email\nAnn\n",
            &mut MemorySink::default(),
            &mut NoProgress,
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(report.artifacts.len(), 1);
    assert_eq!(report.artifacts[0].content, "Ann<>");
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_progress_counts_every_attempted_row() {
    let pipeline = BatchPipeline::new(PipelineConfig::direct());
    let table = "Name;Email\nAnn;ann@x.com\nbroken\nBo;bo@x.com\n";
    let mut progress = RecordingProgress::default();

    pipeline
        .run(
            TEMPLATE,
            table,
            &mut MemorySink::default(),
            &mut progress,
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(progress.started_with, Some(3));
    assert_eq!(progress.positions, vec![1, 2, 3]);
    let finished = progress.finished.expect("on_finish called");
    assert_eq!(finished.rows_attempted, 3);
    assert!(!finished.cancelled);
}

#[test]
fn test_cancellation_stops_between_rows() {
    let pipeline = BatchPipeline::new(PipelineConfig::direct());
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut sink = MemorySink::default();

    let report = pipeline
        .run(
            TEMPLATE,
            "Name;Email\nAnn;ann@x.com\nBo;bo@x.com\n",
            &mut sink,
            &mut NoProgress,
            &cancel,
        )
        .unwrap();

    assert!(report.is_cancelled());
    assert!(report.artifacts.is_empty());
    assert!(sink.persisted.is_empty());
    assert_eq!(report.messages(), vec!["Cancelled after 0 of 2 rows."]);
    assert_eq!(report.target, None);
}

#[test]
fn test_sink_rejection_skips_only_that_row() {
    let pipeline = BatchPipeline::new(PipelineConfig::direct());
    let table = "Name;Email\nAnn;ann@x.com\nBo;bo-at-x.com\nCy;cy@x.com\n";
    let mut sink = PickySink::default();

    let report = pipeline
        .run(
            TEMPLATE,
            table,
            &mut sink,
            &mut NoProgress,
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(sink.accepted.len(), 2);
    assert_eq!(
        report.messages(),
        vec![
            "Row 3: Invalid email address 'bo-at-x.com': missing @, skipping.",
            "Generated 2 signatures into: memory",
        ]
    );
    assert_eq!(report.target.as_deref(), Some("memory"));
}

#[test]
fn test_fatal_sink_error_aborts_batch() {
    let pipeline = BatchPipeline::new(PipelineConfig::direct());
    let mut sink = PickySink {
        fail_after: Some(1),
        ..PickySink::default()
    };
    let mut progress = RecordingProgress::default();

    let result = pipeline.run(
        TEMPLATE,
        "Name;Email\nAnn;ann@x.com\nBo;bo@x.com\nCy;cy@x.com\n",
        &mut sink,
        &mut progress,
        &CancellationToken::new(),
    );

    assert!(matches!(result, Err(Error::Io { .. })));
    assert_eq!(sink.accepted.len(), 1);
    assert_eq!(progress.positions, vec![1]);
    assert!(progress.finished.is_some());
}

#[test]
fn test_empty_table_is_reported() {
    let pipeline = BatchPipeline::new(PipelineConfig::direct());

    for table in ["", "   \n\n", "Name;Email\n"] {
        let report = pipeline
            .run(
                TEMPLATE,
                table,
                &mut MemorySink::default(),
                &mut NoProgress,
                &CancellationToken::new(),
            )
            .unwrap();

        assert!(report.artifacts.is_empty());
        assert_eq!(
            report.messages(),
            vec!["Data file seems empty (needs a header and at least one data row)."]
        );
    }
}

#[test]
fn test_names_avoid_existing_target_files() {
    let pipeline = BatchPipeline::new(PipelineConfig::direct());
    let mut sink = MemorySink::with_existing(["Ann_ann@x.com.html"]);

    let report = pipeline
        .run(
            TEMPLATE,
            "Name;Email\nAnn;ann@x.com\nAnn;ann@x.com\n",
            &mut sink,
            &mut NoProgress,
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(
        sink.persisted,
        vec!["Ann_ann@x.com (2).html", "Ann_ann@x.com (3).html"]
    );
    assert_eq!(report.artifacts.len(), 2);
}

#[test]
fn test_prepare_lists_headers_without_validating() {
    let pipeline = BatchPipeline::new(PipelineConfig::direct());
    let prepared = pipeline.prepare(TEMPLATE, "Name;Email;name\nAnn;a@x.com;dup\n");

    assert_eq!(prepared.placeholders.len(), 2);
    assert_eq!(prepared.validation, ValidationResult::NotAttempted);
    assert_eq!(prepared.parsed.table.row_count(), 1);
}
