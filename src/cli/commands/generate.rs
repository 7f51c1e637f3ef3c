//! Generate command implementation
//!
//! Runs the batch pipeline on a blocking thread while the runtime keeps
//! listening for Ctrl-C, then hands the artifacts to the chosen export target.

use std::path::PathBuf;
use std::time::Instant;

use colored::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::shared::{
    RunSummary, load_configuration, print_batch_summary, print_diagnostics, read_source,
    setup_logging,
};
use crate::app::services::batch_pipeline::{
    ArtifactSink, BatchPipeline, BatchReport, MemorySink, ProgressReporter,
};
use crate::app::services::batch_pipeline::progress::create_spinner;
use crate::app::services::export::{
    ArchiveSink, DeliveryReport, DeliverySettings, DirectorySink, MailAttachment, SmtpMailer, deliver_all,
    sender_mailbox,
};
use crate::cli::args::{ExportKind, GenerateArgs};
use crate::config::Config;
use crate::{Error, Result};

/// Generate command runner
pub async fn run_generate(args: GenerateArgs, cancel: CancellationToken) -> Result<RunSummary> {
    let start_time = Instant::now();

    setup_logging(&args.common)?;
    debug!("Generate arguments: {:?}", args);
    args.validate()?;

    let config = build_config(&args)?;
    let template = read_source(&args.source.template, "template")?;
    let table = read_source(&args.source.data, "data file")?;
    let pipeline = BatchPipeline::new(config.pipeline.clone());
    let show_progress = args.common.show_progress();

    let report = match args.export {
        ExportKind::Directory => {
            let sink = match &args.output {
                Some(dir) => DirectorySink::create(dir)?,
                None => {
                    let parent = config
                        .output
                        .directory
                        .clone()
                        .unwrap_or_else(std::env::temp_dir);
                    DirectorySink::timestamped(&parent)?
                }
            };
            run_batch(pipeline, template, table, sink, show_progress, cancel.clone()).await?
        }
        ExportKind::Zip => {
            let path = args.output.clone().unwrap_or_else(|| {
                config
                    .output
                    .directory
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(&config.output.archive_name)
            });
            let sink = ArchiveSink::create(path)?;
            run_batch(pipeline, template, table, sink, show_progress, cancel.clone()).await?
        }
        ExportKind::Email => {
            let sink = MemorySink::default();
            run_batch(pipeline, template, table, sink, show_progress, cancel.clone()).await?
        }
    };

    print_diagnostics(&report.diagnostics);
    check_report(&report)?;

    let mut summary = RunSummary {
        artifacts: report.artifacts.len(),
        diagnostics: report.diagnostics.len(),
        ..RunSummary::default()
    };

    if args.export == ExportKind::Email && !report.artifacts.is_empty() {
        let mut delivery = send_emails(&config, &report, show_progress, &cancel).await?;
        print_diagnostics(&delivery.diagnostics);
        summary.messages_sent = delivery.sent.len();
        summary.diagnostics += delivery.diagnostics.len();
        check_delivery(&mut delivery)?;
    }

    summary.elapsed = start_time.elapsed();
    if show_progress {
        print_batch_summary(&report.stats, summary.elapsed);
        if args.export == ExportKind::Email {
            println!(
                "  {} {}",
                "Emails sent:".bright_cyan(),
                summary.messages_sent.to_string().bright_white().bold()
            );
        }
    }

    info!("{}", report.stats.summary());
    Ok(summary)
}

/// Defaults, config file, environment, then this command's flags
fn build_config(args: &GenerateArgs) -> Result<Config> {
    let mut config = load_configuration(&args.common)?;

    args.source.apply_to(&mut config);
    if let Some(label) = &args.fallback_label {
        config.pipeline.fallback_label = Some(label.clone());
    }
    if let Some(suffix) = &args.suffix {
        config.pipeline.name_suffix = Some(suffix.clone());
    }
    if let Some(subject) = &args.subject {
        config.message.subject = subject.clone();
    }
    if let Some(body_file) = &args.body_file {
        config.message.body = read_source(body_file, "body file")?;
    }
    if let Some(attachment) = &args.attachment {
        config.message.attachment = Some(attachment.clone());
    }
    args.smtp.apply_to(&mut config);

    config.validate()?;
    if args.export == ExportKind::Email {
        config.validate_smtp()?;
    }
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Run the pipeline on the blocking pool
async fn run_batch<S>(
    pipeline: BatchPipeline,
    template: String,
    table: String,
    mut sink: S,
    show_progress: bool,
    cancel: CancellationToken,
) -> Result<BatchReport>
where
    S: ArtifactSink + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut progress = ProgressReporter::new(show_progress, "Generating signatures");
        pipeline.run(&template, &table, &mut sink, &mut progress, &cancel)
    })
    .await
    .map_err(|e| Error::processing_interrupted(format!("Generation task failed: {}", e)))?
}

/// Turn blocked or cancelled batches into errors for the exit status
fn check_report(report: &BatchReport) -> Result<()> {
    if report.is_cancelled() {
        return Err(Error::processing_interrupted("Generation cancelled by user"));
    }
    if report.is_blocked() {
        return Err(Error::schema(
            report.validation.summary(),
            report.validation.diagnostics().to_vec(),
        ));
    }
    Ok(())
}

/// Turn an aborted or cancelled delivery into an error once its lines are out
fn check_delivery(delivery: &mut DeliveryReport) -> Result<()> {
    if let Some(error) = delivery.aborted.take() {
        return Err(error);
    }
    if delivery.cancelled {
        return Err(Error::processing_interrupted("Delivery cancelled by user"));
    }
    Ok(())
}

async fn send_emails(
    config: &Config,
    report: &BatchReport,
    show_progress: bool,
    cancel: &CancellationToken,
) -> Result<DeliveryReport> {
    let extra_attachment = config
        .message
        .attachment
        .as_deref()
        .map(MailAttachment::from_path)
        .transpose()?;

    let settings = DeliverySettings {
        sender: sender_mailbox(&config.smtp)?,
        subject: config.message.subject.clone(),
        body: config.message.body.clone(),
        extra_attachment,
    };
    let mailer = SmtpMailer::from_settings(&config.smtp)?;

    let spinner = show_progress.then(|| {
        create_spinner(&format!("Sending {} emails...", report.artifacts.len()))
    });
    let delivery = deliver_all(&mailer, &report.artifacts, &settings, cancel).await;

    if let Some(pb) = spinner {
        if delivery.is_aborted() {
            pb.abandon_with_message(format!("Delivery aborted after {} emails", delivery.sent.len()));
        } else {
            pb.finish_with_message(format!("{} emails sent", delivery.sent.len()));
        }
    }
    Ok(delivery)
}
