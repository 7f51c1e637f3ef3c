//! Command-line argument definitions for the signature generator
//!
//! This module defines the complete CLI interface using the clap derive API.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use crate::app::models::{RowWidthPolicy, TokenSyntax};
use crate::config::Config;
use crate::{Error, Result};

/// CLI arguments for the signature generator
///
/// Fills an HTML signature template once per row of a delimited data file and
/// exports the results as files, a ZIP archive or emails.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "signature-generator",
    version,
    about = "Generate personalized HTML email signatures from a template and a data file",
    long_about = "Fills an HTML signature template once per row of a comma, semicolon or tab \
                  separated data file. Templates use {{field}} tokens (validated against the \
                  data file's columns) or {field} tokens (filled directly from the headers). \
                  Results can be written to a directory, bundled into a ZIP archive or sent \
                  to each recipient by email."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Generate one signature per data row and export them
    Generate(GenerateArgs),
    /// Check a data file against a template without generating anything
    Validate(ValidateArgs),
    /// List the placeholders of a template
    Placeholders(PlaceholdersArgs),
    /// Check that the SMTP server accepts a connection and the credentials
    TestSmtp(TestSmtpArgs),
}

/// Where generated signatures go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportKind {
    /// One HTML file per signature
    #[default]
    Directory,
    /// All signatures in a single ZIP archive
    Zip,
    /// One email per recipient with the signature attached
    Email,
}

/// Template syntax as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SyntaxArg {
    /// `{{field}}` tokens, validated against the data file
    Double,
    /// `{field}` tokens, filled from the data file headers
    Single,
}

impl From<SyntaxArg> for TokenSyntax {
    fn from(arg: SyntaxArg) -> Self {
        match arg {
            SyntaxArg::Double => TokenSyntax::DoubleBrace,
            SyntaxArg::Single => TokenSyntax::SingleBrace,
        }
    }
}

/// Row width policy as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RowWidthArg {
    /// Skip rows whose field count differs from the header
    Strict,
    /// Pad short rows and truncate long ones
    Lenient,
}

impl From<RowWidthArg> for RowWidthPolicy {
    fn from(arg: RowWidthArg) -> Self {
        match arg {
            RowWidthArg::Strict => RowWidthPolicy::Strict,
            RowWidthArg::Lenient => RowWidthPolicy::Lenient,
        }
    }
}

/// Options shared by every subcommand
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct CommonArgs {
    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// signature-generator/config.toml in the platform config directory.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings and hides progress bars.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl CommonArgs {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }
        Ok(())
    }
}

/// Template, data file and how to read them
#[derive(Debug, Clone, ClapArgs)]
pub struct SourceArgs {
    /// HTML signature template
    #[arg(short = 't', long = "template", value_name = "FILE")]
    pub template: PathBuf,

    /// Data file with a header row (comma, semicolon or tab separated)
    #[arg(short = 'd', long = "data", value_name = "FILE")]
    pub data: PathBuf,

    /// Placeholder syntax of the template
    #[arg(long = "syntax", value_enum, help = "Template token syntax [default: double]")]
    pub syntax: Option<SyntaxArg>,

    /// Override how rows with the wrong number of fields are handled
    ///
    /// Defaults to strict for single-brace templates and lenient for
    /// double-brace templates.
    #[arg(long = "row-width", value_enum)]
    pub row_width: Option<RowWidthArg>,
}

impl SourceArgs {
    pub fn validate(&self) -> Result<()> {
        for (label, path) in [("Template", &self.template), ("Data file", &self.data)] {
            if !path.is_file() {
                return Err(Error::configuration(format!(
                    "{} does not exist: {}",
                    label,
                    path.display()
                )));
            }
        }
        Ok(())
    }

    pub fn apply_to(&self, config: &mut Config) {
        if let Some(syntax) = self.syntax {
            config.pipeline.syntax = syntax.into();
        }
        if let Some(row_width) = self.row_width {
            config.pipeline.row_width = Some(row_width.into());
        }
    }
}

/// SMTP flags layered over the config file and environment
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct SmtpArgs {
    #[arg(long = "smtp-host", value_name = "HOST")]
    pub host: Option<String>,

    #[arg(long = "smtp-port", value_name = "PORT")]
    pub port: Option<u16>,

    #[arg(long = "smtp-user", value_name = "USER")]
    pub username: Option<String>,

    /// Prefer SIGGEN_SMTP_PASSWORD; command lines end up in shell history
    #[arg(long = "smtp-password", value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Sender address (defaults to the SMTP user)
    #[arg(long = "from", value_name = "ADDRESS")]
    pub from: Option<String>,

    /// Use implicit TLS instead of STARTTLS
    #[arg(long = "ssl")]
    pub ssl: bool,
}

impl SmtpArgs {
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.smtp.host = host.trim().to_string();
        }
        if let Some(port) = self.port {
            config.smtp.port = port;
        }
        if let Some(username) = &self.username {
            config.smtp.username = username.trim().to_string();
        }
        if let Some(password) = &self.password {
            config.smtp.password = password.clone();
        }
        if let Some(from) = &self.from {
            config.smtp.from = Some(from.trim().to_string());
        }
        if self.ssl {
            config.smtp.ssl = true;
        }
    }
}

/// Arguments for the generate command
#[derive(Debug, Clone, Parser)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Export target
    #[arg(short = 'e', long = "export", value_enum, default_value_t = ExportKind::Directory)]
    pub export: ExportKind,

    /// Output directory, or archive path with --export zip
    ///
    /// Without it, signatures go to a new signatures_YYYYMMDD_HHMMSS directory
    /// under the configured output directory (or the system temp directory),
    /// and archives are written to the configured output directory (or the
    /// current directory).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Label for rows without a name column value
    #[arg(long = "fallback-label", value_name = "LABEL")]
    pub fallback_label: Option<String>,

    /// Suffix appended to every file name
    #[arg(long = "suffix", value_name = "TEXT")]
    pub suffix: Option<String>,

    /// Email subject (with --export email)
    #[arg(long = "subject", value_name = "TEXT")]
    pub subject: Option<String>,

    /// Plain-text email body file (with --export email)
    #[arg(long = "body", value_name = "FILE")]
    pub body_file: Option<PathBuf>,

    /// Extra file attached to every email after the signature
    #[arg(long = "attach", value_name = "FILE")]
    pub attachment: Option<PathBuf>,

    #[command(flatten)]
    pub smtp: SmtpArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl GenerateArgs {
    /// Validate the generate command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        self.common.validate()?;
        self.source.validate()?;

        if let Some(body_file) = &self.body_file {
            if !body_file.is_file() {
                return Err(Error::configuration(format!(
                    "Body file does not exist: {}",
                    body_file.display()
                )));
            }
        }

        if self.export != ExportKind::Email
            && (self.subject.is_some() || self.body_file.is_some() || self.attachment.is_some())
        {
            return Err(Error::configuration(
                "--subject, --body and --attach only apply to --export email",
            ));
        }

        if self.export == ExportKind::Email && self.output.is_some() {
            return Err(Error::configuration("--output does not apply to --export email"));
        }

        Ok(())
    }
}

/// Arguments for the validate command
#[derive(Debug, Clone, Parser)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ValidateArgs {
    pub fn validate(&self) -> Result<()> {
        self.common.validate()?;
        self.source.validate()
    }
}

/// Arguments for the placeholders command
#[derive(Debug, Clone, Parser)]
pub struct PlaceholdersArgs {
    /// HTML signature template
    #[arg(short = 't', long = "template", value_name = "FILE")]
    pub template: PathBuf,

    /// Placeholder syntax of the template
    #[arg(long = "syntax", value_enum, default_value = "double")]
    pub syntax: SyntaxArg,

    /// Write a `;`-separated data file template with these columns
    #[arg(long = "csv-template", value_name = "FILE")]
    pub csv_template: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl PlaceholdersArgs {
    pub fn validate(&self) -> Result<()> {
        self.common.validate()?;
        if !self.template.is_file() {
            return Err(Error::configuration(format!(
                "Template does not exist: {}",
                self.template.display()
            )));
        }
        Ok(())
    }
}

/// Arguments for the test-smtp command
#[derive(Debug, Clone, Parser)]
pub struct TestSmtpArgs {
    #[command(flatten)]
    pub smtp: SmtpArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl Commands {
    /// Options shared by every subcommand
    pub fn common(&self) -> &CommonArgs {
        match self {
            Commands::Generate(args) => &args.common,
            Commands::Validate(args) => &args.common,
            Commands::Placeholders(args) => &args.common,
            Commands::TestSmtp(args) => &args.common,
        }
    }
}
