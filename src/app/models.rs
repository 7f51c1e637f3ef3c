//! Data models for signature generation
//!
//! This module contains the core data structures shared by the pipeline
//! stages: the parsed table, the placeholder set extracted from a template,
//! the validation outcome and the generated artifacts.
//!
//! All identifier comparisons (headers, placeholders, keys) go through
//! [`fold_key`], which folds case with Rust's locale-independent Unicode
//! lowercase mapping so results do not depend on the host locale.

use crate::{Error, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Identifier Comparison
// =============================================================================

/// Fold an identifier for case-insensitive comparison
pub fn fold_key(key: &str) -> String {
    key.to_lowercase()
}

/// Case-insensitive equality of two identifiers
pub fn keys_equal(a: &str, b: &str) -> bool {
    a == b || fold_key(a) == fold_key(b)
}

/// Ordinal case-insensitive ordering, ties broken by the raw ordinal order
pub fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    fold_key(a).cmp(&fold_key(b)).then_with(|| a.cmp(b))
}

// =============================================================================
// Pipeline Variants
// =============================================================================

/// Placeholder token syntax used by a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenSyntax {
    /// `{field}` tokens, driven by the table headers, no schema validation
    SingleBrace,
    /// `{{field}}` tokens, extracted and validated against the table
    #[default]
    DoubleBrace,
}

impl TokenSyntax {
    /// Row width policy that historically accompanies this syntax
    pub fn default_row_width(self) -> RowWidthPolicy {
        match self {
            TokenSyntax::SingleBrace => RowWidthPolicy::Strict,
            TokenSyntax::DoubleBrace => RowWidthPolicy::Lenient,
        }
    }
}

impl fmt::Display for TokenSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSyntax::SingleBrace => write!(f, "single-brace"),
            TokenSyntax::DoubleBrace => write!(f, "double-brace"),
        }
    }
}

impl FromStr for TokenSyntax {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "single-brace" | "single" | "direct" => Ok(TokenSyntax::SingleBrace),
            "double-brace" | "double" | "validated" => Ok(TokenSyntax::DoubleBrace),
            other => Err(Error::configuration(format!(
                "Unknown token syntax '{}'. Expected 'single-brace' or 'double-brace'",
                other
            ))),
        }
    }
}

/// What to do with data rows whose field count differs from the header count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowWidthPolicy {
    /// Skip the row and emit a diagnostic
    Strict,
    /// Pad missing fields with empty strings and drop extra fields
    Lenient,
}

impl fmt::Display for RowWidthPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowWidthPolicy::Strict => write!(f, "strict"),
            RowWidthPolicy::Lenient => write!(f, "lenient"),
        }
    }
}

impl FromStr for RowWidthPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(RowWidthPolicy::Strict),
            "lenient" => Ok(RowWidthPolicy::Lenient),
            other => Err(Error::configuration(format!(
                "Unknown row width policy '{}'. Expected 'strict' or 'lenient'",
                other
            ))),
        }
    }
}

// =============================================================================
// Table
// =============================================================================

/// Field delimiter of a delimited text table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
            Delimiter::Tab => '\t',
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Comma => write!(f, "comma"),
            Delimiter::Semicolon => write!(f, "semicolon"),
            Delimiter::Tab => write!(f, "tab"),
        }
    }
}

/// One data row, addressed by header name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based physical line number in the source text
    pub line_number: usize,

    /// `(header, value)` pairs in header order
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new(line_number: usize, fields: Vec<(String, String)>) -> Self {
        Self {
            line_number,
            fields,
        }
    }

    /// Case-insensitive lookup; with duplicate headers the first one wins
    pub fn get(&self, key: &str) -> Option<&str> {
        let folded = fold_key(key);
        self.fields
            .iter()
            .find(|(header, _)| header == key || fold_key(header) == folded)
            .map(|(_, value)| value.as_str())
    }

    /// Value of the first listed column that is present and non-blank
    pub fn first_non_blank(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parsed delimited table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    /// Trimmed, non-blank header names in source order
    pub headers: Vec<String>,

    /// Data rows in source order
    pub rows: Vec<Row>,

    /// Delimiter detected on the header line
    pub delimiter: Delimiter,
}

impl Table {
    /// A table with no headers and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no header line was found
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether a header exists (case-insensitive)
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|header| keys_equal(header, name))
    }

    /// Distinct headers, first spelling kept, in source order
    pub fn distinct_headers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.headers
            .iter()
            .filter(|header| seen.insert(fold_key(header)))
            .map(String::as_str)
            .collect()
    }
}

// =============================================================================
// Placeholders
// =============================================================================

/// Distinct field names referenced by a template
///
/// Names are de-duplicated case-insensitively (first spelling wins) and kept
/// sorted with [`compare_ignore_case`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaceholderSet {
    names: Vec<String>,
}

impl PlaceholderSet {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut distinct: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|name| seen.insert(fold_key(name)))
            .collect();
        distinct.sort_by(|a, b| compare_ignore_case(a, b));
        Self { names: distinct }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|candidate| keys_equal(candidate, name))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// =============================================================================
// Validation Outcome
// =============================================================================

/// Outcome of reconciling a template's placeholders with a table
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Headers match the placeholders exactly and every row is complete
    Valid { table: Table },

    /// Columns are missing or extra, or rows have blank required values
    Invalid {
        /// Placeholders with no matching column
        missing: Vec<String>,
        /// Columns with no matching placeholder
        extra: Vec<String>,
        /// Total number of blank required values across all rows
        row_violations: usize,
        /// Display diagnostics, capped with a "+N more" line
        diagnostics: Vec<String>,
    },

    /// There was no table or no placeholders to validate
    NotAttempted,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid { .. })
    }

    /// The validated table, only available when valid
    pub fn table(&self) -> Option<&Table> {
        match self {
            ValidationResult::Valid { table } => Some(table),
            _ => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            ValidationResult::Valid { table } => Some(table),
            _ => None,
        }
    }

    pub fn diagnostics(&self) -> &[String] {
        match self {
            ValidationResult::Invalid { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }

    /// Short human-readable status line
    pub fn summary(&self) -> String {
        match self {
            ValidationResult::Valid { table } => {
                format!("Valid: {} rows ready", table.row_count())
            }
            ValidationResult::Invalid {
                missing,
                extra,
                row_violations,
                ..
            } => format!(
                "Invalid: {} missing columns, {} extra columns, {} blank values",
                missing.len(),
                extra.len(),
                row_violations
            ),
            ValidationResult::NotAttempted => "Not attempted".to_string(),
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// One rendered signature, ready for export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    /// Line number of the source row
    pub row_number: usize,

    /// Value of the name-like column, if present
    pub recipient_name: Option<String>,

    /// Value of the address-like column, if present
    pub recipient_email: Option<String>,

    /// Rendered HTML
    pub content: String,

    /// Unique file name, extension included
    pub file_name: String,
}

impl GeneratedArtifact {
    /// Name to show in logs, falling back to the file name
    pub fn display_name(&self) -> &str {
        self.recipient_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.file_name)
    }
}

/// Timestamped diagnostic line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub at: DateTime<Local>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            at: Local::now(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}
