//! Output file naming for generated signatures
//!
//! Names are built from the recipient's row, made safe for every common
//! filesystem and then de-duplicated against everything already reserved in
//! the batch and everything already present in the export target.

use std::collections::HashSet;

use crate::app::models::{Row, fold_key};
use crate::constants::{
    ARTIFACT_EXTENSION, EMAIL_COLUMNS, FILE_NAME_REPLACEMENT, ILLEGAL_FILE_NAME_CHARS,
    MAX_FILE_STEM_LENGTH, NAME_COLUMNS, ROW_LABEL_PREFIX,
};

/// User-chosen parts of generated names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPolicy {
    /// Label used when a row has no name-like value (before the `row_N` fallback)
    pub fallback_label: Option<String>,

    /// Appended to every base name as `_{suffix}`
    pub suffix: Option<String>,

    /// Maximum stem length in characters
    pub max_stem_length: usize,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            fallback_label: None,
            suffix: None,
            max_stem_length: MAX_FILE_STEM_LENGTH,
        }
    }
}

/// Replace characters that are illegal in file names with `_`
///
/// Leading and trailing spaces and dots are also trimmed since several
/// platforms reject or silently strip them. An empty result becomes `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_control() || ILLEGAL_FILE_NAME_CHARS.contains(&c) {
                FILE_NAME_REPLACEMENT
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c == ' ' || c == '.');
    if trimmed.is_empty() {
        FILE_NAME_REPLACEMENT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Truncate to at most `max` characters on a character boundary
fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}

/// Allocates unique artifact file names for one batch
#[derive(Debug, Clone)]
pub struct OutputNamer {
    policy: NamingPolicy,
    reserved: HashSet<String>,
}

impl OutputNamer {
    pub fn new(policy: NamingPolicy) -> Self {
        Self {
            policy,
            reserved: HashSet::new(),
        }
    }

    /// Treat names already present in the target as taken
    pub fn with_existing<I, S>(mut self, existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.reserved
            .extend(existing.into_iter().map(|name| fold_key(name.as_ref())));
        self
    }

    /// Sanitized, truncated stem for a row, before de-duplication
    ///
    /// `index` is the 1-based position of the row in the batch.
    pub fn base_name(&self, row: &Row, index: usize) -> String {
        let label = row
            .first_non_blank(NAME_COLUMNS)
            .map(|name| name.trim().to_string())
            .or_else(|| {
                self.policy
                    .fallback_label
                    .as_deref()
                    .map(str::trim)
                    .filter(|label| !label.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("{}{}", ROW_LABEL_PREFIX, index));

        let mut parts = vec![sanitize_file_name(&label)];
        if let Some(email) = row.first_non_blank(EMAIL_COLUMNS) {
            parts.push(sanitize_file_name(email.trim()));
        }
        if let Some(suffix) = self.policy.suffix.as_deref().filter(|s| !s.trim().is_empty()) {
            parts.push(sanitize_file_name(suffix.trim()));
        }

        let joined = parts.join("_");
        truncate_chars(&joined, self.policy.max_stem_length)
            .trim_end_matches(|c: char| c == ' ' || c == '.')
            .to_string()
    }

    /// Reserve a unique file name (extension included) for a row
    pub fn assign(&mut self, row: &Row, index: usize) -> String {
        let stem = self.base_name(row, index);
        self.reserve_stem(&stem)
    }

    /// Reserve `stem.html`, or `stem (2).html`, `stem (3).html`, ... when taken
    pub fn reserve_stem(&mut self, stem: &str) -> String {
        let mut candidate = format!("{}.{}", stem, ARTIFACT_EXTENSION);
        let mut counter = 2;
        while !self.reserved.insert(fold_key(&candidate)) {
            candidate = format!("{} ({}).{}", stem, counter, ARTIFACT_EXTENSION);
            counter += 1;
        }
        candidate
    }

    pub fn reserved_count(&self) -> usize {
        self.reserved.len()
    }
}
