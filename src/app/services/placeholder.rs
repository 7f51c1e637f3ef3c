//! Placeholder extraction from signature templates
//!
//! Two token syntaxes exist. Double-brace templates (`{{field}}`) declare
//! their fields explicitly, so the field list can be extracted, shown to the
//! user and validated against the data file. Single-brace templates
//! (`{field}`) are filled directly from whatever columns the data file has;
//! their tokens are only listed for display, in the order they appear.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::app::models::{PlaceholderSet, TokenSyntax, fold_key};

/// `{{field}}` with no braces or line breaks inside
pub(crate) static DOUBLE_BRACE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}\r\n]*)\}\}").expect("valid double-brace pattern"));

/// `{field}` with no braces or line breaks inside
pub(crate) static SINGLE_BRACE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}\r\n]*)\}").expect("valid single-brace pattern"));

/// Distinct `{{field}}` names, trimmed and sorted case-insensitively
pub fn extract_placeholders(template: &str) -> PlaceholderSet {
    PlaceholderSet::from_names(
        DOUBLE_BRACE_TOKEN
            .captures_iter(template)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|name| !name.is_empty()),
    )
}

/// Distinct `{field}` names in order of first appearance
pub fn scan_single_brace_tokens(template: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    SINGLE_BRACE_TOKEN
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|name| !name.is_empty() && seen.insert(fold_key(name)))
        .map(str::to_string)
        .collect()
}

/// Field names referenced by a template under the given syntax, for display
pub fn list_fields(template: &str, syntax: TokenSyntax) -> Vec<String> {
    match syntax {
        TokenSyntax::SingleBrace => scan_single_brace_tokens(template),
        TokenSyntax::DoubleBrace => extract_placeholders(template).names().to_vec(),
    }
}
