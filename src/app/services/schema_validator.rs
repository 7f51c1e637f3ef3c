//! Reconciliation of template placeholders with data file columns
//!
//! A double-brace template is only filled when the data file has exactly the
//! columns the template asks for (compared case-insensitively, order ignored)
//! and every row has a value for each of them. Anything else blocks the batch
//! with an itemized list of what to fix.

use tracing::{debug, info};

use crate::app::models::{PlaceholderSet, Table, ValidationResult, fold_key};
use crate::constants::MAX_DISPLAYED_DIAGNOSTICS;
use std::collections::HashSet;

/// Column-level difference between placeholders and headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiff {
    /// Placeholders without a column, in placeholder order
    pub missing: Vec<String>,
    /// Columns without a placeholder, in header order
    pub extra: Vec<String>,
}

impl SchemaDiff {
    pub fn compute(placeholders: &PlaceholderSet, headers: &[String]) -> Self {
        let header_keys: HashSet<String> = headers.iter().map(|h| fold_key(h)).collect();

        let missing = placeholders
            .iter()
            .filter(|name| !header_keys.contains(&fold_key(name)))
            .map(str::to_string)
            .collect();

        let mut seen = HashSet::new();
        let extra = headers
            .iter()
            .filter(|header| !placeholders.contains(header))
            .filter(|header| seen.insert(fold_key(header)))
            .cloned()
            .collect();

        Self { missing, extra }
    }

    pub fn is_exact(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }

    /// One diagnostic line per non-empty category
    pub fn diagnostics(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.missing.is_empty() {
            lines.push(format!("Missing columns: {}", self.missing.join(", ")));
        }
        if !self.extra.is_empty() {
            lines.push(format!("Extra columns: {}", self.extra.join(", ")));
        }
        lines
    }
}

/// Validate a table against a template's placeholders
///
/// Takes ownership of the table: it is handed back inside
/// [`ValidationResult::Valid`] and dropped otherwise, so an invalid table can
/// never reach the renderer.
pub fn validate(placeholders: &PlaceholderSet, table: Table) -> ValidationResult {
    if placeholders.is_empty() || table.is_empty() {
        debug!("Validation not attempted: no placeholders or no table");
        return ValidationResult::NotAttempted;
    }

    let diff = SchemaDiff::compute(placeholders, &table.headers);
    if !diff.is_exact() {
        info!(
            "Schema mismatch: {} missing, {} extra columns",
            diff.missing.len(),
            diff.extra.len()
        );
        let diagnostics = diff.diagnostics();
        return ValidationResult::Invalid {
            missing: diff.missing,
            extra: diff.extra,
            row_violations: 0,
            diagnostics,
        };
    }

    let violations = find_row_violations(placeholders, &table);
    if violations.is_empty() {
        info!("Validation passed: {} rows", table.row_count());
        return ValidationResult::Valid { table };
    }

    info!("Validation failed: {} blank values", violations.len());
    ValidationResult::Invalid {
        missing: Vec::new(),
        extra: Vec::new(),
        row_violations: violations.len(),
        diagnostics: cap_diagnostics(violations, MAX_DISPLAYED_DIAGNOSTICS),
    }
}

/// Every blank required value, in row then placeholder order
pub fn find_row_violations(placeholders: &PlaceholderSet, table: &Table) -> Vec<String> {
    table
        .rows
        .iter()
        .flat_map(|row| {
            placeholders
                .iter()
                .filter(|field| row.get(field).is_none_or(|value| value.trim().is_empty()))
                .map(move |field| {
                    format!(
                        "Row {}: missing value for '{}'.",
                        row.line_number, field
                    )
                })
        })
        .collect()
}

/// Keep the first `limit` lines and summarize the rest as "+N more"
pub fn cap_diagnostics(mut lines: Vec<String>, limit: usize) -> Vec<String> {
    if lines.len() > limit {
        let hidden = lines.len() - limit;
        lines.truncate(limit);
        lines.push(format!("+{} more", hidden));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::RowWidthPolicy;
    use crate::app::services::table_reader::TableReader;

    fn parse(input: &str) -> Table {
        TableReader::new(RowWidthPolicy::Lenient).parse_str(input).table
    }

    fn placeholders(names: &[&str]) -> PlaceholderSet {
        PlaceholderSet::from_names(names.iter().copied())
    }

    #[test]
    fn test_exact_match_is_valid() {
        let table = parse("Email,NAME\na@x.com,Ann\nb@x.com,Bo\n");
        let result = validate(&placeholders(&["name", "email"]), table);

        assert!(result.is_valid());
        assert_eq!(result.table().unwrap().row_count(), 2);
        assert!(result.diagnostics().is_empty());
    }

    #[test]
    fn test_missing_and_extra_columns() {
        let table = parse("name,phone,fax\nAnn,1,2\n");
        let result = validate(&placeholders(&["name", "email", "title"]), table);

        match result {
            ValidationResult::Invalid {
                missing,
                extra,
                diagnostics,
                ..
            } => {
                assert_eq!(missing, vec!["email", "title"]);
                assert_eq!(extra, vec!["phone", "fax"]);
                assert_eq!(
                    diagnostics,
                    vec![
                        "Missing columns: email, title".to_string(),
                        "Extra columns: phone, fax".to_string(),
                    ]
                );
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_value_is_a_row_violation() {
        let table = parse("name,email\nAnn,a@x.com\nBo,   \n");
        let result = validate(&placeholders(&["name", "email"]), table);

        assert!(result.table().is_none());
        assert_eq!(
            result.diagnostics(),
            &["Row 3: missing value for 'email'.".to_string()]
        );
    }

    #[test]
    fn test_diagnostics_are_capped() {
        let mut input = String::from("name,email\n");
        for _ in 0..12 {
            input.push_str(",\n");
        }
        let result = validate(&placeholders(&["name", "email"]), parse(&input));

        match result {
            ValidationResult::Invalid {
                row_violations,
                diagnostics,
                ..
            } => {
                assert_eq!(row_violations, 24);
                assert_eq!(diagnostics.len(), MAX_DISPLAYED_DIAGNOSTICS + 1);
                assert_eq!(diagnostics.last().unwrap(), "+14 more");
                assert_eq!(diagnostics[0], "Row 2: missing value for 'email'.");
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_not_attempted_without_inputs() {
        assert_eq!(
            validate(&PlaceholderSet::default(), parse("name\nAnn\n")),
            ValidationResult::NotAttempted
        );
        assert_eq!(
            validate(&placeholders(&["name"]), Table::empty()),
            ValidationResult::NotAttempted
        );
    }

    #[test]
    fn test_duplicate_header_counts_once() {
        let diff = SchemaDiff::compute(
            &placeholders(&["name"]),
            &["name".to_string(), "Name".to_string()],
        );
        assert!(diff.is_exact());
    }

    #[test]
    fn test_cap_diagnostics_under_limit() {
        let lines = vec!["a".to_string(), "b".to_string()];
        assert_eq!(cap_diagnostics(lines.clone(), 10), lines);
    }
}
