//! Table reader implementation
//!
//! This module handles source reading, header extraction and row
//! materialization, applying the configured [`RowWidthPolicy`] to rows whose
//! width does not match the header.

use tracing::{debug, info, warn};

use super::delimiter::detect_delimiter;
use super::splitter::split_line;
use crate::app::models::{Row, RowWidthPolicy, Table};
use crate::Error;

/// A data row that was rejected under the strict width policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// 1-based physical line number
    pub line_number: usize,
    /// Number of fields found on the line
    pub field_count: usize,
    /// Number of headers the row had to match
    pub expected: usize,
}

impl RejectedRow {
    /// Row number as counted from the header line, so the line right below
    /// the header is row 1
    pub fn row_index(&self) -> usize {
        self.line_number.saturating_sub(1)
    }

    /// The rejection as a row-level error
    pub fn to_error(&self) -> Error {
        Error::row_rejected(self.row_index(), "column count mismatch")
    }

    /// Diagnostic line for the skipped row
    pub fn diagnostic(&self) -> String {
        format!("{}, skipping.", self.to_error())
    }
}

/// Reading statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Non-blank data lines encountered
    pub total_records: usize,
    /// Rows materialized into the table
    pub rows_parsed: usize,
    /// Rows rejected by the strict policy
    pub rows_skipped: usize,
    /// Short rows padded with empty values (lenient)
    pub rows_padded: usize,
    /// Long rows whose extra fields were dropped (lenient)
    pub rows_truncated: usize,
}

/// Reader output: the table plus what was left out of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub table: Table,
    pub rejected: Vec<RejectedRow>,
    pub stats: ReadStats,
}

/// Delimited table reader
#[derive(Debug, Clone, Copy)]
pub struct TableReader {
    policy: RowWidthPolicy,
}

impl TableReader {
    pub fn new(policy: RowWidthPolicy) -> Self {
        Self { policy }
    }

    /// Parse table text
    ///
    /// Never fails: empty input yields an empty table and malformed rows are
    /// handled by the width policy.
    pub fn parse_str(&self, content: &str) -> ParsedTable {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut lines = content
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        let Some((header_line_number, header_line)) = lines.next() else {
            debug!("Data source is empty");
            return ParsedTable {
                table: Table::empty(),
                rejected: Vec::new(),
                stats: ReadStats::default(),
            };
        };

        let delimiter = detect_delimiter(header_line);
        let headers: Vec<String> = split_line(header_line, delimiter.as_char())
            .into_iter()
            .map(|header| header.trim().to_string())
            .filter(|header| !header.is_empty())
            .collect();
        debug!(
            "Header on line {}: {} columns, {} delimiter",
            header_line_number,
            headers.len(),
            delimiter
        );

        let mut rows = Vec::new();
        let mut rejected = Vec::new();
        let mut stats = ReadStats::default();

        for (line_number, line) in lines {
            stats.total_records += 1;
            let mut values = split_line(line, delimiter.as_char());

            if values.len() != headers.len() {
                match self.policy {
                    RowWidthPolicy::Strict => {
                        let rejection = RejectedRow {
                            line_number,
                            field_count: values.len(),
                            expected: headers.len(),
                        };
                        warn!(
                            "Line {}: expected {} fields, found {}",
                            line_number, rejection.expected, rejection.field_count
                        );
                        stats.rows_skipped += 1;
                        rejected.push(rejection);
                        continue;
                    }
                    RowWidthPolicy::Lenient => {
                        if values.len() < headers.len() {
                            stats.rows_padded += 1;
                            values.resize(headers.len(), String::new());
                        } else {
                            stats.rows_truncated += 1;
                            values.truncate(headers.len());
                        }
                    }
                }
            }

            let fields = headers.iter().cloned().zip(values).collect();
            rows.push(Row::new(line_number, fields));
            stats.rows_parsed += 1;
        }

        info!(
            "Parsed {} rows from {} records ({} skipped)",
            stats.rows_parsed, stats.total_records, stats.rows_skipped
        );

        ParsedTable {
            table: Table {
                headers,
                rows,
                delimiter,
            },
            rejected,
            stats,
        }
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new(RowWidthPolicy::Lenient)
    }
}
