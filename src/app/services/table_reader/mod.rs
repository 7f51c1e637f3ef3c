//! Delimited table reader for signature data files
//!
//! This module turns the raw text of a `.csv`-style data file into a
//! [`Table`](crate::app::models::Table). It is deliberately lenient about
//! quoting and tolerant of spreadsheet exports that use semicolons or tabs.
//!
//! ## Architecture
//!
//! - [`delimiter`] - Delimiter detection on the header line
//! - [`splitter`] - Quote-aware line splitting
//! - [`reader`] - Header extraction, row materialization and width policy
//!
//! ## Usage
//!
//! ```rust
//! use signature_generator::app::models::RowWidthPolicy;
//! use signature_generator::app::services::table_reader::TableReader;
//!
//! let reader = TableReader::new(RowWidthPolicy::Lenient);
//! let parsed = reader.parse_str("name;email\nAnn;ann@realdomain.com\n");
//!
//! assert_eq!(parsed.table.headers, vec!["name", "email"]);
//! assert_eq!(parsed.table.rows[0].get("EMAIL"), Some("ann@realdomain.com"));
//! ```

pub mod delimiter;
pub mod reader;
pub mod splitter;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use delimiter::detect_delimiter;
pub use reader::{ParsedTable, ReadStats, RejectedRow, TableReader};
pub use splitter::split_line;
