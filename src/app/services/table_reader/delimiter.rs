//! Field delimiter detection
//!
//! The delimiter is chosen from the header line alone by counting candidate
//! characters. Semicolon wins ties over comma, and comma over tab, so a
//! European spreadsheet export (`name;email;title`) is never mistaken for a
//! comma-separated file just because a header happens to contain a comma.

use crate::app::models::Delimiter;

/// Pick the delimiter for a table from its header line
pub fn detect_delimiter(header_line: &str) -> Delimiter {
    let count = |needle: char| header_line.chars().filter(|c| *c == needle).count();
    let commas = count(',');
    let semicolons = count(';');
    let tabs = count('\t');

    if semicolons >= commas && semicolons >= tabs {
        Delimiter::Semicolon
    } else if commas >= semicolons && commas >= tabs {
        Delimiter::Comma
    } else if tabs > 0 {
        Delimiter::Tab
    } else {
        Delimiter::Comma
    }
}
