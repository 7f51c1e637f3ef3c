//! Quote-aware splitting of a single delimited line
//!
//! `"` toggles quoting, a doubled quote inside a quoted field produces one
//! literal quote, and the delimiter only separates fields outside quotes.
//! An unterminated quote is not an error: it simply swallows the rest of the
//! line into the current field.

use crate::constants::QUOTE_CHAR;

/// Split one line into its fields
pub fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == QUOTE_CHAR {
            if in_quotes && chars.peek() == Some(&QUOTE_CHAR) {
                current.push(QUOTE_CHAR);
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == delimiter && !in_quotes {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }

    fields.push(current);
    fields
}
