//! Empty data-file template for a signature template
//!
//! Writes a single `;`-separated header line listing the template's fields so
//! users can fill in the data in a spreadsheet.

use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};
use tracing::info;

use crate::constants::CSV_TEMPLATE_SEPARATOR;
use crate::{Error, Result};

/// Header line (with trailing newline) for the given fields
pub fn csv_template_line<S: AsRef<str>>(fields: &[S]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .delimiter(CSV_TEMPLATE_SEPARATOR)
        .quote_style(QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(fields.iter().map(|field| field.as_ref()))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::io("Failed to finish CSV template", e.into_error()))?;

    String::from_utf8(bytes)
        .map_err(|e| Error::io("CSV template is not valid UTF-8", std::io::Error::other(e)))
}

/// Write the header line to `path`
pub fn write_csv_template<S: AsRef<str>>(path: &Path, fields: &[S]) -> Result<()> {
    let line = csv_template_line(fields)?;
    std::fs::write(path, line)
        .map_err(|e| Error::io(format!("Failed to write CSV template {}", path.display()), e))?;

    info!("Wrote CSV template with {} columns to {}", fields.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields() {
        assert_eq!(
            csv_template_line(&["email", "name", "title"]).unwrap(),
            "email;name;title\n"
        );
    }

    #[test]
    fn test_fields_needing_quotes() {
        assert_eq!(
            csv_template_line(&["a;b", "say \"hi\"", "plain"]).unwrap(),
            "\"a;b\";\"say \"\"hi\"\"\";plain\n"
        );
    }

    #[test]
    fn test_write_to_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("template.csv");

        write_csv_template(&path, &["name".to_string(), "email".to_string()]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "name;email\n");
    }
}
