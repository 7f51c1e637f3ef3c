//! Test utilities for table reader testing


/// Helper to create a typical comma-separated signature data file
pub fn create_test_table() -> String {
    "name,email,title\n\
     Ann,ann@realdomain.com,Engineer\n\
     Bo,bo@realdomain.com,\"Head of Sales, EMEA\"\n"
        .to_string()
}

/// Helper to create a semicolon export with blank lines and a BOM
pub fn create_spreadsheet_export() -> String {
    "\u{feff}\n  \nName;Email;Phone\r\n\r\nAnn;ann@realdomain.com;+44 1234\r\nBo;bo@realdomain.com;\r\n"
        .to_string()
}
