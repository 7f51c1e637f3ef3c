//! Application constants for the signature generator
//!
//! This module contains configuration constants, default values and fixed
//! lists used throughout the pipeline and its export collaborators.

// =============================================================================
// Table Parsing
// =============================================================================

/// Quote character for delimited fields
pub const QUOTE_CHAR: char = '"';

// =============================================================================
// Validation
// =============================================================================

/// Maximum number of validation diagnostics shown before collapsing to "+N more"
pub const MAX_DISPLAYED_DIAGNOSTICS: usize = 10;

// =============================================================================
// Output Naming
// =============================================================================

/// Maximum length of a generated file stem, before the extension
pub const MAX_FILE_STEM_LENGTH: usize = 80;

/// Extension of generated signature files
pub const ARTIFACT_EXTENSION: &str = "html";

/// Prefix of the positional fallback label (`row_1`, `row_2`, ...)
pub const ROW_LABEL_PREFIX: &str = "row_";

/// Characters that are not legal in file names on at least one supported platform
pub const ILLEGAL_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replacement for illegal file name characters
pub const FILE_NAME_REPLACEMENT: char = '_';

/// Column names that identify the recipient's display name
pub const NAME_COLUMNS: &[&str] = &["name", "full_name", "fullname"];

/// Column names that identify the recipient's email address
pub const EMAIL_COLUMNS: &[&str] = &["email", "e-mail", "mail"];

/// Prefix of the default output directory created under the system temp dir
pub const OUTPUT_DIR_PREFIX: &str = "signatures_";

/// Default file name for the ZIP export
pub const DEFAULT_ARCHIVE_NAME: &str = "signatures.zip";

// =============================================================================
// Delivery
// =============================================================================

/// Default SMTP submission port
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Domains reserved for documentation that must never receive mail
pub const RESERVED_DOMAINS: &[&str] = &["example.com", "example.net", "example.org"];

/// Reserved top-level domain suffixes (RFC 2606 / RFC 6761)
pub const RESERVED_DOMAIN_SUFFIXES: &[&str] = &[".test", ".example", ".invalid", ".localhost"];

/// Content type of the generated signature attachment
pub const ARTIFACT_CONTENT_TYPE: &str = "text/html";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SIGGEN_";

// =============================================================================
// CSV Template Export
// =============================================================================

/// Separator used when exporting the placeholder header line
pub const CSV_TEMPLATE_SEPARATOR: u8 = b';';
