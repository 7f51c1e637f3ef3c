//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then a TOML file, then `SIGGEN_*`
//! environment variables, then command-line flags (applied by the CLI).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::services::batch_pipeline::PipelineConfig;
use crate::constants::{DEFAULT_ARCHIVE_NAME, DEFAULT_SMTP_PORT, ENV_PREFIX};
use crate::{Error, Result};

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "signature-generator";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Where file exports go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Target directory; `None` creates a timestamped directory under the
    /// system temp dir
    pub directory: Option<PathBuf>,

    /// Archive file name used when no explicit archive path is given
    pub archive_name: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: None,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

/// SMTP server and credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address; the username is used when unset
    pub from: Option<String>,
    /// Implicit TLS when true, STARTTLS otherwise
    pub ssl: bool,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_SMTP_PORT,
            username: String::new(),
            password: String::new(),
            from: None,
            ssl: false,
        }
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("from", &self.from)
            .field("ssl", &self.ssl)
            .finish()
    }
}

/// Subject, body and optional extra attachment of delivered messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageSettings {
    pub subject: String,
    pub body: String,
    pub attachment: Option<PathBuf>,
}

impl Default for MessageSettings {
    fn default() -> Self {
        Self {
            subject: "Your new email signature".to_string(),
            body: "Hello,\n\nyour personalized email signature is attached.\n".to_string(),
            attachment: None,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub output: OutputSettings,
    pub smtp: SmtpSettings,
    pub message: MessageSettings,
}

impl Config {
    /// `$CONFIG_DIR/signature-generator/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::configuration("Could not determine config directory"))?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file {}", path.display()), e)
        })?;
        let config: Config = toml::from_str(&content)?;
        debug!("Loaded config file {}", path.display());
        Ok(config)
    }

    /// Defaults, then the optional file, then the process environment
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `SIGGEN_SMTP_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, name)).filter(|value| !value.trim().is_empty())
        };

        if let Some(host) = var("SMTP_HOST") {
            self.smtp.host = host.trim().to_string();
        }
        if let Some(port) = var("SMTP_PORT") {
            self.smtp.port = port.trim().parse().map_err(|_| {
                Error::configuration(format!("{}SMTP_PORT is not a valid port: {}", ENV_PREFIX, port))
            })?;
        }
        if let Some(username) = var("SMTP_USER") {
            self.smtp.username = username.trim().to_string();
        }
        if let Some(password) = var("SMTP_PASSWORD") {
            self.smtp.password = password;
        }
        if let Some(from) = var("SMTP_FROM") {
            self.smtp.from = Some(from.trim().to_string());
        }
        if let Some(ssl) = var("SMTP_SSL") {
            self.smtp.ssl = parse_flag(&ssl).ok_or_else(|| {
                Error::configuration(format!("{}SMTP_SSL must be true or false: {}", ENV_PREFIX, ssl))
            })?;
        }
        Ok(())
    }

    /// Check settings every command relies on
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.max_name_length == 0 || self.pipeline.max_name_length > 255 {
            return Err(Error::configuration(format!(
                "Maximum name length must be between 1 and 255, got {}",
                self.pipeline.max_name_length
            )));
        }

        if self.output.archive_name.trim().is_empty() {
            return Err(Error::configuration("Archive name cannot be empty"));
        }

        if let Some(attachment) = &self.message.attachment {
            if !attachment.is_file() {
                return Err(Error::configuration(format!(
                    "Attachment does not exist: {}",
                    attachment.display()
                )));
            }
        }

        Ok(())
    }

    /// Check the SMTP settings needed for delivery
    pub fn validate_smtp(&self) -> Result<()> {
        if self.smtp.host.trim().is_empty() {
            return Err(Error::configuration(format!(
                "SMTP host is not set (use --smtp-host or {}SMTP_HOST)",
                ENV_PREFIX
            )));
        }
        if self.smtp.port == 0 {
            return Err(Error::configuration("SMTP port must be greater than 0"));
        }

        let has_sender = !self.smtp.username.trim().is_empty()
            || self.smtp.from.as_deref().is_some_and(|from| !from.trim().is_empty());
        if !has_sender {
            return Err(Error::configuration(
                "Either an SMTP username or a sender address is required",
            ));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{RowWidthPolicy, TokenSyntax};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.output.archive_name, "signatures.zip");
        assert_eq!(config.pipeline.syntax, TokenSyntax::DoubleBrace);
        assert!(config.validate().is_ok());
        assert!(config.validate_smtp().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[pipeline]
syntax = "single-brace"
row_width = "lenient"
name_suffix = "2026"

[smtp]
host = "smtp.realdomain.com"
username = "mailer@realdomain.com"
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.pipeline.syntax, TokenSyntax::SingleBrace);
        assert_eq!(config.pipeline.effective_row_width(), RowWidthPolicy::Lenient);
        assert_eq!(config.pipeline.name_suffix.as_deref(), Some("2026"));
        assert_eq!(config.pipeline.max_name_length, 80);
        assert_eq!(config.smtp.port, 587);
        assert!(config.validate_smtp().is_ok());
    }

    #[test]
    fn test_invalid_file_is_a_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[smtp]\nport = \"not a number\"\n").unwrap();

        assert!(matches!(
            Config::from_file(&path),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::default();
        config.smtp.host = "from-file".to_string();

        config
            .apply_env(lookup(&[
                ("SIGGEN_SMTP_HOST", " smtp.env.com "),
                ("SIGGEN_SMTP_PORT", "465"),
                ("SIGGEN_SMTP_SSL", "yes"),
                ("SIGGEN_SMTP_FROM", ""),
            ]))
            .unwrap();

        assert_eq!(config.smtp.host, "smtp.env.com");
        assert_eq!(config.smtp.port, 465);
        assert!(config.smtp.ssl);
        assert_eq!(config.smtp.from, None);
    }

    #[test]
    fn test_bad_env_values_are_rejected() {
        let mut config = Config::default();
        assert!(config.apply_env(lookup(&[("SIGGEN_SMTP_PORT", "99999")])).is_err());
        assert!(config.apply_env(lookup(&[("SIGGEN_SMTP_SSL", "maybe")])).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_name_length() {
        let mut config = Config::default();
        config.pipeline.max_name_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_password_is_redacted_in_debug() {
        let settings = SmtpSettings {
            password: "hunter2".to_string(),
            ..SmtpSettings::default()
        };
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }
}
