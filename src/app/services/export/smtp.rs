//! SMTP transport backed by `lettre`

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use super::delivery::{MailTransport, OutgoingMessage};
use crate::config::SmtpSettings;
use crate::{Error, Result};

/// Sender mailbox: the configured `from`, else the SMTP username
pub fn sender_mailbox(settings: &SmtpSettings) -> Result<Mailbox> {
    let sender = settings
        .from
        .as_deref()
        .map(str::trim)
        .filter(|from| !from.is_empty())
        .unwrap_or(settings.username.trim());

    sender
        .parse()
        .map_err(|e: lettre::address::AddressError| Error::invalid_address(sender, e.to_string()))
}

/// Build the wire message: plain-text body followed by the attachments
pub fn build_message(message: &OutgoingMessage) -> Result<Message> {
    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(message.body.clone()));
    for attachment in &message.attachments {
        let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
            Error::delivery(
                format!("Invalid content type '{}'", attachment.content_type),
                e,
            )
        })?;
        parts = parts.singlepart(
            Attachment::new(attachment.file_name.clone()).body(attachment.data.clone(), content_type),
        );
    }

    Message::builder()
        .from(message.from.clone())
        .to(message.to.clone())
        .subject(message.subject.clone())
        .multipart(parts)
        .map_err(|e| Error::delivery(format!("Failed to build message for {}", message.to), e))
}

/// One pooled SMTP connection shared by every send
///
/// Must be created inside a Tokio runtime.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailer {
    /// Configure the transport; nothing is contacted until the first send
    ///
    /// `ssl = true` means implicit TLS, otherwise STARTTLS is required. Spaces
    /// in the password are removed so pasted app passwords work.
    pub fn from_settings(settings: &SmtpSettings) -> Result<Self> {
        let host = settings.host.trim();
        if host.is_empty() {
            return Err(Error::configuration("SMTP host is not set"));
        }

        let builder = if settings.ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| Error::delivery(format!("Failed to configure SMTP relay {}", host), e))?
        .port(settings.port);

        let builder = if settings.username.trim().is_empty() {
            builder
        } else {
            let password: String = settings.password.chars().filter(|c| *c != ' ').collect();
            builder.credentials(Credentials::new(settings.username.trim().to_string(), password))
        };

        debug!(
            "SMTP transport for {}:{} ({})",
            host,
            settings.port,
            if settings.ssl { "TLS" } else { "STARTTLS" }
        );
        Ok(Self {
            transport: builder.build(),
            host: host.to_string(),
        })
    }

    /// Connect, authenticate and disconnect
    pub async fn test_connection(&self) -> Result<()> {
        info!("Testing SMTP connection to {}", self.host);
        let connected = self
            .transport
            .test_connection()
            .await
            .map_err(|e| Error::delivery(format!("SMTP connection to {} failed", self.host), e))?;

        if connected {
            Ok(())
        } else {
            Err(Error::delivery_message(format!(
                "SMTP server {} did not accept the connection",
                self.host
            )))
        }
    }
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer").field("host", &self.host).finish()
    }
}

impl MailTransport for SmtpMailer {
    async fn send(&self, message: &OutgoingMessage) -> Result<()> {
        let email = build_message(message)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| Error::delivery(format!("Failed to send to {}", message.to), e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::export::delivery::MailAttachment;

    fn settings() -> SmtpSettings {
        SmtpSettings {
            host: "smtp.realdomain.com".to_string(),
            port: 587,
            username: "mailer@realdomain.com".to_string(),
            password: "abcd efgh ijkl mnop".to_string(),
            from: None,
            ssl: false,
        }
    }

    #[test]
    fn test_sender_falls_back_to_username() {
        let mailbox = sender_mailbox(&settings()).unwrap();
        assert_eq!(mailbox.email.to_string(), "mailer@realdomain.com");

        let with_from = SmtpSettings {
            from: Some("Team <team@realdomain.com>".to_string()),
            ..settings()
        };
        let mailbox = sender_mailbox(&with_from).unwrap();
        assert_eq!(mailbox.name.as_deref(), Some("Team"));
    }

    #[test]
    fn test_invalid_sender() {
        let broken = SmtpSettings {
            username: "not-an-address".to_string(),
            ..settings()
        };
        assert!(matches!(
            sender_mailbox(&broken),
            Err(Error::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_build_message_attaches_signature() {
        let message = OutgoingMessage {
            from: "team@realdomain.com".parse().unwrap(),
            to: "Ann <ann@realdomain.com>".parse().unwrap(),
            subject: "Your signature".to_string(),
            body: "See attachment.".to_string(),
            attachments: vec![MailAttachment::html("Ann.html", "<p>Ann</p>")],
        };

        let formatted = String::from_utf8(build_message(&message).unwrap().formatted()).unwrap();
        assert!(formatted.contains("Subject: Your signature"));
        assert!(formatted.contains("Ann.html"));
        assert!(formatted.contains("text/html"));
    }

    #[test]
    fn test_missing_host_is_a_configuration_error() {
        let no_host = SmtpSettings {
            host: "  ".to_string(),
            ..settings()
        };
        assert!(matches!(
            SmtpMailer::from_settings(&no_host),
            Err(Error::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_transport_is_built_without_connecting() {
        assert!(SmtpMailer::from_settings(&settings()).is_ok());
    }
}
