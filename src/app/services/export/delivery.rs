//! Email delivery of generated signatures
//!
//! Every artifact with a deliverable address becomes one message carrying the
//! signature as an HTML attachment, optionally followed by one fixed extra
//! attachment. Messages go out sequentially over one transport and the first
//! transport failure stops the run. Messages already sent stay sent and keep
//! their lines in the report.

use std::future::Future;
use std::path::Path;

use lettre::Address;
use lettre::message::Mailbox;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::models::{Diagnostic, GeneratedArtifact};
use crate::constants::{ARTIFACT_CONTENT_TYPE, RESERVED_DOMAINS, RESERVED_DOMAIN_SUFFIXES};
use crate::{Error, Result};

/// Reserved documentation and test domains never receive mail
pub fn is_reserved_domain(domain: &str) -> bool {
    let domain = domain.trim().trim_end_matches('.').to_lowercase();

    RESERVED_DOMAINS.contains(&domain.as_str())
        || RESERVED_DOMAIN_SUFFIXES
            .iter()
            .any(|suffix| domain.ends_with(suffix))
}

/// Parse a recipient and check it against the reserved list
///
/// Accepts a bare address or a `Name <address>` mailbox; only the address is
/// kept.
pub fn resolve_recipient(raw: &str) -> Result<Address> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_address(raw, "address is blank"));
    }

    let mailbox: Mailbox = trimmed
        .parse()
        .map_err(|e: lettre::address::AddressError| Error::invalid_address(trimmed, e.to_string()))?;
    let address = mailbox.email;
    if is_reserved_domain(address.domain()) {
        return Err(Error::invalid_address(trimmed, "reserved domain"));
    }
    Ok(address)
}

/// A file attached to an outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl MailAttachment {
    /// The signature itself
    pub fn html(file_name: impl Into<String>, content: &str) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: format!("{}; charset=utf-8", ARTIFACT_CONTENT_TYPE),
            data: content.as_bytes().to_vec(),
        }
    }

    /// Load a fixed attachment from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| Error::io(format!("Failed to read attachment {}", path.display()), e))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                Error::configuration(format!("Attachment path {} has no file name", path.display()))
            })?
            .to_string();

        Ok(Self {
            content_type: content_type_for(path).to_string(),
            file_name,
            data,
        })
    }
}

/// Content type guessed from the file extension
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// One fully built message
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<MailAttachment>,
}

/// Something that can send messages, one at a time
pub trait MailTransport {
    fn send(&self, message: &OutgoingMessage) -> impl Future<Output = Result<()>> + Send;
}

/// Fixed parts of every message in a run
#[derive(Debug, Clone)]
pub struct DeliverySettings {
    pub sender: Mailbox,
    pub subject: String,
    pub body: String,
    pub extra_attachment: Option<MailAttachment>,
}

impl DeliverySettings {
    pub fn message_for(&self, artifact: &GeneratedArtifact, to: Address) -> OutgoingMessage {
        let mut attachments = vec![MailAttachment::html(&artifact.file_name, &artifact.content)];
        if let Some(extra) = &self.extra_attachment {
            attachments.push(extra.clone());
        }

        OutgoingMessage {
            from: self.sender.clone(),
            to: Mailbox::new(artifact.recipient_name.clone(), to),
            subject: self.subject.clone(),
            body: self.body.clone(),
            attachments,
        }
    }
}

/// What a delivery run did
#[derive(Debug, Default)]
pub struct DeliveryReport {
    /// Addresses that received a message
    pub sent: Vec<String>,
    /// Addresses (or blanks) that were skipped
    pub skipped: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub cancelled: bool,
    /// Transport error that stopped the run
    pub aborted: Option<Error>,
}

impl DeliveryReport {
    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    fn emit(&mut self, message: String) {
        self.diagnostics.push(Diagnostic::new(message));
    }
}

/// Send one message per deliverable artifact
///
/// Skipped recipients are logged and counted. A transport error aborts the
/// remaining sends and is kept in [`DeliveryReport::aborted`], after the lines
/// of every message sent before it.
pub async fn deliver_all<T>(
    transport: &T,
    artifacts: &[GeneratedArtifact],
    settings: &DeliverySettings,
    cancel: &CancellationToken,
) -> DeliveryReport
where
    T: MailTransport,
{
    let mut report = DeliveryReport::default();
    info!("Delivering {} signatures", artifacts.len());

    for (position, artifact) in artifacts.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!("Delivery cancelled after {} of {}", position, artifacts.len());
            report.emit(format!(
                "Cancelled after {} of {} messages.",
                position,
                artifacts.len()
            ));
            report.cancelled = true;
            return report;
        }

        let raw = artifact.recipient_email.as_deref().unwrap_or_default();
        let address = match resolve_recipient(raw) {
            Ok(address) => address,
            Err(e) => {
                warn!("Row {}: {}", artifact.row_number, e);
                report.emit(format!("Skipping reserved/invalid recipient: {}", raw.trim()));
                report.skipped.push(raw.trim().to_string());
                continue;
            }
        };

        let message = settings.message_for(artifact, address.clone());
        if let Err(e) = transport.send(&message).await {
            warn!(
                "Delivery aborted after {} sent: {}",
                report.sent.len(),
                e
            );
            report.emit(format!("Send error: {}", e));
            report.aborted = Some(e);
            return report;
        }

        info!("Sent to {} <{}>", artifact.display_name(), address);
        report.emit(format!("Sent to {} <{}>", artifact.display_name(), address));
        report.sent.push(address.to_string());
    }

    report.emit("All emails sent.".to_string());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<OutgoingMessage>>,
        fail_on: Option<String>,
    }

    impl MailTransport for RecordingTransport {
        async fn send(&self, message: &OutgoingMessage) -> Result<()> {
            if self.fail_on.as_deref() == Some(message.to.email.to_string().as_str()) {
                return Err(Error::delivery_message("connection reset"));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn artifact(name: &str, email: &str) -> GeneratedArtifact {
        GeneratedArtifact {
            row_number: 2,
            recipient_name: Some(name.to_string()),
            recipient_email: Some(email.to_string()),
            content: format!("<p>{}</p>", name),
            file_name: format!("{}.html", name),
        }
    }

    fn settings() -> DeliverySettings {
        DeliverySettings {
            sender: "Team <team@realdomain.com>".parse().unwrap(),
            subject: "Your new signature".to_string(),
            body: "Attached.".to_string(),
            extra_attachment: None,
        }
    }

    #[test]
    fn test_reserved_domains() {
        assert!(is_reserved_domain("example.com"));
        assert!(is_reserved_domain("EXAMPLE.org"));
        assert!(is_reserved_domain("mail.test"));
        assert!(is_reserved_domain("corp.example"));
        assert!(is_reserved_domain("nowhere.invalid"));
        assert!(is_reserved_domain("dev.localhost"));
        assert!(!is_reserved_domain("localhost"));
        assert!(!is_reserved_domain("realdomain.com"));
        assert!(!is_reserved_domain("example.com.au"));
        assert!(!is_reserved_domain("contest.com"));
    }

    #[test]
    fn test_resolve_recipient() {
        assert!(resolve_recipient(" user@realdomain.com ").is_ok());
        assert!(resolve_recipient("user@localhost").is_ok());
        assert_eq!(
            resolve_recipient("Ann Lee <ann@realdomain.com>").unwrap().to_string(),
            "ann@realdomain.com"
        );
        assert!(resolve_recipient("Ann Lee <ann@example.com>").is_err());
        assert!(matches!(
            resolve_recipient("user@example.com"),
            Err(Error::InvalidAddress { .. })
        ));
        assert!(resolve_recipient("not an address").is_err());
        assert!(resolve_recipient("   ").is_err());
    }

    #[test]
    fn test_content_type_guess() {
        assert_eq!(content_type_for(Path::new("guide.PDF")), "application/pdf");
        assert_eq!(content_type_for(Path::new("logo.png")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("README")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_reserved_recipient_is_skipped() {
        let transport = RecordingTransport::default();
        let artifacts = vec![
            artifact("Ann", "user@example.com"),
            artifact("Bo", "user@realdomain.com"),
        ];

        let report = deliver_all(&transport, &artifacts, &settings(), &CancellationToken::new()).await;

        assert_eq!(report.sent, vec!["user@realdomain.com"]);
        assert_eq!(report.skipped, vec!["user@example.com"]);
        assert_eq!(
            report.messages(),
            vec![
                "Skipping reserved/invalid recipient: user@example.com",
                "Sent to Bo <user@realdomain.com>",
                "All emails sent.",
            ]
        );

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].attachments[0].file_name, "Bo.html");
        assert_eq!(sent[0].attachments[0].content_type, "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn test_extra_attachment_follows_signature() {
        let transport = RecordingTransport::default();
        let mut settings = settings();
        settings.extra_attachment = Some(MailAttachment {
            file_name: "guide.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: vec![1, 2, 3],
        });

        deliver_all(
            &transport,
            &[artifact("Ann", "ann@realdomain.com")],
            &settings,
            &CancellationToken::new(),
        )
        .await;

        let sent = transport.sent.lock().unwrap();
        let names: Vec<&str> = sent[0].attachments.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, vec!["Ann.html", "guide.pdf"]);
        assert_eq!(sent[0].to.name.as_deref(), Some("Ann"));
    }

    #[tokio::test]
    async fn test_transport_failure_stops_remaining_sends() {
        let transport = RecordingTransport {
            fail_on: Some("bo@realdomain.com".to_string()),
            ..Default::default()
        };
        let artifacts = vec![
            artifact("Ann", "ann@realdomain.com"),
            artifact("Bo", "bo@realdomain.com"),
            artifact("Cy", "cy@realdomain.com"),
        ];

        let report = deliver_all(&transport, &artifacts, &settings(), &CancellationToken::new()).await;

        assert!(matches!(report.aborted, Some(Error::Delivery { .. })));
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
        assert_eq!(report.sent, vec!["ann@realdomain.com"]);
        assert_eq!(
            report.messages(),
            vec![
                "Sent to Ann <ann@realdomain.com>",
                "Send error: Delivery error: connection reset",
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_delivery_sends_nothing() {
        let transport = RecordingTransport::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = deliver_all(
            &transport,
            &[artifact("Ann", "ann@realdomain.com")],
            &settings(),
            &cancel,
        )
        .await;

        assert!(report.cancelled);
        assert!(transport.sent.lock().unwrap().is_empty());
        assert_eq!(report.messages(), vec!["Cancelled after 0 of 1 messages."]);
    }
}
