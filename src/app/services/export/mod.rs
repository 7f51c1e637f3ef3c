//! Export targets for generated signatures
//!
//! - [`directory`] - one HTML file per signature, written atomically
//! - [`archive`] - a single deflated ZIP archive
//! - [`delivery`] - one email per signature through a [`MailTransport`]
//! - [`smtp`] - the `lettre` SMTP transport
//! - [`csv_template`] - an empty data file listing a template's fields
//!
//! The file targets implement the pipeline's
//! [`ArtifactSink`](crate::app::services::batch_pipeline::ArtifactSink);
//! delivery runs after the batch on the finished artifacts.

pub mod archive;
pub mod csv_template;
pub mod delivery;
pub mod directory;
pub mod smtp;

pub use archive::ArchiveSink;
pub use csv_template::{csv_template_line, write_csv_template};
pub use delivery::{
    DeliveryReport, DeliverySettings, MailAttachment, MailTransport, OutgoingMessage,
    deliver_all, is_reserved_domain, resolve_recipient,
};
pub use directory::DirectorySink;
pub use smtp::{SmtpMailer, sender_mailbox};
