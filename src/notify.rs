//! Compliance summary email over SMTP.
//!
//! One plain-text message per processed contract, sent over STARTTLS to
//! every configured recipient. The dispatcher never fails the pipeline:
//! every outcome is returned as an [`EmailStatus`] value.

use std::collections::BTreeSet;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use thiserror::Error;

use crate::config::SmtpConfig;

/// Dispatch outcome, carried as data through the pipeline, the run
/// history and the API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmailStatus {
    Sent {
        message: String,
        recipients: Vec<String>,
    },
    NoRecipients {
        message: String,
    },
    Error {
        message: String,
        recipients: Vec<String>,
    },
}

impl EmailStatus {
    /// Short label for audit rows and logs.
    pub fn label(&self) -> &'static str {
        match self {
            EmailStatus::Sent { .. } => "sent",
            EmailStatus::NoRecipients { .. } => "no_recipients",
            EmailStatus::Error { .. } => "error",
        }
    }
}

#[derive(Error, Debug)]
enum NotifyError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("message build failed: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP transport failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Send the summary to all configured recipients.
///
/// With no SMTP configuration or an empty recipient list this
/// short-circuits with `NoRecipients` before any connection is opened.
/// Build and transport failures are converted to `Error`, never
/// propagated.
pub async fn send_summary(smtp: Option<&SmtpConfig>, subject: &str, body: &str) -> EmailStatus {
    let Some(cfg) = smtp else {
        return EmailStatus::NoRecipients {
            message: "No recipients configured".into(),
        };
    };
    if cfg.recipients.is_empty() {
        return EmailStatus::NoRecipients {
            message: "No recipients configured".into(),
        };
    }

    match try_send(cfg, subject, body).await {
        Ok(()) => {
            tracing::info!(recipients = cfg.recipients.len(), "summary email sent");
            EmailStatus::Sent {
                message: "Email sent successfully".into(),
                recipients: cfg.recipients.clone(),
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "summary email failed");
            EmailStatus::Error {
                message: err.to_string(),
                recipients: cfg.recipients.clone(),
            }
        }
    }
}

async fn try_send(cfg: &SmtpConfig, subject: &str, body: &str) -> Result<(), NotifyError> {
    let from: Mailbox = cfg.from.parse()?;
    let mut builder = Message::builder()
        .from(from)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN);
    for recipient in &cfg.recipients {
        builder = builder.to(recipient.parse()?);
    }
    let message = builder.body(body.to_string())?;

    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)?
        .port(cfg.port)
        .credentials(Credentials::new(cfg.from.clone(), cfg.password.clone()))
        .timeout(Some(cfg.timeout))
        .build();

    transport.send(message).await?;
    Ok(())
}

/// The summary body sent for one checked contract.
pub fn summary_body(team_name: &str, filename: &str, missing: &BTreeSet<String>) -> String {
    let missing_text = if missing.is_empty() {
        "No missing clauses - fully compliant.".to_string()
    } else {
        missing
            .iter()
            .map(|m| format!("- {m}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Hello {team_name},\n\n\
         Contract checked: {filename}\n\n\
         Missing clauses:\n{missing_text}\n\n\
         Modified contract is available for download.\n\n\
         Regards,\n\
         Clausecheck"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn smtp(recipients: &[&str]) -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".into(),
            port: 587,
            from: "bot@example.com".into(),
            password: "secret".into(),
            recipients: recipients.iter().map(|r| r.to_string()).collect(),
            team_name: "Legal".into(),
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn unconfigured_smtp_short_circuits() {
        let status = send_summary(None, "subject", "body").await;
        assert!(matches!(status, EmailStatus::NoRecipients { .. }));
        assert_eq!(status.label(), "no_recipients");
    }

    #[tokio::test]
    async fn empty_recipient_list_short_circuits() {
        let cfg = smtp(&[]);
        let status = send_summary(Some(&cfg), "subject", "body").await;
        assert!(matches!(status, EmailStatus::NoRecipients { .. }));
    }

    #[tokio::test]
    async fn invalid_recipient_becomes_error_status() {
        // Address parsing fails before any connection is attempted.
        let cfg = smtp(&["not an address"]);
        let status = send_summary(Some(&cfg), "subject", "body").await;
        match status {
            EmailStatus::Error { message, recipients } => {
                assert!(message.contains("invalid address"), "got: {message}");
                assert_eq!(recipients, vec!["not an address".to_string()]);
            }
            other => panic!("expected error status, got {other:?}"),
        }
    }

    #[test]
    fn summary_body_lists_missing_clauses() {
        let missing: BTreeSet<String> =
            ["termination", "payment terms"].iter().map(|s| s.to_string()).collect();
        let body = summary_body("Legal", "contract.docx", &missing);
        assert!(body.starts_with("Hello Legal,"));
        assert!(body.contains("Contract checked: contract.docx"));
        assert!(body.contains("- payment terms\n- termination"));
    }

    #[test]
    fn summary_body_reports_full_compliance() {
        let body = summary_body("Legal", "contract.docx", &BTreeSet::new());
        assert!(body.contains("No missing clauses - fully compliant."));
    }

    #[test]
    fn status_serializes_with_tag() {
        let status = EmailStatus::Sent {
            message: "Email sent successfully".into(),
            recipients: vec!["legal@example.com".into()],
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "sent");
        assert_eq!(json["recipients"][0], "legal@example.com");
    }
}
