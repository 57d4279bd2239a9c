use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::SmtpTransport;
use lettre::transport::smtp::authentication::Credentials;
use lettre::Transport;
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::alerts::thresholds::reaches_exam_bar;
use crate::analysis::format_percent;
use crate::config::NotificationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Email => f.write_str("email"),
            Channel::Sms => f.write_str("sms"),
        }
    }
}

/// Why a single channel failed. Recovered locally, never propagated.
#[derive(Debug, Error)]
pub enum NotificationChannelError {
    #[error("{0} channel disabled")]
    Disabled(Channel),

    #[error("no {0} address on record")]
    MissingAddress(Channel),

    #[error("invalid email address {address}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("could not compose email: {0}")]
    Compose(#[from] lettre::error::Error),

    #[error("email transport failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("sms transport failed: {0}")]
    Gateway(#[from] reqwest::Error),

    #[error("sms gateway rejected message with status {0}")]
    Rejected(u16),
}

/// Outcome of one send attempt on one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub success: bool,
    pub detail: String,
}

impl Delivery {
    pub fn sent(detail: impl Into<String>) -> Self {
        Self {
            success: true,
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: detail.into(),
        }
    }
}

/// Outbound notification channels. Implementations report failure in the
/// returned [`Delivery`] and never panic or error past this boundary.
pub trait Notifier {
    fn send_email(&self, to_address: &str, subject: &str, body: &str) -> Delivery;

    fn send_sms(&self, phone_number: &str, text: &str) -> Delivery;
}

/// Content sent to a student. One message per run regardless of how many
/// tiers were crossed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub email_body: String,
    pub sms_text: String,
}

impl AlertMessage {
    pub fn build(name: &str, course_code: &str, percent: f64) -> Self {
        let percent_text = format_percent(percent);
        let exam_note = if reaches_exam_bar(percent) {
            "\nNote: A student with >=20% absenteeism may be barred from the final exam."
        } else {
            ""
        };

        let email_body = format!(
            "Attendance Alert:\n\n\
             Please be informed that {name} has {percent_text}% class absenteeism (course {course_code}).\n\
             Kindly contact your lecturer as soon as possible.\
             {exam_note}\n\n\
             This is an automated message from AAMAS."
        );

        Self {
            subject: format!("Attendance Alert ({course_code})"),
            email_body,
            sms_text: format!(
                "{name} has {percent_text}% absenteeism for {course_code}. Please advise."
            ),
        }
    }
}

/// Sends email over SMTP and SMS through an HTTP gateway.
///
/// SMTP login happens after STARTTLS and only when both a user and a
/// password are configured. Without an SMS gateway the message is only
/// logged and reported as sent.
pub struct OutboundNotifier {
    mailer: SmtpTransport,
    client: Client,
    settings: NotificationConfig,
}

fn mailbox(address: &str) -> Result<Mailbox, NotificationChannelError> {
    address
        .trim()
        .parse()
        .map_err(|source| NotificationChannelError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

impl OutboundNotifier {
    pub fn new(settings: NotificationConfig) -> Result<Self, NotificationChannelError> {
        let timeout = Duration::from_secs(settings.timeout_secs);

        let builder = match (&settings.smtp_user, &settings.smtp_password) {
            (Some(user), Some(password)) => SmtpTransport::starttls_relay(&settings.smtp_host)?
                .credentials(Credentials::new(user.clone(), password.clone())),
            _ => SmtpTransport::builder_dangerous(settings.smtp_host.as_str()),
        };
        let mailer = builder
            .port(settings.smtp_port)
            .timeout(Some(timeout))
            .build();

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            mailer,
            client,
            settings,
        })
    }

    fn try_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, NotificationChannelError> {
        if !self.settings.email_enabled {
            return Err(NotificationChannelError::Disabled(Channel::Email));
        }
        if to.trim().is_empty() {
            return Err(NotificationChannelError::MissingAddress(Channel::Email));
        }

        let message = Message::builder()
            .from(mailbox(&self.settings.email_from)?)
            .to(mailbox(to)?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        let response = self.mailer.send(&message)?;
        debug!(to, code = %response.code(), "smtp accepted message");
        Ok("Email sent".to_string())
    }

    fn try_sms(&self, phone: &str, text: &str) -> Result<String, NotificationChannelError> {
        if !self.settings.sms_enabled {
            return Err(NotificationChannelError::Disabled(Channel::Sms));
        }
        if phone.trim().is_empty() {
            return Err(NotificationChannelError::MissingAddress(Channel::Sms));
        }
        match self.settings.sms_gateway_url.as_deref() {
            Some(url) => {
                let response = self
                    .client
                    .post(url)
                    .json(&json!({ "to": phone, "message": text }))
                    .send()?;
                if !response.status().is_success() {
                    return Err(NotificationChannelError::Rejected(response.status().as_u16()));
                }
                Ok("SMS sent".to_string())
            }
            None => {
                info!(to = phone, text, "[SMS] no gateway configured, message logged");
                Ok("SMS logged".to_string())
            }
        }
    }
}

impl Notifier for OutboundNotifier {
    fn send_email(&self, to_address: &str, subject: &str, body: &str) -> Delivery {
        match self.try_email(to_address, subject, body) {
            Ok(detail) => Delivery::sent(detail),
            Err(e) => {
                warn!(to = to_address, error = %e, "email failed");
                Delivery::failed(format!("Email failed: {e}"))
            }
        }
    }

    fn send_sms(&self, phone_number: &str, text: &str) -> Delivery {
        match self.try_sms(phone_number, text) {
            Ok(detail) => Delivery::sent(detail),
            Err(e) => {
                warn!(to = phone_number, error = %e, "sms failed");
                Delivery::failed(format!("SMS failed: {e}"))
            }
        }
    }
}
