//! Confirmation emails, sent over SMTP with `lettre`.
//!
//! Each [`NotificationTemplate`] renders to a subject line and a short HTML body. The values come from the
//! notification's `data` (`name`, `reference`, `amount`, `currency`, `paidAt`, `channel`, `ownerKey`).
use fair_payment_engine::traits::{NoopNotifier, Notification, NotificationError, NotificationTemplate, Notifier};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
};
use log::*;
use serde_json::Value;

use crate::{config::SmtpConfig, errors::ServerError};

/// The port for SMTP over implicit TLS. Any other port uses STARTTLS.
const SMTPS_PORT: u16 = 465;

#[derive(Clone)]
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, ServerError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| ServerError::ConfigurationError(format!("Invalid sender address '{}'. {e}", config.from)))?;
        let builder = if config.port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| ServerError::ConfigurationError(format!("Invalid SMTP host '{}'. {e}", config.host)))?;
        let credentials = Credentials::new(config.username.clone(), config.password.reveal().clone());
        let transport = builder.port(config.port).credentials(credentials).build();
        Ok(Self { transport, from })
    }
}

impl Notifier for EmailNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        let to = notification
            .recipient
            .parse::<Mailbox>()
            .map_err(|e| NotificationError(format!("Invalid recipient '{}'. {e}", notification.recipient)))?;
        let (subject, body) = render(&notification);
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| NotificationError(format!("Failed to build email. {e}")))?;
        trace!("📧️ Sending {} email to {}", notification.template, notification.recipient);
        self.transport.send(email).await.map_err(|e| NotificationError(format!("Failed to send email. {e}")))?;
        info!("📧️ {} email sent to {}", notification.template, notification.recipient);
        Ok(())
    }
}

/// Email when SMTP is configured, otherwise log-only.
#[derive(Clone)]
pub enum ConfiguredNotifier {
    Email(EmailNotifier),
    Disabled(NoopNotifier),
}

impl ConfiguredNotifier {
    pub fn from_config(config: Option<&SmtpConfig>) -> Result<Self, ServerError> {
        match config {
            Some(smtp) => Ok(Self::Email(EmailNotifier::new(smtp)?)),
            None => Ok(Self::Disabled(NoopNotifier)),
        }
    }
}

impl Notifier for ConfiguredNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        match self {
            Self::Email(n) => n.send(notification).await,
            Self::Disabled(n) => n.send(notification).await,
        }
    }
}

/// Renders the subject line and HTML body for a notification.
pub fn render(notification: &Notification) -> (String, String) {
    let data = &notification.data;
    let name = escape(&text(data, "name").unwrap_or_else(|| "there".into()));
    let reference = escape(&text(data, "reference").unwrap_or_default());
    let amount = match (text(data, "amount"), text(data, "currency")) {
        (Some(amount), Some(currency)) => escape(&format!("{currency} {amount}")),
        (Some(amount), None) => escape(&amount),
        _ => String::from("your payment"),
    };
    let (subject, heading, detail) = match notification.template {
        NotificationTemplate::RegistrationConfirmed => (
            "Your book fair registration is confirmed",
            "Registration confirmed",
            format!(
                "We have received {amount} for your registration. Please bring this email to the registration desk."
            ),
        ),
        NotificationTemplate::BookStandPaid => {
            let stand = escape(&text(data, "ownerKey").unwrap_or_default());
            (
                "Payment received for your book stand",
                "Book stand paid",
                format!(
                    "We have received {amount} for book stand booking <strong>{stand}</strong>. Your stand is \
                     secured."
                ),
            )
        },
        NotificationTemplate::DonationReceived => (
            "Thank you for your donation",
            "Donation received",
            format!("We have received your donation of {amount}. Thank you for supporting the book fair."),
        ),
    };
    let body = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>{subject}</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>{heading}</h2>
    <p>Hello {name},</p>
    <p>{detail}</p>
    <p style="color: #666; font-size: 14px;">Payment reference: {reference}</p>
  </div>
</body>
</html>
"#
    );
    (subject.to_string(), body)
}

fn text(data: &Value, field: &str) -> Option<String> {
    match data.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}
