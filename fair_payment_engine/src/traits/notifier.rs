use std::fmt::Display;

use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationTemplate {
    RegistrationConfirmed,
    BookStandPaid,
    DonationReceived,
}

impl Display for NotificationTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RegistrationConfirmed => f.write_str("RegistrationConfirmed"),
            Self::BookStandPaid => f.write_str("BookStandPaid"),
            Self::DonationReceived => f.write_str("DonationReceived"),
        }
    }
}

/// A message to a customer. `data` holds the values the template is rendered with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub template: NotificationTemplate,
    pub recipient: String,
    pub data: Value,
}

#[derive(Debug, Clone, Error)]
#[error("Could not send notification. {0}")]
pub struct NotificationError(pub String);

/// Delivers customer notifications.
///
/// Delivery is best-effort. The engine logs a failed notification and carries on; it never undoes the payment
/// confirmation that triggered it.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// A notifier for deployments without a mail server. It only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        let Notification { template, recipient, .. } = notification;
        info!("📧️ Notifications are disabled. {template} for {recipient} was not sent.");
        Ok(())
    }
}
