use std::fmt::Display;

use chrono::{DateTime, Utc};
use fpg_common::MajorUnits;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db_types::{OwnerRecord, PaymentOwner, PaymentReference};

/// A request to open a payment session with the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializePayment {
    pub email: String,
    pub amount: MajorUnits,
    pub currency: String,
    pub reference: String,
    pub owner: PaymentOwner,
    pub callback_url: Option<String>,
    /// Sent to the gateway verbatim, and returned with every verification of this payment.
    pub metadata: Value,
}

/// An open payment session. The customer completes the payment at `authorization_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    pub authorization_url: String,
    pub reference: String,
    pub access_code: String,
}

/// The status of a payment, as reported by the gateway.
///
/// Only `Success` is definitive. Anything the engine does not recognise is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GatewayPaymentStatus {
    Success,
    Failed,
    Pending,
    Abandoned,
    Reversed,
    Other(String),
}

impl GatewayPaymentStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<&str> for GatewayPaymentStatus {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "failed" => Self::Failed,
            "pending" | "ongoing" | "processing" => Self::Pending,
            "abandoned" => Self::Abandoned,
            "reversed" => Self::Reversed,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl From<String> for GatewayPaymentStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<GatewayPaymentStatus> for String {
    fn from(value: GatewayPaymentStatus) -> Self {
        value.to_string()
    }
}

impl Display for GatewayPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failed => f.write_str("failed"),
            Self::Pending => f.write_str("pending"),
            Self::Abandoned => f.write_str("abandoned"),
            Self::Reversed => f.write_str("reversed"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// The gateway's authoritative view of a payment. Amounts are in major units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedPayment {
    pub reference: String,
    pub status: GatewayPaymentStatus,
    pub amount: MajorUnits,
    pub currency: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub channel: Option<String>,
    pub gateway_response: Option<String>,
    pub metadata: Value,
}

impl VerifiedPayment {
    /// The gateway's own description of the outcome, falling back to the status.
    pub fn message(&self) -> String {
        self.gateway_response.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| format!("Payment {}", self.status))
    }
}

/// A verified, successful payment to be recorded against its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub reference: String,
    pub owner: PaymentOwner,
    pub amount: MajorUnits,
    pub currency: String,
}

/// The outcome of [`crate::traits::PaymentGatewayDatabase::confirm_payment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedPayment {
    pub reference: PaymentReference,
    pub owner: OwnerRecord,
    /// False if the reference was already `Success` before this confirmation.
    pub newly_confirmed: bool,
}
