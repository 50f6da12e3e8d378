use chrono::{DateTime, Utc};
use fpg_common::MajorUnits;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    db_types::{OwnerKind, OwnerRecord, PaymentOwner, PaymentReference},
    traits::{GatewayPaymentStatus, VerifiedPayment},
};

/// A request to start a payment for a registration, book stand or donation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInitRequest {
    pub email: String,
    pub amount: MajorUnits,
    pub owner: PaymentOwner,
    /// Defaults to the engine's configured currency
    pub currency: Option<String>,
    /// Additional metadata to send to the gateway along with the owner fields
    pub metadata: Value,
}

/// The outcome of reconciling a payment reference with the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub reference: String,
    pub status: GatewayPaymentStatus,
    /// In major units
    pub amount: MajorUnits,
    pub currency: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub channel: Option<String>,
    pub owner_kind: Option<OwnerKind>,
    pub owner_key: Option<String>,
    pub metadata: Value,
    pub message: String,
    pub success: bool,
    /// True only for the call that moved the reference to `Success`. Repeat reconciliations report false.
    pub newly_confirmed: bool,
}

impl ReconciliationResult {
    pub(crate) fn failed(payment: VerifiedPayment, owner: Option<PaymentOwner>) -> Self {
        let message = payment.message();
        Self {
            reference: payment.reference,
            status: payment.status,
            amount: payment.amount,
            currency: payment.currency,
            paid_at: payment.paid_at,
            channel: payment.channel,
            owner_kind: owner.as_ref().map(|o| o.kind()),
            owner_key: owner.map(|o| o.key().to_string()),
            metadata: payment.metadata,
            message,
            success: false,
            newly_confirmed: false,
        }
    }

    pub(crate) fn confirmed(payment: VerifiedPayment, owner: PaymentOwner, newly_confirmed: bool) -> Self {
        let message = if newly_confirmed {
            "Payment verified successfully".to_string()
        } else {
            "Payment was already verified".to_string()
        };
        Self {
            reference: payment.reference,
            status: payment.status,
            amount: payment.amount,
            currency: payment.currency,
            paid_at: payment.paid_at,
            channel: payment.channel,
            owner_kind: Some(owner.kind()),
            owner_key: Some(owner.key().to_string()),
            metadata: payment.metadata,
            message,
            success: true,
            newly_confirmed,
        }
    }

    pub fn owner(&self) -> Option<PaymentOwner> {
        match (self.owner_kind, self.owner_key.as_ref()) {
            (Some(kind), Some(key)) => Some(PaymentOwner::new(kind, key.clone())),
            _ => None,
        }
    }
}

/// A payment reference together with the current state of its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceWithOwner {
    pub reference: PaymentReference,
    pub owner: Option<OwnerRecord>,
}
