use chrono::{DateTime, Utc};
use fair_payment_engine::{
    db_types::OwnerKind,
    helpers::extract_owner_from_metadata,
    payment_objects::{PaymentInitRequest, ReconciliationResult},
    traits::GatewayPaymentStatus,
    PaymentFlowError,
};
use fpg_common::MajorUnits;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ServerError;

/// The body of a `/payment/initialize` call.
///
/// `metadata` must say who the payment is for, as `{"ownerKind": "BookStand", "ownerKey": "REF123"}` (or the tagged
/// `owner` form). It may also carry a `currency`, and any other fields, which are passed on to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializePaymentBody {
    pub email: String,
    pub amount: MajorUnits,
    #[serde(default)]
    pub metadata: Value,
}

impl InitializePaymentBody {
    pub fn into_request(self) -> Result<PaymentInitRequest, ServerError> {
        let email = self.email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(ServerError::InvalidRequestBody(format!("'{email}' is not a valid email address")));
        }
        let owner = extract_owner_from_metadata(&self.metadata).ok_or(PaymentFlowError::MetadataIncomplete)?;
        let currency = self.metadata.get("currency").and_then(Value::as_str).map(|s| s.trim().to_uppercase());
        Ok(PaymentInitRequest { email, amount: self.amount, owner, currency, metadata: self.metadata })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceQuery {
    pub reference: String,
}

/// What the verify endpoints return to the customer's browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerificationResponse {
    pub reference: String,
    pub status: GatewayPaymentStatus,
    pub amount: MajorUnits,
    pub currency: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub channel: Option<String>,
    pub metadata: Value,
    pub owner_kind: Option<OwnerKind>,
    pub owner_key: Option<String>,
    /// Set for registration payments, so the front end can show the attendee's badge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<String>,
    pub success: bool,
    pub message: String,
}

impl From<ReconciliationResult> for PaymentVerificationResponse {
    fn from(result: ReconciliationResult) -> Self {
        let registration_id = match result.owner_kind {
            Some(OwnerKind::Registration) => result.owner_key.clone(),
            _ => None,
        };
        Self {
            reference: result.reference,
            status: result.status,
            amount: result.amount,
            currency: result.currency,
            paid_at: result.paid_at,
            channel: result.channel,
            metadata: result.metadata,
            owner_kind: result.owner_kind,
            owner_key: result.owner_key,
            registration_id,
            success: result.success,
            message: result.message,
        }
    }
}

/// The only response the webhook ever gives once the signature checks out. The gateway keeps retrying anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self { received: true }
    }
}
