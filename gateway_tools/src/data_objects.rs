use fpg_common::MinorUnits;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The webhook event type for a completed charge. Other event types are acknowledged but not acted upon.
pub const CHARGE_SUCCESS_EVENT: &str = "charge.success";

/// Every gateway response is wrapped in this envelope. `status` is false when the gateway understood the request but
/// refused it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeTransactionRequest {
    pub email: String,
    /// Amount in minor units
    pub amount: MinorUnits,
    pub currency: String,
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitializedTransaction {
    pub authorization_url: Option<String>,
    #[serde(default)]
    pub access_code: String,
    #[serde(default)]
    pub reference: String,
}

/// A transaction, as returned by the verify endpoint and carried in webhook events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// e.g. "success", "failed", "abandoned", "ongoing", "pending", "reversed"
    pub status: String,
    pub reference: String,
    /// Amount in minor units
    pub amount: MinorUnits,
    #[serde(default)]
    pub currency: String,
    pub paid_at: Option<String>,
    pub channel: Option<String>,
    pub gateway_response: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

impl Transaction {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: Transaction,
}

impl WebhookEvent {
    pub fn is_charge_success(&self) -> bool {
        self.event == CHARGE_SUCCESS_EVENT
    }
}
