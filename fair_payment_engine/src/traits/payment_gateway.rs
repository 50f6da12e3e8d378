use thiserror::Error;

use crate::traits::data_objects::{InitializePayment, PaymentSession, VerifiedPayment};

/// The external card payment provider.
///
/// Implementations translate between the provider's wire format and the engine's types. In particular, all amounts
/// crossing this seam are in major currency units; conversion to and from minor units is the implementation's job.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Opens a payment session for the customer. Not idempotent, so the engine never retries it.
    async fn initialize(&self, request: InitializePayment) -> Result<PaymentSession, GatewayError>;

    /// Asks the provider for the authoritative state of the payment with the given reference.
    ///
    /// A failed or abandoned payment is a successful *verification*; only transport and protocol problems are errors.
    async fn verify(&self, reference: &str) -> Result<VerifiedPayment, GatewayError>;

    /// Checks the signature the provider attached to a webhook body.
    fn validate_webhook_signature(&self, raw_body: &[u8], signature: &str) -> bool;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Could not reach the payment gateway. {0}")]
    Transport(String),
    #[error("The payment gateway returned an error ({status}). {message}")]
    Response { status: u16, message: String },
    #[error("The payment gateway rejected the request. {0}")]
    Rejected(String),
    #[error("The payment gateway returned an unexpected response. {0}")]
    MalformedResponse(String),
    #[error("The amount cannot be sent to the payment gateway. {0}")]
    InvalidAmount(String),
}

impl GatewayError {
    /// True if repeating the same request might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Response { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
