//! Connects the payment engine to the card payment gateway.
//!
//! The engine works in major units (naira) and the gateway in minor units (kobo). This module is the one place where
//! amounts are converted between the two.
use chrono::{DateTime, Utc};
use fair_payment_engine::traits::{
    GatewayError,
    GatewayPaymentStatus,
    InitializePayment,
    PaymentGateway,
    PaymentSession,
    VerifiedPayment,
};
use gateway_tools::{GatewayApi, GatewayApiError, GatewayConfig, InitializeTransactionRequest, Transaction};
use log::*;

#[derive(Clone)]
pub struct GatewayClient {
    api: GatewayApi,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayApiError> {
        let api = GatewayApi::new(config)?;
        Ok(Self { api })
    }
}

impl PaymentGateway for GatewayClient {
    async fn initialize(&self, request: InitializePayment) -> Result<PaymentSession, GatewayError> {
        let request = transaction_request(request)?;
        let tx = self.api.initialize_transaction(&request).await.map_err(gateway_error)?;
        let reference = if tx.reference.is_empty() { request.reference } else { tx.reference };
        Ok(PaymentSession {
            authorization_url: tx.authorization_url.unwrap_or_default(),
            reference,
            access_code: tx.access_code,
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedPayment, GatewayError> {
        let tx = self.api.verify_transaction(reference).await.map_err(gateway_error)?;
        Ok(verified_payment(tx))
    }

    fn validate_webhook_signature(&self, raw_body: &[u8], signature: &str) -> bool {
        self.api.validate_webhook_signature(raw_body, signature)
    }
}

/// Converts a payment request into the gateway's wire format. Amounts that are not a whole number of minor units are
/// rejected.
pub fn transaction_request(request: InitializePayment) -> Result<InitializeTransactionRequest, GatewayError> {
    let amount = request.amount.to_minor_units().map_err(|e| {
        warn!("💳️ Cannot send {} to the gateway. {e}", request.amount);
        GatewayError::InvalidAmount(e.to_string())
    })?;
    Ok(InitializeTransactionRequest {
        email: request.email,
        amount,
        currency: request.currency,
        reference: request.reference,
        callback_url: request.callback_url,
        metadata: request.metadata,
    })
}

/// Converts a gateway transaction (from the verify endpoint or a webhook) into the engine's representation.
pub fn verified_payment(tx: Transaction) -> VerifiedPayment {
    let paid_at = tx.paid_at.as_deref().and_then(|s| match DateTime::parse_from_rfc3339(s) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            debug!("💳️ Ignoring unreadable paid_at timestamp '{s}' for {}. {e}", tx.reference);
            None
        },
    });
    VerifiedPayment {
        status: GatewayPaymentStatus::from(tx.status.as_str()),
        amount: tx.amount.to_major_units(),
        currency: tx.currency.trim().to_uppercase(),
        reference: tx.reference,
        paid_at,
        channel: tx.channel,
        gateway_response: tx.gateway_response,
        metadata: tx.metadata,
    }
}

fn gateway_error(e: GatewayApiError) -> GatewayError {
    match e {
        GatewayApiError::RestResponseError(s) => GatewayError::Transport(s),
        GatewayApiError::QueryError { status, message } => GatewayError::Response { status, message },
        GatewayApiError::Rejected(s) => GatewayError::Rejected(s),
        GatewayApiError::JsonError(_) | GatewayApiError::MissingField(_) => {
            GatewayError::MalformedResponse(e.to_string())
        },
        GatewayApiError::Initialization(_) | GatewayApiError::RestRequestError(_) => {
            GatewayError::Rejected(e.to_string())
        },
    }
}
