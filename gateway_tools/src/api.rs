use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
    Url,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::GatewayConfig,
    data_objects::{ApiResponse, InitializeTransactionRequest, InitializedTransaction, Transaction},
    signature::validate_signature,
    GatewayApiError,
};

#[derive(Clone)]
pub struct GatewayApi {
    config: GatewayConfig,
    client: Arc<Client>,
}

impl GatewayApi {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let mut val = HeaderValue::from_str(&bearer).map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Sends a request to the gateway and unwraps the response envelope.
    ///
    /// Non-2xx statuses become [`GatewayApiError::QueryError`], and a 2xx response whose envelope has `status: false`
    /// becomes [`GatewayApiError::Rejected`].
    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<B>,
    ) -> Result<T, GatewayApiError> {
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.map_err(transport_error)?;
            return Err(GatewayApiError::QueryError { status: status.as_u16(), message });
        }
        trace!("💳️ REST query successful. {status}");
        let envelope = response.json::<ApiResponse<T>>().await.map_err(|e| {
            if e.is_decode() {
                GatewayApiError::JsonError(e.to_string())
            } else {
                transport_error(e)
            }
        })?;
        if !envelope.status {
            return Err(GatewayApiError::Rejected(envelope.message));
        }
        envelope.data.ok_or(GatewayApiError::MissingField("data"))
    }

    pub fn url(&self, segments: &[&str]) -> Result<Url, GatewayApiError> {
        let mut url =
            Url::parse(&self.config.base_url).map_err(|e| GatewayApiError::RestRequestError(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| GatewayApiError::RestRequestError(format!("{} cannot be a base URL", self.config.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Starts a new transaction on the gateway. The customer completes the payment at the returned
    /// `authorization_url`.
    ///
    /// This call is not idempotent on the gateway side, so callers should not retry it blindly.
    pub async fn initialize_transaction(
        &self,
        request: &InitializeTransactionRequest,
    ) -> Result<InitializedTransaction, GatewayApiError> {
        let url = self.url(&["transaction", "initialize"])?;
        debug!("💳️ Initializing transaction {} for {}", request.reference, request.amount);
        let result = self.rest_query::<InitializedTransaction, _>(Method::POST, url, Some(request)).await?;
        if result.authorization_url.as_deref().map(str::is_empty).unwrap_or(true) {
            warn!("💳️ Transaction {} was initialized, but no authorization url was returned", request.reference);
            return Err(GatewayApiError::MissingField("authorization_url"));
        }
        info!("💳️ Transaction {} initialized", result.reference);
        Ok(result)
    }

    /// Asks the gateway for the current state of the transaction with the given reference.
    ///
    /// A payment that failed or was abandoned is *not* an error. Check [`Transaction::status`].
    pub async fn verify_transaction(&self, reference: &str) -> Result<Transaction, GatewayApiError> {
        let url = self.url(&["transaction", "verify", reference])?;
        debug!("💳️ Verifying transaction {reference}");
        let tx = self.rest_query::<Transaction, ()>(Method::GET, url, None).await?;
        info!("💳️ Transaction {reference} has status '{}'", tx.status);
        Ok(tx)
    }

    /// Checks a webhook body against the signature header using the configured secret key.
    pub fn validate_webhook_signature(&self, raw_body: &[u8], signature: &str) -> bool {
        validate_signature(self.config.secret_key.reveal(), raw_body, signature)
    }
}

/// Failures to talk to the gateway at all: refused connections, timeouts, dropped bodies.
fn transport_error(e: reqwest::Error) -> GatewayApiError {
    if e.is_timeout() {
        warn!("💳️ Gateway call timed out. {e}");
    }
    GatewayApiError::RestResponseError(e.to_string())
}
