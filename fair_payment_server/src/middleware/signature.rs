//! Webhook signature middleware for Actix Web.
//!
//! The payment gateway signs every webhook call with an HMAC-SHA512 of the raw request body, keyed with the merchant
//! secret key, and sends the hex digest in the `x-gateway-signature` header.
//!
//! This middleware checks that signature against the raw bytes *before* anything parses the body, and rejects the
//! call with a `400` if it is missing or wrong. The body is then handed on to the route unchanged.
//!
//! The check itself is delegated to [`PaymentGateway::validate_webhook_signature`], so the middleware works with any
//! gateway implementation.

use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use fair_payment_engine::traits::PaymentGateway;
use futures::future::LocalBoxFuture;
use log::{trace, warn};

use crate::errors::ServerError;

pub const SIGNATURE_HEADER: &str = "x-gateway-signature";

pub struct SignatureMiddlewareFactory<G> {
    signature_header: String,
    gateway: Arc<G>,
    // If false, then the middleware will not check the signature and always allow the call
    enabled: bool,
}

impl<G> SignatureMiddlewareFactory<G> {
    pub fn new(signature_header: &str, gateway: Arc<G>, enabled: bool) -> Self {
        SignatureMiddlewareFactory { signature_header: signature_header.into(), gateway, enabled }
    }
}

impl<S, B, G> Transform<S, ServiceRequest> for SignatureMiddlewareFactory<G>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    G: PaymentGateway + 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = SignatureMiddlewareService<S, G>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SignatureMiddlewareService {
            signature_header: self.signature_header.clone(),
            gateway: Arc::clone(&self.gateway),
            enabled: self.enabled,
            service: Rc::new(service),
        }))
    }
}

pub struct SignatureMiddlewareService<S, G> {
    signature_header: String,
    gateway: Arc<G>,
    enabled: bool,
    service: Rc<S>,
}

impl<S, B, G> Service<ServiceRequest> for SignatureMiddlewareService<S, G>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    G: PaymentGateway + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let gateway = Arc::clone(&self.gateway);
        let signature_header = self.signature_header.clone();
        let enabled = self.enabled;
        Box::pin(async move {
            trace!("🔐️ Checking webhook signature for request");
            if !enabled {
                trace!("🔐️ Webhook signature checks are disabled. Allowing request.");
                return service.call(req).await;
            }
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {:?}", e);
                ServerError::InvalidRequestBody("Failed to extract request data.".into())
            })?;
            let signature = req
                .headers()
                .get(&signature_header)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    warn!("🔐️ No webhook signature found in request. Denying access.");
                    ServerError::InvalidSignature
                })?
                .to_string();
            if gateway.validate_webhook_signature(data.as_ref(), &signature) {
                trace!("🔐️ Webhook signature check for request ✅️");
                req.set_payload(bytes_to_payload(data));
                service.call(req).await
            } else {
                warn!("🔐️ Invalid webhook signature found in request. Denying access.");
                Err(ServerError::InvalidSignature.into())
            }
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
