use std::{fmt::Debug, time::Duration};

use fpg_common::DEFAULT_CURRENCY_CODE;
use log::*;
use serde_json::json;

use crate::{
    db_types::{NewPaymentReference, OwnerKind, OwnerRecord, PaymentOwner, PaymentStatus, ReferenceStatusUpdate},
    fpe_api::{
        errors::PaymentFlowError,
        payment_objects::{PaymentInitRequest, ReconciliationResult},
    },
    helpers::{callback_url, extract_owner_from_metadata, generate_reference, owner_metadata},
    traits::{
        ConfirmedPayment,
        InitializePayment,
        Notification,
        NotificationTemplate,
        Notifier,
        PaymentConfirmation,
        PaymentGateway,
        PaymentGatewayDatabase,
        PaymentSession,
        VerifiedPayment,
    },
};

pub const DEFAULT_VERIFY_ATTEMPTS: u32 = 3;
pub const DEFAULT_VERIFY_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct ReconciliationOptions {
    /// How many times to call the gateway's verify endpoint before giving up. Only transient errors are retried.
    pub verify_attempts: u32,
    /// The fixed delay between verify attempts
    pub verify_backoff: Duration,
    /// The currency for new payments that do not specify one
    pub currency: String,
    /// Used to build the callback URL the gateway redirects the customer to. If `None`, the gateway's own default is
    /// used.
    pub public_base_url: Option<String>,
}

impl Default for ReconciliationOptions {
    fn default() -> Self {
        Self {
            verify_attempts: DEFAULT_VERIFY_ATTEMPTS,
            verify_backoff: DEFAULT_VERIFY_BACKOFF,
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            public_base_url: None,
        }
    }
}

/// `PaymentFlowApi` is the primary API for opening payment sessions and reconciling payments with the gateway.
///
/// Reconciliation is safe to repeat. The redirect callback and the gateway webhook usually both arrive for the same
/// payment, and only the first of them to confirm the payment sends a notification.
pub struct PaymentFlowApi<B, G, N> {
    db: B,
    gateway: G,
    notifier: N,
    options: ReconciliationOptions,
}

impl<B, G, N> Debug for PaymentFlowApi<B, G, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi ({:?})", self.options)
    }
}

impl<B, G, N> PaymentFlowApi<B, G, N> {
    pub fn new(db: B, gateway: G, notifier: N) -> Self {
        Self { db, gateway, notifier, options: ReconciliationOptions::default() }
    }

    pub fn with_options(mut self, options: ReconciliationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ReconciliationOptions {
        &self.options
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

impl<B, G, N> PaymentFlowApi<B, G, N>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
    N: Notifier,
{
    /// Opens a payment session with the gateway for the given owner, and records the new reference as `Pending`.
    ///
    /// The gateway call is not retried, and nothing is stored if it fails.
    pub async fn initialize_payment(&self, request: PaymentInitRequest) -> Result<PaymentSession, PaymentFlowError> {
        if !request.amount.is_positive() {
            return Err(PaymentFlowError::InvalidAmount(format!("{} is not a positive amount", request.amount)));
        }
        let owner = request.owner;
        if self.db.fetch_owner(&owner).await?.is_none() {
            debug!("🔄️ Cannot initialize a payment for {owner}, since it does not exist");
            return Err(PaymentFlowError::OwnerNotFound(owner));
        }
        let currency =
            request.currency.filter(|c| !c.trim().is_empty()).unwrap_or_else(|| self.options.currency.clone());
        let reference = generate_reference(owner.kind());
        let callback = self.options.public_base_url.as_deref().map(|base| callback_url(base, owner.kind()));
        let init = InitializePayment {
            email: request.email,
            amount: request.amount,
            currency: currency.clone(),
            reference: reference.clone(),
            owner: owner.clone(),
            callback_url: callback,
            metadata: owner_metadata(&owner, &request.metadata),
        };
        debug!("🔄️ Opening payment session {reference} for {owner}: {} {currency}", request.amount);
        let mut session = self.gateway.initialize(init).await.map_err(|e| {
            warn!("🔄️ Could not open a payment session for {owner}. {e}");
            PaymentFlowError::Gateway(e)
        })?;
        if session.reference.is_empty() {
            session.reference = reference;
        }
        let new_reference =
            NewPaymentReference::new(session.reference.clone(), owner.clone(), request.amount, &currency);
        self.db.create_reference(new_reference).await?;
        info!("🔄️ Payment session {} opened for {owner}", session.reference);
        Ok(session)
    }

    /// Confirms the outcome of a payment with the gateway and applies it to the payment's owner.
    ///
    /// * A payment the gateway does not report as successful changes nothing except the reference, which is marked
    ///   `Failed`. The result has `success: false`.
    /// * A successful payment moves the reference to `Success` and the owner to its paid status in one transaction,
    ///   and sends a confirmation notification the first time this happens.
    ///
    /// If no reference was stored when the payment was initialized, the owner is taken from the payment metadata.
    pub async fn reconcile(&self, reference: &str) -> Result<ReconciliationResult, PaymentFlowError> {
        self.reconcile_payment(reference, None).await
    }

    /// Like [`Self::reconcile`], but fails with [`PaymentFlowError::OwnerMismatch`] if the payment is not for an owner
    /// of the `expected` kind. Nothing is changed in that case.
    pub async fn reconcile_for_owner(
        &self,
        reference: &str,
        expected: OwnerKind,
    ) -> Result<ReconciliationResult, PaymentFlowError> {
        self.reconcile_payment(reference, Some(expected)).await
    }

    async fn reconcile_payment(
        &self,
        reference: &str,
        expected: Option<OwnerKind>,
    ) -> Result<ReconciliationResult, PaymentFlowError> {
        debug!("🔄️ Reconciling payment {reference}");
        let mut payment = self.verify_with_retry(reference).await?;
        let existing = self.db.fetch_reference(reference).await?;
        let owner = match existing.as_ref() {
            Some(r) => Some(r.owner()),
            None => extract_owner_from_metadata(&payment.metadata),
        };
        if let (Some(expected), Some(owner)) = (expected, owner.as_ref()) {
            if owner.kind() != expected {
                warn!("🔄️ Payment {reference} is for {owner}, but a {expected} payment was expected");
                return Err(PaymentFlowError::OwnerMismatch {
                    reference: reference.to_string(),
                    expected,
                    actual: owner.clone(),
                });
            }
        }
        if !payment.status.is_success() {
            info!("🔄️ Payment {reference} was not successful. The gateway reports '{}'", payment.status);
            if let Some(r) = existing.as_ref().filter(|r| r.status == PaymentStatus::Pending) {
                let update = ReferenceStatusUpdate::new(PaymentStatus::Failed);
                if let Err(e) = self.db.update_reference_status(&r.reference, update).await {
                    warn!("🔄️ Could not mark payment {reference} as failed. {e}");
                }
            }
            return Ok(ReconciliationResult::failed(payment, owner));
        }
        let Some(owner) = owner else {
            warn!("🔄️ Payment {reference} succeeded, but there is no record of it and the metadata has no owner");
            return Err(PaymentFlowError::MetadataIncomplete);
        };
        if self.db.fetch_owner(&owner).await?.is_none() {
            warn!("🔄️ Payment {reference} succeeded, but its owner {owner} does not exist");
            return Err(PaymentFlowError::OwnerNotFound(owner));
        }
        if payment.currency.is_empty() {
            payment.currency =
                existing.as_ref().map(|r| r.currency.clone()).unwrap_or_else(|| self.options.currency.clone());
        }
        if let Some(r) = existing.as_ref().filter(|r| r.amount != payment.amount) {
            warn!(
                "🔄️ Payment {reference} was opened for {} {}, but the gateway reports {} {}. Recording the gateway \
                 amount.",
                r.amount, r.currency, payment.amount, payment.currency
            );
        }
        let confirmation = PaymentConfirmation {
            reference: reference.to_string(),
            owner: owner.clone(),
            amount: payment.amount,
            currency: payment.currency.clone(),
        };
        let confirmed = self.db.confirm_payment(confirmation).await?;
        if confirmed.newly_confirmed {
            info!("🔄️ Payment {reference} confirmed. {owner} is now paid");
            self.notify(&confirmed, &payment).await;
        } else {
            debug!("🔄️ Payment {reference} had already been confirmed. No notification will be sent.");
        }
        Ok(ReconciliationResult::confirmed(payment, confirmed.owner.owner(), confirmed.newly_confirmed))
    }

    /// Calls the gateway's verify endpoint, retrying transient failures with a fixed backoff.
    async fn verify_with_retry(&self, reference: &str) -> Result<VerifiedPayment, PaymentFlowError> {
        let max_attempts = self.options.verify_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.gateway.verify(reference).await {
                Ok(payment) => return Ok(payment),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    warn!(
                        "🔄️ Attempt {attempt}/{max_attempts} to verify {reference} failed. Retrying in {}ms. {e}",
                        self.options.verify_backoff.as_millis()
                    );
                    tokio::time::sleep(self.options.verify_backoff).await;
                },
                Err(e) => {
                    error!("🔄️ Could not verify payment {reference} after {attempt} attempt(s). {e}");
                    return Err(PaymentFlowError::VerificationFailed { attempts: attempt, reason: e.to_string() });
                },
            }
        }
    }

    /// Sends the confirmation notification. Failures are logged and otherwise ignored; the payment stays confirmed.
    async fn notify(&self, confirmed: &ConfirmedPayment, payment: &VerifiedPayment) {
        let Some(notification) = confirmation_notification(confirmed, payment) else {
            warn!("🔄️ {} has no email address. No confirmation will be sent.", confirmed.owner.owner());
            return;
        };
        let template = notification.template;
        let recipient = notification.recipient.clone();
        match self.notifier.send(notification).await {
            Ok(()) => debug!("🔄️ {template} notification sent to {recipient}"),
            Err(e) => {
                warn!("🔄️ Payment {} is confirmed, but the {template} notification failed. {e}", payment.reference)
            },
        }
    }
}

/// Builds the notification for a newly confirmed payment. Returns `None` if the owner has no email address.
fn confirmation_notification(confirmed: &ConfirmedPayment, payment: &VerifiedPayment) -> Option<Notification> {
    let recipient = confirmed.owner.email().trim();
    if recipient.is_empty() {
        return None;
    }
    let template = match &confirmed.owner {
        OwnerRecord::Registration(_) => NotificationTemplate::RegistrationConfirmed,
        OwnerRecord::BookStand(_) => NotificationTemplate::BookStandPaid,
        OwnerRecord::Donation(_) => NotificationTemplate::DonationReceived,
    };
    let owner: PaymentOwner = confirmed.owner.owner();
    let data = json!({
        "name": confirmed.owner.display_name(),
        "reference": confirmed.reference.reference,
        "amount": confirmed.reference.amount,
        "currency": confirmed.reference.currency,
        "paidAt": payment.paid_at,
        "channel": payment.channel,
        "ownerKind": owner.kind(),
        "ownerKey": owner.key(),
    });
    Some(Notification { template, recipient: recipient.to_string(), data })
}
