use thiserror::Error;

use crate::{
    db_types::PaymentOwner,
    traits::{
        data_objects::{ConfirmedPayment, PaymentConfirmation},
        OwnerManagement,
        ReferenceRegistry,
    },
};

/// This trait defines the highest level of behaviour for database backends supporting the Fair Payment Engine.
///
/// This behaviour includes:
/// * Storing and updating payment references (via [`ReferenceRegistry`])
/// * Fetching and updating the owners of payments (via [`OwnerManagement`])
/// * Confirming a verified payment against both in a single atomic transaction
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone + ReferenceRegistry + OwnerManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Records a payment that the gateway has verified as successful. In a single atomic transaction,
    /// * the payment reference is created with status `Success`, or updated to `Success` if it already exists, using
    ///   the amount and currency reported by the gateway.
    /// * the owner is moved to its paid status.
    ///
    /// If the owner does not exist, nothing is written and [`PaymentGatewayError::OwnerNotFound`] is returned.
    ///
    /// This call is idempotent. [`ConfirmedPayment::newly_confirmed`] is false if the reference had already been
    /// confirmed, so callers can avoid repeating side effects.
    async fn confirm_payment(&self, payment: PaymentConfirmation) -> Result<ConfirmedPayment, PaymentGatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Cannot insert payment reference, since it already exists: {0}")]
    DuplicateReference(String),
    #[error("The requested payment reference {0} does not exist")]
    ReferenceNotFound(String),
    #[error("The payment owner {0} does not exist")]
    OwnerNotFound(PaymentOwner),
    #[error("Illegal payment status change. {0}")]
    IllegalStatusTransition(String),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
