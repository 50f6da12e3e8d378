use thiserror::Error;

use crate::{
    db_types::{OwnerKind, PaymentOwner},
    traits::{GatewayError, PaymentGatewayError},
};

#[derive(Debug, Clone, Error)]
pub enum PaymentFlowError {
    #[error("Payment verification failed after {attempts} attempt(s). {reason}")]
    VerificationFailed { attempts: u32, reason: String },
    #[error("The payment metadata does not say which registration, book stand or donation it is for.")]
    MetadataIncomplete,
    #[error("The payment owner {0} does not exist")]
    OwnerNotFound(PaymentOwner),
    #[error("Payment {reference} is for {actual}, not for a {expected}")]
    OwnerMismatch { reference: String, expected: OwnerKind, actual: PaymentOwner },
    #[error("Payment reference {0} already exists")]
    DuplicateReference(String),
    #[error("Payment reference {0} does not exist")]
    ReferenceNotFound(String),
    #[error("Invalid payment amount. {0}")]
    InvalidAmount(String),
    #[error("Payment gateway error. {0}")]
    Gateway(#[from] GatewayError),
    #[error("Database error: {0}")]
    Database(String),
}

impl From<PaymentGatewayError> for PaymentFlowError {
    fn from(e: PaymentGatewayError) -> Self {
        match e {
            PaymentGatewayError::DuplicateReference(r) => Self::DuplicateReference(r),
            PaymentGatewayError::ReferenceNotFound(r) => Self::ReferenceNotFound(r),
            PaymentGatewayError::OwnerNotFound(o) => Self::OwnerNotFound(o),
            e => Self::Database(e.to_string()),
        }
    }
}
