use crate::{
    db_types::{NewPaymentReference, PaymentReference, ReferenceStatusUpdate},
    traits::PaymentGatewayError,
};

/// Storage for payment references.
///
/// References are never deleted. The only mutation is a status change, and a reference that has reached `Success`
/// never moves to any other status.
#[allow(async_fn_in_trait)]
pub trait ReferenceRegistry {
    /// Stores a new payment reference.
    ///
    /// Returns [`PaymentGatewayError::DuplicateReference`] if the reference already exists.
    async fn create_reference(&self, reference: NewPaymentReference) -> Result<PaymentReference, PaymentGatewayError>;

    /// Fetches the payment reference with the given reference string, if it exists.
    async fn fetch_reference(&self, reference: &str) -> Result<Option<PaymentReference>, PaymentGatewayError>;

    /// Changes the status of a payment reference (and optionally the amount and currency that the gateway reported).
    ///
    /// Returns [`PaymentGatewayError::ReferenceNotFound`] if there is no such reference, and
    /// [`PaymentGatewayError::IllegalStatusTransition`] if the reference is already `Success` and the update would move
    /// it away from that status.
    async fn update_reference_status(
        &self,
        reference: &str,
        update: ReferenceStatusUpdate,
    ) -> Result<PaymentReference, PaymentGatewayError>;
}
