use crate::{
    db_types::{OwnerRecord, PaymentOwner},
    traits::PaymentGatewayError,
};

/// Access to the records that payments are made for: registrations, book stands and donations.
///
/// These records are created and managed elsewhere. The payment engine only reads them here. Moving an owner to its
/// paid status happens inside [`crate::traits::PaymentGatewayDatabase::confirm_payment`], in the same transaction
/// that confirms the reference.
#[allow(async_fn_in_trait)]
pub trait OwnerManagement {
    /// Fetches the owner record, or `None` if no such owner exists.
    async fn fetch_owner(&self, owner: &PaymentOwner) -> Result<Option<OwnerRecord>, PaymentGatewayError>;
}
