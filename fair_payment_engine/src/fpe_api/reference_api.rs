use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{OwnerRecord, PaymentOwner, PaymentReference},
    fpe_api::payment_objects::ReferenceWithOwner,
    traits::{PaymentGatewayDatabase, PaymentGatewayError},
};

/// Read-only access to payment references and the records they pay for.
pub struct ReferenceApi<B> {
    db: B,
}

impl<B> Debug for ReferenceApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReferenceApi")
    }
}

impl<B> ReferenceApi<B>
where B: PaymentGatewayDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn fetch_reference(&self, reference: &str) -> Result<Option<PaymentReference>, PaymentGatewayError> {
        self.db.fetch_reference(reference).await
    }

    /// Fetches the payment reference along with the current state of its owner. The owner is `None` if it has been
    /// removed since the payment was made.
    pub async fn reference_with_owner(
        &self,
        reference: &str,
    ) -> Result<Option<ReferenceWithOwner>, PaymentGatewayError> {
        let Some(reference) = self.db.fetch_reference(reference).await? else {
            return Ok(None);
        };
        let owner = self.db.fetch_owner(&reference.owner()).await?;
        if owner.is_none() {
            warn!("🗃️ Payment reference {} points at {}, which does not exist", reference.reference, reference.owner());
        }
        Ok(Some(ReferenceWithOwner { reference, owner }))
    }

    pub async fn fetch_owner(&self, owner: &PaymentOwner) -> Result<Option<OwnerRecord>, PaymentGatewayError> {
        self.db.fetch_owner(owner).await
    }
}
