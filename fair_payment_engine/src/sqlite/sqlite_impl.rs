//! `SqliteDatabase` is a concrete implementation of a Fair Payment Engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateError, SqliteConnection, SqlitePool};

use super::db::{book_stands, db_url, donations, new_pool, references, registrations, run_migrations};
use crate::{
    db_types::{NewPaymentReference, OwnerRecord, PaymentOwner, PaymentReference, ReferenceStatusUpdate},
    traits::{
        ConfirmedPayment,
        OwnerManagement,
        PaymentConfirmation,
        PaymentGatewayDatabase,
        PaymentGatewayError,
        ReferenceRegistry,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn confirm_payment(&self, payment: PaymentConfirmation) -> Result<ConfirmedPayment, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        // No reads before this write. A read would pin a snapshot that a racing confirmation can invalidate.
        let (reference, newly_confirmed) = references::confirm_success(&payment, &mut tx).await?;
        // An existing reference keeps its original owner, so mark whichever owner the stored row points at.
        let owner = reference.owner();
        if owner != payment.owner {
            warn!(
                "🗃️ Payment {} is stored against {owner}, but the confirmation was for {}. The stored owner wins.",
                payment.reference, payment.owner
            );
        }
        let Some(record) = mark_owner_paid(&owner, &mut tx).await? else {
            // Dropping the transaction rolls back the reference upsert
            return Err(PaymentGatewayError::OwnerNotFound(owner));
        };
        tx.commit().await?;
        if newly_confirmed {
            info!("🗃️ Payment {} confirmed for {owner}", reference.reference);
        } else {
            debug!("🗃️ Payment {} was already confirmed for {owner}", reference.reference);
        }
        Ok(ConfirmedPayment { reference, owner: record, newly_confirmed })
    }
}

impl ReferenceRegistry for SqliteDatabase {
    async fn create_reference(&self, reference: NewPaymentReference) -> Result<PaymentReference, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        references::insert(reference, &mut conn).await
    }

    async fn fetch_reference(&self, reference: &str) -> Result<Option<PaymentReference>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let result = references::fetch(reference, &mut conn).await?;
        Ok(result)
    }

    async fn update_reference_status(
        &self,
        reference: &str,
        update: ReferenceStatusUpdate,
    ) -> Result<PaymentReference, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        references::update_status(reference, update, &mut conn).await
    }
}

impl OwnerManagement for SqliteDatabase {
    async fn fetch_owner(&self, owner: &PaymentOwner) -> Result<Option<OwnerRecord>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let record = match owner {
            PaymentOwner::Registration(id) => registrations::fetch(id, &mut conn).await?.map(OwnerRecord::Registration),
            PaymentOwner::BookStand(id) => book_stands::fetch(id, &mut conn).await?.map(OwnerRecord::BookStand),
            PaymentOwner::Donation(id) => donations::fetch(id, &mut conn).await?.map(OwnerRecord::Donation),
        };
        Ok(record)
    }
}

async fn mark_owner_paid(
    owner: &PaymentOwner,
    conn: &mut SqliteConnection,
) -> Result<Option<OwnerRecord>, PaymentGatewayError> {
    let record = match owner {
        PaymentOwner::Registration(id) => registrations::mark_completed(id, conn).await?.map(OwnerRecord::Registration),
        PaymentOwner::BookStand(id) => book_stands::mark_paid(id, conn).await?.map(OwnerRecord::BookStand),
        PaymentOwner::Donation(id) => donations::mark_successful(id, conn).await?.map(OwnerRecord::Donation),
    };
    Ok(record)
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    /// Connects to the database at `url`, creating the database file if it does not exist yet.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Runs any outstanding schema migrations.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        run_migrations(&self.pool).await
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
