use log::*;
use sqlx::SqliteConnection;

use crate::db_types::{DonationRecord, DonationStatus, NewDonation};

pub async fn insert(donation: NewDonation, conn: &mut SqliteConnection) -> Result<DonationRecord, sqlx::Error> {
    let result = sqlx::query_as("INSERT INTO donations (id, email, donor_name) VALUES ($1, $2, $3) RETURNING *")
        .bind(donation.id)
        .bind(donation.email)
        .bind(donation.donor_name)
        .fetch_one(conn)
        .await?;
    Ok(result)
}

pub async fn fetch(id: &str, conn: &mut SqliteConnection) -> Result<Option<DonationRecord>, sqlx::Error> {
    let result = sqlx::query_as("SELECT * FROM donations WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(result)
}

/// Marks the donation as `Successful`. A donation whose earlier attempt failed can still succeed later.
pub async fn mark_successful(id: &str, conn: &mut SqliteConnection) -> Result<Option<DonationRecord>, sqlx::Error> {
    let paid = DonationStatus::PAID.to_string();
    let result =
        sqlx::query("UPDATE donations SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status <> $1")
            .bind(paid)
            .bind(id)
            .execute(&mut *conn)
            .await?;
    if result.rows_affected() == 0 {
        trace!("🗃️ Donation {id} was not updated. It is already successful or does not exist.");
    }
    fetch(id, conn).await
}
