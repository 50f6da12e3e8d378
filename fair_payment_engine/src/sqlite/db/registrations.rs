use log::*;
use sqlx::SqliteConnection;

use crate::db_types::{NewRegistration, Registration, RegistrationStatus};

pub async fn insert(registration: NewRegistration, conn: &mut SqliteConnection) -> Result<Registration, sqlx::Error> {
    let result = sqlx::query_as("INSERT INTO registrations (id, email, full_name) VALUES ($1, $2, $3) RETURNING *")
        .bind(registration.id)
        .bind(registration.email)
        .bind(registration.full_name)
        .fetch_one(conn)
        .await?;
    Ok(result)
}

pub async fn fetch(id: &str, conn: &mut SqliteConnection) -> Result<Option<Registration>, sqlx::Error> {
    let result = sqlx::query_as("SELECT * FROM registrations WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(result)
}

/// Sets the payment status to `Completed`, unless it already is. Returns the registration, or `None` if it does not
/// exist.
pub async fn mark_completed(id: &str, conn: &mut SqliteConnection) -> Result<Option<Registration>, sqlx::Error> {
    let paid = RegistrationStatus::PAID.to_string();
    let result = sqlx::query(
        "UPDATE registrations SET payment_status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND \
         payment_status <> $1",
    )
    .bind(paid)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        trace!("🗃️ Registration {id} was not updated. It is already completed or does not exist.");
    }
    fetch(id, conn).await
}
