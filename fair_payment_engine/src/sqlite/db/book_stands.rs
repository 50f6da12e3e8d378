use log::*;
use sqlx::SqliteConnection;

use crate::db_types::{BookStand, BookStandStatus, NewBookStand};

pub async fn insert(stand: NewBookStand, conn: &mut SqliteConnection) -> Result<BookStand, sqlx::Error> {
    let result = sqlx::query_as(
        "INSERT INTO book_stands (reference_id, email, company_name, status) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(stand.reference_id)
    .bind(stand.email)
    .bind(stand.company_name)
    .bind(stand.status.to_string())
    .fetch_one(conn)
    .await?;
    Ok(result)
}

pub async fn fetch(reference_id: &str, conn: &mut SqliteConnection) -> Result<Option<BookStand>, sqlx::Error> {
    let result = sqlx::query_as("SELECT * FROM book_stands WHERE reference_id = $1")
        .bind(reference_id)
        .fetch_optional(conn)
        .await?;
    Ok(result)
}

/// Sets the booking status to `Paid` from whatever admin status it is in, unless it is already paid. Returns the
/// booking, or `None` if it does not exist.
pub async fn mark_paid(reference_id: &str, conn: &mut SqliteConnection) -> Result<Option<BookStand>, sqlx::Error> {
    let paid = BookStandStatus::PAID.to_string();
    let result = sqlx::query(
        "UPDATE book_stands SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE reference_id = $2 AND status <> $1",
    )
    .bind(paid)
    .bind(reference_id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        trace!("🗃️ Book stand {reference_id} was not updated. It is already paid or does not exist.");
    }
    fetch(reference_id, conn).await
}
