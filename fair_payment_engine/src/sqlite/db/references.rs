use log::*;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPaymentReference, PaymentReference, PaymentStatus, ReferenceStatusUpdate},
    traits::{PaymentConfirmation, PaymentGatewayError},
};

/// Inserts a new payment reference. This is not atomic. Pass `&mut *tx` as the connection argument to run it inside
/// a transaction.
pub async fn insert(
    reference: NewPaymentReference,
    conn: &mut SqliteConnection,
) -> Result<PaymentReference, PaymentGatewayError> {
    let id = reference.reference.clone();
    let result = sqlx::query_as(
        r#"
            INSERT INTO payment_references (
                reference,
                owner_kind,
                owner_key,
                amount,
                currency,
                status
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(reference.reference)
    .bind(reference.owner.kind().to_string())
    .bind(reference.owner.key().to_string())
    .bind(reference.amount.to_string())
    .bind(reference.currency)
    .bind(reference.status.to_string())
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => PaymentGatewayError::DuplicateReference(id),
        e => PaymentGatewayError::from(e),
    })?;
    debug!("🗃️ Payment reference {result:?} inserted");
    Ok(result)
}

pub async fn fetch(reference: &str, conn: &mut SqliteConnection) -> Result<Option<PaymentReference>, sqlx::Error> {
    let result = sqlx::query_as("SELECT * FROM payment_references WHERE reference = $1")
        .bind(reference)
        .fetch_optional(conn)
        .await?;
    Ok(result)
}

/// Updates the status of a payment reference. A `Success` reference is only ever "updated" to `Success` again; the
/// `WHERE` clause makes any other change a no-op, which is reported as an illegal transition.
pub(crate) async fn update_status(
    reference: &str,
    update: ReferenceStatusUpdate,
    conn: &mut SqliteConnection,
) -> Result<PaymentReference, PaymentGatewayError> {
    let status = update.status.to_string();
    let result: Option<PaymentReference> = sqlx::query_as(
        r#"
            UPDATE payment_references SET
                status = $1,
                amount = COALESCE($2, amount),
                currency = COALESCE($3, currency),
                updated_at = CURRENT_TIMESTAMP
            WHERE reference = $4 AND (status <> 'Success' OR $1 = 'Success')
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(update.amount.map(|a| a.to_string()))
    .bind(update.currency)
    .bind(reference)
    .fetch_optional(&mut *conn)
    .await?;
    match result {
        Some(r) => {
            trace!("🗃️ Payment reference {reference} is now {}", r.status);
            Ok(r)
        },
        None => match fetch(reference, conn).await? {
            Some(r) => Err(PaymentGatewayError::IllegalStatusTransition(format!(
                "Payment reference {reference} is {} and cannot be changed to {}",
                r.status, update.status
            ))),
            None => Err(PaymentGatewayError::ReferenceNotFound(reference.to_string())),
        },
    }
}

/// Moves the reference to `Success`, creating it if it does not exist, and records the amount and currency the
/// gateway reported. The owner of an existing reference is never changed.
///
/// Returns the reference and whether this call was the one that confirmed it. The first statement is a write, so
/// inside a transaction the write lock is taken before anything is read. Concurrent confirmations then queue on the
/// busy timeout instead of failing with a stale read snapshot.
pub(crate) async fn confirm_success(
    payment: &PaymentConfirmation,
    conn: &mut SqliteConnection,
) -> Result<(PaymentReference, bool), PaymentGatewayError> {
    let success = PaymentStatus::Success.to_string();
    let updated: Option<PaymentReference> = sqlx::query_as(
        r#"
            UPDATE payment_references SET
                status = $1,
                amount = $2,
                currency = $3,
                updated_at = CURRENT_TIMESTAMP
            WHERE reference = $4 AND status <> $1
            RETURNING *;
        "#,
    )
    .bind(&success)
    .bind(payment.amount.to_string())
    .bind(&payment.currency)
    .bind(&payment.reference)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(r) = updated {
        return Ok((r, true));
    }
    let inserted: Option<PaymentReference> = sqlx::query_as(
        r#"
            INSERT INTO payment_references (reference, owner_kind, owner_key, amount, currency, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (reference) DO NOTHING
            RETURNING *;
        "#,
    )
    .bind(&payment.reference)
    .bind(payment.owner.kind().to_string())
    .bind(payment.owner.key())
    .bind(payment.amount.to_string())
    .bind(&payment.currency)
    .bind(&success)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(r) = inserted {
        return Ok((r, true));
    }
    // Neither statement matched, so the reference exists and is already `Success`
    let existing = fetch(&payment.reference, conn).await?;
    existing.map(|r| (r, false)).ok_or_else(|| PaymentGatewayError::ReferenceNotFound(payment.reference.clone()))
}
