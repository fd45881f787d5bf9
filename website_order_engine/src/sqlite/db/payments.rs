use chrono::Utc;
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPaymentRecord, OrderId, PaymentRecord, PaymentStatus},
    traits::{PaymentSettlement, StoreError},
};

const PAYMENT_COLUMNS: &str = "id, order_id, stripe_payment_intent_id, payment_type, status, amount, payment_method, \
                               processed_at, created_at, updated_at";

pub async fn insert_payment(
    payment: NewPaymentRecord,
    conn: &mut SqliteConnection,
) -> Result<PaymentRecord, StoreError> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
            INSERT INTO payments (order_id, stripe_payment_intent_id, payment_type, status, amount, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?);
        "#,
    )
    .bind(&payment.order_id)
    .bind(&payment.stripe_payment_intent_id)
    .bind(payment.payment_type)
    .bind(PaymentStatus::Pending)
    .bind(payment.amount)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await;
    match result {
        Ok(_) => {},
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(StoreError::PaymentAlreadyExists(payment.stripe_payment_intent_id));
        },
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
            return Err(StoreError::OrderNotFound(payment.order_id));
        },
        Err(e) => return Err(e.into()),
    }
    debug!(
        "🗃️ {} payment {} recorded for order {}",
        payment.payment_type, payment.stripe_payment_intent_id, payment.order_id
    );
    fetch_payment_by_intent(&payment.stripe_payment_intent_id, conn)
        .await?
        .ok_or(StoreError::PaymentNotFound(payment.stripe_payment_intent_id))
}

pub async fn fetch_payment_by_intent(
    intent_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentRecord>, StoreError> {
    let payment = sqlx::query_as::<_, PaymentRecord>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE stripe_payment_intent_id = ?"
    ))
    .bind(intent_id)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

pub async fn fetch_payments_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentRecord>, StoreError> {
    let payments =
        sqlx::query_as::<_, PaymentRecord>(&format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = ? ORDER BY id ASC"))
            .bind(order_id)
            .fetch_all(conn)
            .await?;
    Ok(payments)
}

/// Applies the settlement outcome if, and only if, the record is still `Pending`. Returns true if a row was changed.
pub async fn settle_if_pending(settlement: &PaymentSettlement, conn: &mut SqliteConnection) -> Result<bool, StoreError> {
    let result = sqlx::query(
        r#"
            UPDATE payments SET
                status = ?,
                processed_at = ?,
                payment_method = COALESCE(?, payment_method),
                updated_at = ?
            WHERE stripe_payment_intent_id = ? AND status = ?;
        "#,
    )
    .bind(settlement.outcome)
    .bind(settlement.processed_at)
    .bind(&settlement.payment_method)
    .bind(Utc::now())
    .bind(&settlement.stripe_payment_intent_id)
    .bind(PaymentStatus::Pending)
    .execute(conn)
    .await?;
    let updated = result.rows_affected() > 0;
    trace!(
        "🗃️ Settling payment {} as {}: {} row(s) changed",
        settlement.stripe_payment_intent_id,
        settlement.outcome,
        result.rows_affected()
    );
    Ok(updated)
}
