use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{ClientId, NewOrder, Order, OrderId, OrderStatusType},
    traits::{StatusAdvance, StoreError},
};

const ORDER_COLUMNS: &str = "id, client_id, title, description, total_amount, status, purpose_type, contact_email, \
                             contact_name, created_at, updated_at";

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, StoreError> {
    let result = sqlx::query(
        r#"
            INSERT INTO orders (
                id,
                client_id,
                title,
                description,
                total_amount,
                status,
                purpose_type,
                contact_email,
                contact_name,
                created_at,
                updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?);
        "#,
    )
    .bind(&order.id)
    .bind(&order.client_id)
    .bind(&order.title)
    .bind(&order.description)
    .bind(order.total_amount)
    .bind(OrderStatusType::Submitted)
    .bind(&order.purpose_type)
    .bind(&order.contact_email)
    .bind(&order.contact_name)
    .bind(order.created_at)
    .bind(order.created_at)
    .execute(&mut *conn)
    .await;
    match result {
        Ok(_) => {},
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(StoreError::OrderAlreadyExists(order.id));
        },
        Err(e) => return Err(e.into()),
    }
    debug!("🗃️ Order {} has been saved in the DB for client {}", order.id, order.client_id);
    fetch_order(&order.id, conn).await?.ok_or(StoreError::OrderNotFound(order.id))
}

pub async fn fetch_order(id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, StoreError> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Fetches all orders for the client, ordered by `created_at` in ascending order
pub async fn fetch_orders_for_client(
    client_id: &ClientId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, StoreError> {
    let orders =
        sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE client_id = ? ORDER BY created_at ASC"))
            .bind(client_id)
            .fetch_all(conn)
            .await?;
    trace!("🗃️ {} orders found for client {client_id}", orders.len());
    Ok(orders)
}

/// Moves the order to `target`, but only if its current status is one of the lifecycle predecessors of `target`.
/// The guard lives in the `WHERE` clause, so the update is safe against concurrent and replayed calls.
pub async fn advance_order_status(
    id: &OrderId,
    target: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<StatusAdvance, StoreError> {
    let current = fetch_order(id, conn).await?.ok_or_else(|| StoreError::OrderNotFound(id.clone()))?;
    let predecessors = OrderStatusType::predecessors_of(target);
    let advanced = if predecessors.is_empty() {
        false
    } else {
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE orders SET status = ");
        builder.push_bind(target);
        builder.push(", updated_at = ");
        builder.push_bind(Utc::now());
        builder.push(" WHERE id = ");
        builder.push_bind(id.clone());
        builder.push(" AND status IN (");
        let mut statuses = builder.separated(", ");
        for status in predecessors {
            statuses.push_bind(status);
        }
        statuses.push_unseparated(")");
        trace!("🗃️ Executing query: {}", builder.sql());
        let result = builder.build().execute(&mut *conn).await?;
        result.rows_affected() > 0
    };
    let order = fetch_order(id, conn).await?.ok_or_else(|| StoreError::OrderNotFound(id.clone()))?;
    if advanced {
        debug!("🗃️ Order {id} advanced from {} to {target}", current.status);
    } else {
        debug!("🗃️ Order {id} is {} and cannot move forward to {target}. No change made.", current.status);
    }
    Ok(StatusAdvance { order, previous_status: current.status, advanced })
}
