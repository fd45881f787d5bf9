use thiserror::Error;

use crate::{
    db_types::{ClientId, NewOrder, Order, OrderId, OrderStatusType},
    traits::StatusAdvance,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Cannot insert order, since it already exists with id {0}")]
    OrderAlreadyExists(OrderId),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Cannot insert payment, since one already exists for payment intent {0}")]
    PaymentAlreadyExists(String),
    #[error("The requested payment does not exist for payment intent {0}")]
    PaymentNotFound(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

/// Persistence of orders.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Writes a new order with status `Submitted` and returns the stored record.
    ///
    /// This is a plain insert. It is NOT idempotent, and callers must not retry it blindly. If an order with the same
    /// id already exists, `StoreError::OrderAlreadyExists` is returned.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Fetches the order with the given id, or `None` if it does not exist.
    async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Fetches all orders for a client, oldest first.
    async fn fetch_orders_for_client(&self, client_id: &ClientId) -> Result<Vec<Order>, StoreError>;

    /// Moves the order to `target` if, and only if, that is a forward move from its current status.
    ///
    /// The check and the write happen in one conditional statement, so concurrent callers can never move an order
    /// backwards.
    async fn advance_order_status(&self, id: &OrderId, target: OrderStatusType) -> Result<StatusAdvance, StoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
