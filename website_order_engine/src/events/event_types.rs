use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType, PaymentRecord};

/// Published by the submission gateway once an order has been durably written. Never published before the write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmittedEvent {
    pub order: Order,
}

impl OrderSubmittedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Published when a payment outcome moved an order forward in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub order: Order,
    pub old_status: OrderStatusType,
}

impl OrderStatusChangedEvent {
    pub fn new(order: Order, old_status: OrderStatusType) -> Self {
        Self { order, old_status }
    }

    pub fn new_status(&self) -> OrderStatusType {
        self.order.status
    }
}

/// Published when a payment record moved from pending to a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSettledEvent {
    pub payment: PaymentRecord,
    pub settled_at: DateTime<Utc>,
}

impl PaymentSettledEvent {
    pub fn new(payment: PaymentRecord) -> Self {
        let settled_at = payment.processed_at.unwrap_or(payment.updated_at);
        Self { payment, settled_at }
    }
}
