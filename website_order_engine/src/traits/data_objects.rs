use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType, PaymentRecord, PaymentStatus};

/// A terminal payment outcome reported by the payment provider, to be applied to the matching payment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSettlement {
    pub stripe_payment_intent_id: String,
    /// One of the terminal statuses. Settling to `Pending` is a no-op.
    pub outcome: PaymentStatus,
    pub processed_at: DateTime<Utc>,
    pub payment_method: Option<String>,
}

impl PaymentSettlement {
    pub fn new(intent_id: &str, outcome: PaymentStatus, processed_at: DateTime<Utc>) -> Self {
        Self { stripe_payment_intent_id: intent_id.to_string(), outcome, processed_at, payment_method: None }
    }

    pub fn with_payment_method(mut self, payment_method: Option<String>) -> Self {
        self.payment_method = payment_method;
        self
    }
}

/// The result of a conditional, forward-only order status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAdvance {
    /// The order as stored after the attempt.
    pub order: Order,
    pub previous_status: OrderStatusType,
    /// False if the order was already at or past the target (or cancelled), so nothing was written.
    pub advanced: bool,
}

/// What [`PaymentManagement::settle_payment`] changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    /// The payment record as stored after the attempt.
    pub payment: PaymentRecord,
    /// False if the record was already terminal, i.e. this is a replay or a late, conflicting event.
    pub payment_updated: bool,
    /// Present when the payment has succeeded and its owning order was considered for an advance.
    pub order_change: Option<StatusAdvance>,
}

impl SettlementResult {
    pub fn order_advanced(&self) -> bool {
        self.order_change.as_ref().map(|c| c.advanced).unwrap_or(false)
    }

    pub fn is_noop(&self) -> bool {
        !self.payment_updated && !self.order_advanced()
    }
}
