use crate::{
    db_types::{NewPaymentRecord, OrderId, PaymentRecord},
    traits::{PaymentSettlement, SettlementResult, StoreError},
};

/// Persistence of payment records, and application of provider payment outcomes.
#[allow(async_fn_in_trait)]
pub trait PaymentManagement {
    /// Creates a `Pending` payment record for an order. There can only be one record per payment intent id;
    /// a second insert returns `StoreError::PaymentAlreadyExists`.
    async fn insert_payment(&self, payment: NewPaymentRecord) -> Result<PaymentRecord, StoreError>;

    /// Fetches the payment record for a provider payment intent id.
    async fn fetch_payment_by_intent(&self, intent_id: &str) -> Result<Option<PaymentRecord>, StoreError>;

    async fn fetch_payments_for_order(&self, order_id: &OrderId) -> Result<Vec<PaymentRecord>, StoreError>;

    /// In a single atomic transaction:
    /// * moves the payment record from `Pending` to the settlement outcome and stamps `processed_at`. A record that
    ///   is already terminal is left untouched, including its `processed_at`.
    /// * if the record is `Succeeded` (now or from an earlier delivery), advances the owning order forward-only to
    ///   the target status for the payment type.
    ///
    /// Returns `StoreError::PaymentNotFound` if no record exists for the intent.
    async fn settle_payment(&self, settlement: PaymentSettlement) -> Result<SettlementResult, StoreError>;
}
