use mockall::mock;
use website_order_engine::{
    db_types::{NewPaymentRecord, OrderId, PaymentRecord},
    traits::{PaymentManagement, PaymentSettlement, SettlementResult, StoreError},
};

mock! {
    pub PaymentManager {}
    impl PaymentManagement for PaymentManager {
        async fn insert_payment(&self, payment: NewPaymentRecord) -> Result<PaymentRecord, StoreError>;
        async fn fetch_payment_by_intent(&self, intent_id: &str) -> Result<Option<PaymentRecord>, StoreError>;
        async fn fetch_payments_for_order(&self, order_id: &OrderId) -> Result<Vec<PaymentRecord>, StoreError>;
        async fn settle_payment(&self, settlement: PaymentSettlement) -> Result<SettlementResult, StoreError>;
    }
}
