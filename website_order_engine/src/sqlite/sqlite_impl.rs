//! `SqliteDatabase` is a concrete implementation of a website order engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{new_pool, orders, payments};
use crate::{
    db_types::{ClientId, NewOrder, NewPaymentRecord, Order, OrderId, OrderStatusType, PaymentRecord, PaymentStatus},
    traits::{OrderManagement, PaymentManagement, PaymentSettlement, SettlementResult, StatusAdvance, StoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(order, &mut conn).await
    }

    async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(id, &mut conn).await
    }

    async fn fetch_orders_for_client(&self, client_id: &ClientId) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_client(client_id, &mut conn).await
    }

    async fn advance_order_status(&self, id: &OrderId, target: OrderStatusType) -> Result<StatusAdvance, StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = orders::advance_order_status(id, target, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}

impl PaymentManagement for SqliteDatabase {
    async fn insert_payment(&self, payment: NewPaymentRecord) -> Result<PaymentRecord, StoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::insert_payment(payment, &mut conn).await
    }

    async fn fetch_payment_by_intent(&self, intent_id: &str) -> Result<Option<PaymentRecord>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payment_by_intent(intent_id, &mut conn).await
    }

    async fn fetch_payments_for_order(&self, order_id: &OrderId) -> Result<Vec<PaymentRecord>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payments_for_order(order_id, &mut conn).await
    }

    async fn settle_payment(&self, settlement: PaymentSettlement) -> Result<SettlementResult, StoreError> {
        let intent_id = settlement.stripe_payment_intent_id.clone();
        let mut tx = self.pool.begin().await?;
        // write before reading, so the transaction takes the write lock before it holds a read snapshot
        let payment_updated = if settlement.outcome.is_terminal() {
            payments::settle_if_pending(&settlement, &mut tx).await?
        } else {
            false
        };
        let payment = payments::fetch_payment_by_intent(&intent_id, &mut tx)
            .await?
            .ok_or_else(|| StoreError::PaymentNotFound(intent_id.clone()))?;
        if !payment_updated {
            debug!("🗃️ Payment {intent_id} is already {}. Ignoring the {} outcome.", payment.status, settlement.outcome);
        }
        let order_change = if payment.status == PaymentStatus::Succeeded {
            let target = payment.payment_type.target_order_status();
            let change = orders::advance_order_status(&payment.order_id, target, &mut tx).await?;
            Some(change)
        } else {
            None
        };
        tx.commit().await?;
        info!(
            "🗃️ Payment {intent_id} for order {} settled as {}. Order advanced: {}",
            payment.order_id,
            payment.status,
            order_change.as_ref().map(|c| c.advanced).unwrap_or(false)
        );
        Ok(SettlementResult { payment, payment_updated, order_change })
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date for {}", self.url);
        Ok(())
    }
}
