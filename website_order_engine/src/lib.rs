//! Website Order Engine
//!
//! The website order engine holds the business logic behind the "order a website" flow: from the first onboarding
//! question, through the persisted order, to the payment provider telling us a payment went through.
//!
//! The library is divided into these sections:
//! 1. [`mod@pricing`]. A pure function from a (possibly partial) draft to a price.
//! 2. [`mod@onboarding`]. The multi-step wizard that accumulates the order draft and decides which terminal screen
//!    to show.
//! 3. [`mod@submission`]. The gateway that turns a completed draft into exactly one persisted order.
//! 4. [`mod@payments`]. The payment webhook processor, which verifies provider signatures and applies payment
//!    outcomes to payment records and their orders, idempotently and forward-only.
//! 5. Storage. The engine only talks to storage through the traits in [`mod@traits`]. SQLite is the supported
//!    backend ([`SqliteDatabase`]). The data types used in the database are defined in [`mod@db_types`].
//!
//! The engine also emits events (order submitted, payment settled, order status changed) that can be subscribed to
//! through [`events::EventHooks`].
pub mod db_types;
pub mod events;
pub mod onboarding;
pub mod payments;
pub mod pricing;
pub mod submission;
pub mod traits;

#[cfg(test)]
mod test_utils;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{OrderManagement, PaymentManagement, StoreError};
