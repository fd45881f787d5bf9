//! #  Storage contracts.
//!
//! This module defines the behaviour a storage backend must expose to support the website order engine. The
//! engine never talks to a database directly; it goes through these traits so the core logic can run against
//! SQLite, another backend, or a mock.
//!
//! * [`OrderManagement`] persists orders and moves them forward through their lifecycle.
//! * [`PaymentManagement`] persists payment records and applies provider payment outcomes to them (and their
//!   owning order) atomically.
//!
//! Every mutating method that can be reached by the payment webhook MUST be idempotent and conditional: the same
//! provider event can be delivered more than once, out of order, or concurrently with another delivery.
mod data_objects;
mod order_management;
mod payment_management;

pub use data_objects::{PaymentSettlement, SettlementResult, StatusAdvance};
pub use order_management::{OrderManagement, StoreError};
pub use payment_management::PaymentManagement;
