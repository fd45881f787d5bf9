//! SQLite backend for the website order engine.
//!
//! [`SqliteDatabase`] implements [`crate::traits::OrderManagement`] and [`crate::traits::PaymentManagement`].
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
