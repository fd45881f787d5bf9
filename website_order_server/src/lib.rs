//! # Website order server
//! This crate hosts the HTTP server for the website order platform. It is responsible for:
//! * Receiving payment provider webhook deliveries, verifying their signatures against the raw body and handing them
//!   to the engine's [`PaymentEventProcessor`](website_order_engine::payments::PaymentEventProcessor).
//! * Writing an audit trail of order and payment transitions from the engine's event hooks.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /webhook/stripe`: The payment provider webhook. Subject to the provider IP whitelist, if one is set.
//! * `OPTIONS /webhook/stripe`: CORS preflight for the webhook.

pub mod cli;
pub mod config;
pub mod errors;

pub mod helpers;
pub mod notifications;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
