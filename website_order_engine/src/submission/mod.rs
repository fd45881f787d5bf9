//! # Order submission
//!
//! [`OrderSubmissionGateway`] validates a completed onboarding draft for an explicit [`crate::db_types::Identity`]
//! and writes exactly one order for it.
mod compose;
mod errors;
mod fingerprint;
mod gateway;
mod validation;

pub use compose::{order_description, order_title};
pub use errors::{FieldViolation, SubmissionError};
pub use fingerprint::SubmissionFingerprint;
pub use gateway::OrderSubmissionGateway;
pub use validation::{is_valid_email, validate_draft};
