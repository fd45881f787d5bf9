//! # Payment webhooks
//!
//! The payment provider reports the outcome of each payment intent by calling a webhook. [`PaymentEventProcessor`]
//! handles those calls:
//!
//! 1. The signature header is checked against the raw, unparsed body ([`SignatureVerifier`]). Anything that fails
//!    is rejected before the body is even parsed.
//! 2. The body is parsed into a [`PaymentEvent`]. Event types other than the three payment intent outcomes are
//!    acknowledged and ignored.
//! 3. The matching payment record is settled and, for a successful payment, its order advanced. Both happen in one
//!    transaction with conditional updates, so duplicated and reordered deliveries are harmless.
//!
//! A delivery for an unknown payment intent is logged and acknowledged. Storage errors are returned so the HTTP
//! layer answers with a failure and the provider redelivers.
mod errors;
mod processor;
mod provider_event;
mod signature;

pub use errors::WebhookError;
pub use processor::{PaymentEventProcessor, WebhookOutcome};
pub use provider_event::{
    PaymentEvent,
    PaymentEventKind,
    PAYMENT_INTENT_CANCELED,
    PAYMENT_INTENT_FAILED,
    PAYMENT_INTENT_SUCCEEDED,
};
pub use signature::{
    sign_payload,
    SignatureError,
    SignatureHeader,
    SignatureVerifier,
    DEFAULT_TOLERANCE,
    SIGNATURE_HEADER,
};
