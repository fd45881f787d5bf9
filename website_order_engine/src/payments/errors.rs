use thiserror::Error;

use crate::{payments::SignatureError, traits::StoreError};

/// Reasons a webhook delivery is rejected. Every variant maps to a non-2xx response, so the provider retries
/// anything that is not a forgery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    #[error("Webhook signature verification failed. {0}")]
    SignatureInvalid(#[from] SignatureError),
    #[error("Malformed webhook payload. {0}")]
    MalformedPayload(String),
    #[error("Could not record the payment outcome. {0}")]
    PersistenceFailure(#[from] StoreError),
}
