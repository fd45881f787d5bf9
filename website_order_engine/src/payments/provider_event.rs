use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::{db_types::PaymentStatus, payments::WebhookError};

pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const PAYMENT_INTENT_FAILED: &str = "payment_intent.payment_failed";
pub const PAYMENT_INTENT_CANCELED: &str = "payment_intent.canceled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEventKind {
    Succeeded,
    Failed,
    Canceled,
    /// Any event type this engine does not act on.
    Unknown(String),
}

impl PaymentEventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            PAYMENT_INTENT_SUCCEEDED => Self::Succeeded,
            PAYMENT_INTENT_FAILED => Self::Failed,
            PAYMENT_INTENT_CANCELED => Self::Canceled,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The payment record status this event settles to, or `None` for unknown events.
    pub fn outcome(&self) -> Option<PaymentStatus> {
        match self {
            Self::Succeeded => Some(PaymentStatus::Succeeded),
            Self::Failed => Some(PaymentStatus::Failed),
            Self::Canceled => Some(PaymentStatus::Canceled),
            Self::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: Option<i64>,
    data: Option<RawEventData>,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: Value,
}

/// The parts of a provider event the engine cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    pub id: String,
    pub kind: PaymentEventKind,
    pub created: Option<DateTime<Utc>>,
    /// `data.object.id`. Always present for the payment intent kinds.
    pub payment_intent_id: Option<String>,
    pub payment_method: Option<String>,
}

impl PaymentEvent {
    pub fn parse(payload: &[u8]) -> Result<Self, WebhookError> {
        let raw: RawEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::MalformedPayload(format!("Invalid event JSON. {e}")))?;
        let kind = PaymentEventKind::from_type(&raw.event_type);
        let object = raw.data.map(|d| d.object).unwrap_or(Value::Null);
        let payment_intent_id = object.get("id").and_then(Value::as_str).map(str::to_string);
        if kind.outcome().is_some() && payment_intent_id.is_none() {
            return Err(WebhookError::MalformedPayload(format!(
                "Event {} ({}) does not carry a payment intent id",
                raw.id, raw.event_type
            )));
        }
        // the payment method is either an id, or an expanded object
        let payment_method = match object.get("payment_method") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Object(pm)) => pm.get("id").and_then(Value::as_str).map(str::to_string),
            _ => None,
        };
        let created = raw.created.and_then(|t| Utc.timestamp_opt(t, 0).single());
        Ok(Self { id: raw.id, kind, created, payment_intent_id, payment_method })
    }
}
