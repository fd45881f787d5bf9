use std::fmt::Display;

use chrono::Utc;
use log::*;

use crate::{
    events::{EventProducers, OrderStatusChangedEvent, PaymentSettledEvent},
    payments::{PaymentEvent, PaymentEventKind, SignatureVerifier, WebhookError},
    traits::{PaymentManagement, PaymentSettlement, SettlementResult, StoreError},
};

/// What happened to an authentic webhook delivery. Every variant is acknowledged to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The payment record was settled, and possibly its order advanced.
    Applied(SettlementResult),
    /// The payment record was already terminal and the order already at or past its target. Nothing was written.
    AlreadyProcessed(SettlementResult),
    /// No payment record exists for the intent. Redelivery would not help, so the event is dropped.
    Orphaned { event_id: String, payment_intent_id: String },
    /// An event type the engine does not act on.
    Ignored { event_id: String, event_type: String },
}

impl Display for WebhookOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookOutcome::Applied(r) => {
                write!(f, "payment {} settled as {}", r.payment.stripe_payment_intent_id, r.payment.status)
            },
            WebhookOutcome::AlreadyProcessed(r) => {
                write!(f, "payment {} was already {}", r.payment.stripe_payment_intent_id, r.payment.status)
            },
            WebhookOutcome::Orphaned { event_id, payment_intent_id } => {
                write!(f, "event {event_id} refers to unknown payment intent {payment_intent_id}")
            },
            WebhookOutcome::Ignored { event_id, event_type } => write!(f, "event {event_id} ({event_type}) ignored"),
        }
    }
}

/// Handles payment provider webhook deliveries.
///
/// Deliveries can be duplicated, reordered or concurrent. The processor never writes blindly: settlement and the
/// order advance run as conditional updates in one transaction (see [`PaymentManagement::settle_payment`]), so
/// replaying an event leaves the stored state exactly as it was.
pub struct PaymentEventProcessor<B> {
    db: B,
    verifier: SignatureVerifier,
    producers: EventProducers,
}

impl<B> PaymentEventProcessor<B>
where B: PaymentManagement
{
    pub fn new(db: B, verifier: SignatureVerifier, producers: EventProducers) -> Self {
        Self { db, verifier, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Verifies, parses and applies a raw webhook delivery.
    pub async fn process(&self, payload: &[u8], signature: Option<&str>) -> Result<WebhookOutcome, WebhookError> {
        self.process_at(payload, signature, Utc::now().timestamp()).await
    }

    /// As [`Self::process`], with an explicit clock (unix seconds) for the signature tolerance check.
    pub async fn process_at(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: i64,
    ) -> Result<WebhookOutcome, WebhookError> {
        if let Err(e) = self.verifier.verify_at(payload, signature, now) {
            warn!("💳️ Rejected a webhook delivery with a bad signature. {e}");
            return Err(e.into());
        }
        let event = PaymentEvent::parse(payload)?;
        debug!("💳️ Received webhook event {} ({:?})", event.id, event.kind);
        self.apply_event(event).await
    }

    /// Applies an already authenticated event.
    pub async fn apply_event(&self, event: PaymentEvent) -> Result<WebhookOutcome, WebhookError> {
        let PaymentEvent { id: event_id, kind, payment_intent_id, payment_method, .. } = event;
        let Some(outcome) = kind.outcome() else {
            let event_type = match kind {
                PaymentEventKind::Unknown(event_type) => event_type,
                other => format!("{other:?}"),
            };
            info!("💳️ Ignoring webhook event {event_id} of type {event_type}");
            return Ok(WebhookOutcome::Ignored { event_id, event_type });
        };
        let intent_id = payment_intent_id.ok_or_else(|| {
            WebhookError::MalformedPayload(format!("Event {event_id} does not carry a payment intent id"))
        })?;
        let settlement = PaymentSettlement::new(&intent_id, outcome, Utc::now()).with_payment_method(payment_method);
        let result = match self.db.settle_payment(settlement).await {
            Ok(result) => result,
            Err(StoreError::PaymentNotFound(_)) => {
                warn!(
                    "💳️ Event {event_id} refers to payment intent {intent_id}, which has no payment record. Dropping \
                     it."
                );
                return Ok(WebhookOutcome::Orphaned { event_id, payment_intent_id: intent_id });
            },
            Err(e) => {
                error!("💳️ Could not apply event {event_id} to payment intent {intent_id}. {e}");
                return Err(e.into());
            },
        };
        if result.is_noop() {
            info!("💳️ Event {event_id} was a replay. Payment {intent_id} is already {}", result.payment.status);
            return Ok(WebhookOutcome::AlreadyProcessed(result));
        }
        self.notify(&result).await;
        Ok(WebhookOutcome::Applied(result))
    }

    async fn notify(&self, result: &SettlementResult) {
        if result.payment_updated {
            self.producers.publish_payment_settled(PaymentSettledEvent::new(result.payment.clone())).await;
        }
        if let Some(change) = result.order_change.as_ref().filter(|c| c.advanced) {
            info!(
                "💳️ Order {} moved from {} to {} after payment {}",
                change.order.id, change.previous_status, change.order.status, result.payment.stripe_payment_intent_id
            );
            let event = OrderStatusChangedEvent::new(change.order.clone(), change.previous_status);
            self.producers.publish_order_status_changed(event).await;
        }
    }
}
