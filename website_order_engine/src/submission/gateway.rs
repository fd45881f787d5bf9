use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use log::*;

use crate::{
    db_types::{Identity, NewOrder, Order, OrderId},
    events::{EventProducers, OrderSubmittedEvent},
    onboarding::{CompletionHandler, OnboardingCompletion, OnboardingData},
    pricing::PriceSchedule,
    submission::{
        compose::{order_description, order_title},
        validation::validate_draft,
        SubmissionError,
        SubmissionFingerprint,
    },
    traits::OrderManagement,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Seen {
    InFlight,
    Accepted(OrderId),
}

type FingerprintLedger = Mutex<HashMap<SubmissionFingerprint, Seen>>;

/// Holds a fingerprint as in-flight. Unless the write is committed, the fingerprint is released on drop, so a
/// failed or abandoned submission can be retried.
struct Reservation<'a> {
    ledger: &'a FingerprintLedger,
    fingerprint: SubmissionFingerprint,
    committed: bool,
}

impl Reservation<'_> {
    fn commit(mut self, order_id: OrderId) {
        lock(self.ledger).insert(self.fingerprint.clone(), Seen::Accepted(order_id));
        self.committed = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            lock(self.ledger).remove(&self.fingerprint);
            debug!("📝️ Released submission fingerprint {}", self.fingerprint);
        }
    }
}

fn lock(ledger: &FingerprintLedger) -> MutexGuard<'_, HashMap<SubmissionFingerprint, Seen>> {
    ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Turns a completed onboarding draft into exactly one persisted order.
///
/// The gateway keeps a per-session record of submission fingerprints, and rejects a second submission of the same
/// logical order with [`SubmissionError::DuplicateSubmission`]. This guard lives in memory only. It is not a durable
/// uniqueness constraint.
///
/// The gateway never retries a failed write itself. Persistence errors are handed back to the caller unchanged.
pub struct OrderSubmissionGateway<B> {
    db: B,
    producers: EventProducers,
    schedule: PriceSchedule,
    fingerprints: FingerprintLedger,
}

impl<B> OrderSubmissionGateway<B>
where B: OrderManagement
{
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, schedule: PriceSchedule::default(), fingerprints: Mutex::new(HashMap::new()) }
    }

    pub fn with_schedule(mut self, schedule: PriceSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Validates the draft and writes a new order with status `submitted` for the given identity.
    ///
    /// `OrderSubmittedEvent` is published only after the order has been written.
    pub async fn submit(&self, data: &OnboardingData, identity: Option<&Identity>) -> Result<Order, SubmissionError> {
        let identity = identity.ok_or_else(|| {
            warn!("📝️ Order submission attempted without a signed-in client");
            SubmissionError::Unauthenticated
        })?;
        let total = validate_draft(data, &self.schedule).map_err(|violations| {
            info!("📝️ Order submission for {} failed validation with {} problem(s)", identity.id, violations.len());
            SubmissionError::ValidationError(violations)
        })?;
        let (purpose_type, contact) = match (&data.purpose, &data.contact_info) {
            (Some(purpose), Some(contact)) => (purpose.purpose_type.trim().to_string(), contact),
            // validation guarantees both slices are present
            _ => return Err(SubmissionError::ValidationError(vec![])),
        };
        let fingerprint = SubmissionFingerprint::new(&identity.id, &purpose_type, &contact.email, &contact.name);
        let reservation = self.reserve(fingerprint)?;

        let name = contact.name.trim();
        let contact_name = (!name.is_empty()).then(|| name.to_string());
        let order = NewOrder::new(identity.id.clone(), order_title(data), total)
            .with_description(order_description(data, &self.schedule, total))
            .with_purpose_type(purpose_type)
            .with_contact(contact.email.trim().to_string(), contact_name);
        let order = self.db.insert_order(order).await.map_err(|e| {
            error!("📝️ Could not save the order for {}: {e}", identity.id);
            SubmissionError::PersistenceFailure(e)
        })?;
        reservation.commit(order.id.clone());
        info!("📝️ Order {} ({}) submitted by {} for {}", order.id, order.title, order.client_id, order.total_amount);
        self.producers.publish_order_submitted(OrderSubmittedEvent::new(order.clone())).await;
        Ok(order)
    }

    fn reserve(&self, fingerprint: SubmissionFingerprint) -> Result<Reservation<'_>, SubmissionError> {
        let mut ledger = lock(&self.fingerprints);
        if let Some(seen) = ledger.get(&fingerprint) {
            match seen {
                Seen::InFlight => warn!("📝️ Submission {fingerprint} is already in flight"),
                Seen::Accepted(id) => warn!("📝️ Submission {fingerprint} was already accepted as order {id}"),
            }
            return Err(SubmissionError::DuplicateSubmission);
        }
        ledger.insert(fingerprint.clone(), Seen::InFlight);
        trace!("📝️ Reserved submission fingerprint {fingerprint}");
        Ok(Reservation { ledger: &self.fingerprints, fingerprint, committed: false })
    }
}

impl<B> CompletionHandler for OrderSubmissionGateway<B>
where B: OrderManagement
{
    async fn on_complete(&self, completion: &OnboardingCompletion) -> Result<Order, SubmissionError> {
        self.submit(&completion.data, completion.identity.as_ref()).await
    }
}
