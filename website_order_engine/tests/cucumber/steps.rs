use chrono::Utc;
use cucumber::{given, then, when};
use website_order_engine::{
    db_types::{Identity, OrderStatusType, PaymentStatus, PaymentType},
    onboarding::{ContactInfo, DraftPatch, OnboardingData, PurposeSelection},
    payments::{sign_payload, WebhookOutcome, PAYMENT_INTENT_CANCELED, PAYMENT_INTENT_FAILED, PAYMENT_INTENT_SUCCEEDED},
    OrderManagement,
    PaymentManagement,
};
use wop_common::Cents;

use crate::{
    cucumber::{OrderSystem, WebsiteOrderWorld},
    support::prepare_env::{add_payment, payment_intent_event, signed},
};

#[given("a fresh install")]
async fn fresh_database(world: &mut WebsiteOrderWorld) {
    world.system = Some(OrderSystem::new().await);
}

#[given(expr = "client '{word}' has submitted a {word} website order {word} for ${int}")]
async fn submitted_order(world: &mut WebsiteOrderWorld, client: String, purpose: String, name: String, price: i64) {
    let draft = OnboardingData::from(
        DraftPatch::default()
            .with_purpose(PurposeSelection::new(purpose, Cents::from_dollars(price)))
            .with_contact_info(ContactInfo::new(client.clone(), format!("{client}@example.com"))),
    );
    let system = world.system();
    let order = system.gateway.submit(&draft, Some(&Identity::new(client))).await.expect("Error submitting order");
    assert_eq!(order.status, OrderStatusType::Submitted);
    system.orders.insert(name, order.id);
}

#[given(expr = "order {word} has a pending {word} payment with intent {word}")]
async fn pending_payment(world: &mut WebsiteOrderWorld, name: String, payment_type: String, intent: String) {
    let payment_type = match payment_type.as_str() {
        "initial" => PaymentType::Initial,
        "final" => PaymentType::Final,
        other => panic!("Unknown payment type {other}"),
    };
    let system = world.system();
    let order_id = system.order_id(&name);
    add_payment(&system.db, &order_id, &intent, payment_type).await;
}

#[given(expr = "order {word} has been moved to {word}")]
async fn admin_moves_order(world: &mut WebsiteOrderWorld, name: String, status: String) {
    let status = status.parse::<OrderStatusType>().expect("Unknown order status");
    let system = world.system();
    let order_id = system.order_id(&name);
    let change = system.db.advance_order_status(&order_id, status).await.expect("Error moving order");
    assert!(change.advanced, "order {name} could not move from {} to {status}", change.previous_status);
}

#[when(expr = "the provider reports that payment intent {word} {word}")]
async fn provider_reports(world: &mut WebsiteOrderWorld, intent: String, what: String) {
    let event_type = match what.as_str() {
        "succeeded" => PAYMENT_INTENT_SUCCEEDED,
        "failed" => PAYMENT_INTENT_FAILED,
        "was_canceled" => PAYMENT_INTENT_CANCELED,
        other => other,
    };
    let body = payment_intent_event(&format!("evt_{intent}_{what}"), event_type, &intent);
    let header = signed(&body);
    let system = world.system();
    system.last_delivery = Some(system.processor.process(&body, Some(&header)).await);
}

#[when(expr = "a forged report arrives that payment intent {word} succeeded")]
async fn forged_report(world: &mut WebsiteOrderWorld, intent: String) {
    let body = payment_intent_event("evt_forged", PAYMENT_INTENT_SUCCEEDED, &intent);
    let header = sign_payload("whsec_not_ours", Utc::now().timestamp(), &body).expect("Error signing payload");
    let system = world.system();
    system.last_delivery = Some(system.processor.process(&body, Some(&header)).await);
}

#[then(expr = "order {word} is {word}")]
async fn order_status(world: &mut WebsiteOrderWorld, name: String, status: String) {
    let expected = status.parse::<OrderStatusType>().expect("Unknown order status");
    let system = world.system();
    let order = system.db.fetch_order(&system.order_id(&name)).await.expect("Error fetching order");
    assert_eq!(order.map(|o| o.status), Some(expected));
}

#[then(expr = "payment intent {word} is {word}")]
async fn payment_status(world: &mut WebsiteOrderWorld, intent: String, status: String) {
    let expected = match status.as_str() {
        "pending" => PaymentStatus::Pending,
        "succeeded" => PaymentStatus::Succeeded,
        "failed" => PaymentStatus::Failed,
        "canceled" => PaymentStatus::Canceled,
        other => panic!("Unknown payment status {other}"),
    };
    let system = world.system();
    let payment = system.db.fetch_payment_by_intent(&intent).await.expect("Error fetching payment");
    let payment = payment.expect("Payment record does not exist");
    assert_eq!(payment.status, expected);
    assert_eq!(payment.processed_at.is_some(), expected != PaymentStatus::Pending);
}

#[then(expr = "the delivery is {word}")]
async fn delivery_result(world: &mut WebsiteOrderWorld, result: String) {
    let delivery = world.system().last_delivery.as_ref().expect("Nothing was delivered");
    match (result.as_str(), delivery) {
        ("applied", Ok(WebhookOutcome::Applied(_))) => {},
        ("a_replay", Ok(WebhookOutcome::AlreadyProcessed(_))) => {},
        ("orphaned", Ok(WebhookOutcome::Orphaned { .. })) => {},
        ("rejected", Err(_)) => {},
        (expected, actual) => panic!("Expected the delivery to be {expected}, but got {actual:?}"),
    }
}
