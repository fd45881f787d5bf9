use actix_web::{
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{DateTime, Utc};
use log::debug;
use website_order_engine::{
    db_types::{ClientId, Order, OrderId, OrderStatusType, PaymentRecord, PaymentStatus, PaymentType},
    events::EventProducers,
    payments::{sign_payload, PaymentEventProcessor, SignatureVerifier},
    traits::{SettlementResult, StatusAdvance},
};
use wop_common::{Cents, Secret};

use super::mocks::MockPaymentManager;
use crate::routes::{health, payment_webhook_preflight, PaymentWebhookRoute};

// Test-only signing secret. DO NOT re-use it anywhere.
pub const WEBHOOK_SECRET: &str = "whsec_endpoint_tests_only";

pub fn configure_webhook(db: MockPaymentManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let verifier = SignatureVerifier::new(Secret::from(WEBHOOK_SECRET));
        let processor = PaymentEventProcessor::new(db, verifier, EventProducers::default());
        cfg.app_data(web::Data::new(processor))
            .service(health)
            .service(payment_webhook_preflight)
            .service(web::scope("/webhook").service(PaymentWebhookRoute::<MockPaymentManager>::new()));
    }
}

pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, HeaderMap, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let headers = res.headers().clone();
    let body = test::read_body(res).await;
    (status, headers, String::from_utf8_lossy(&body).into_owned())
}

/// A signed webhook delivery, as the provider would send it.
pub fn webhook_delivery(body: Vec<u8>) -> TestRequest {
    let signature = sign_payload(WEBHOOK_SECRET, Utc::now().timestamp(), &body).expect("Error signing payload");
    TestRequest::post()
        .uri("/webhook/stripe")
        .insert_header(("Stripe-Signature", signature))
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body)
}

pub fn payment_intent_event(event_id: &str, event_type: &str, intent_id: &str) -> Vec<u8> {
    serde_json::json!({
        "id": event_id,
        "object": "event",
        "type": event_type,
        "created": Utc::now().timestamp(),
        "data": {
            "object": {
                "id": intent_id,
                "object": "payment_intent",
                "amount": 92500,
                "currency": "usd",
                "payment_method": "pm_card_visa"
            }
        }
    })
    .to_string()
    .into_bytes()
}

fn sample_order(status: OrderStatusType, at: DateTime<Utc>) -> Order {
    Order {
        id: OrderId::from("0d9e8f7a-order".to_string()),
        client_id: ClientId("client_jane".into()),
        title: "Business website".into(),
        description: "Business website with a blog".into(),
        total_amount: Cents::from(185_000),
        status,
        purpose_type: "business".into(),
        contact_email: "jane@example.com".into(),
        contact_name: Some("Jane".into()),
        created_at: at,
        updated_at: at,
    }
}

/// The result of settling an initial payment for the first time: the record is updated and the order advanced.
pub fn first_settlement(intent_id: &str, outcome: PaymentStatus) -> SettlementResult {
    let now = Utc::now();
    let payment = PaymentRecord {
        id: 1,
        order_id: OrderId::from("0d9e8f7a-order".to_string()),
        stripe_payment_intent_id: intent_id.to_string(),
        payment_type: PaymentType::Initial,
        status: outcome,
        amount: Cents::from(92_500),
        payment_method: Some("pm_card_visa".into()),
        processed_at: Some(now),
        created_at: now,
        updated_at: now,
    };
    let order_change = (outcome == PaymentStatus::Succeeded).then(|| StatusAdvance {
        order: sample_order(OrderStatusType::InProgress, now),
        previous_status: OrderStatusType::Submitted,
        advanced: true,
    });
    SettlementResult { payment, payment_updated: true, order_change }
}

/// The same settlement delivered again: nothing changes.
pub fn replayed_settlement(intent_id: &str) -> SettlementResult {
    let mut result = first_settlement(intent_id, PaymentStatus::Succeeded);
    result.payment_updated = false;
    if let Some(change) = result.order_change.as_mut() {
        change.previous_status = OrderStatusType::InProgress;
        change.advanced = false;
    }
    result
}
