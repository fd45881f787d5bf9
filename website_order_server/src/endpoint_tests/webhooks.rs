use actix_web::{http::StatusCode, test::TestRequest};
use chrono::Utc;
use website_order_engine::{
    db_types::PaymentStatus,
    payments::{sign_payload, PAYMENT_INTENT_CANCELED, PAYMENT_INTENT_FAILED, PAYMENT_INTENT_SUCCEEDED},
    traits::StoreError,
};

use super::{
    helpers::{
        configure_webhook,
        first_settlement,
        payment_intent_event,
        replayed_settlement,
        send_request,
        webhook_delivery,
        WEBHOOK_SECRET,
    },
    mocks::MockPaymentManager,
};

const RECEIVED: &str = r#"{"received":true}"#;

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init();
    let req = TestRequest::get().uri("/health");
    let (status, _, body) = send_request(req, configure_webhook(MockPaymentManager::new())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn succeeded_payment_is_applied_and_acknowledged() {
    let _ = env_logger::try_init();
    let mut db = MockPaymentManager::new();
    db.expect_settle_payment()
        .withf(|s| {
            s.stripe_payment_intent_id == "pi_100" &&
                s.outcome == PaymentStatus::Succeeded &&
                s.payment_method.as_deref() == Some("pm_card_visa")
        })
        .times(1)
        .returning(|s| Ok(first_settlement(&s.stripe_payment_intent_id, s.outcome)));
    let body = payment_intent_event("evt_100", PAYMENT_INTENT_SUCCEEDED, "pi_100");
    let (status, _, body) = send_request(webhook_delivery(body), configure_webhook(db)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, RECEIVED);
}

#[actix_web::test]
async fn failed_and_canceled_payments_are_settled() {
    let _ = env_logger::try_init();
    for (event_type, outcome) in
        [(PAYMENT_INTENT_FAILED, PaymentStatus::Failed), (PAYMENT_INTENT_CANCELED, PaymentStatus::Canceled)]
    {
        let mut db = MockPaymentManager::new();
        db.expect_settle_payment()
            .withf(move |s| s.stripe_payment_intent_id == "pi_200" && s.outcome == outcome)
            .times(1)
            .returning(|s| Ok(first_settlement(&s.stripe_payment_intent_id, s.outcome)));
        let body = payment_intent_event("evt_200", event_type, "pi_200");
        let (status, _, body) = send_request(webhook_delivery(body), configure_webhook(db)).await;
        assert_eq!(status, StatusCode::OK, "{event_type}");
        assert_eq!(body, RECEIVED);
    }
}

#[actix_web::test]
async fn replayed_delivery_is_acknowledged() {
    let _ = env_logger::try_init();
    let mut db = MockPaymentManager::new();
    db.expect_settle_payment().times(1).returning(|s| Ok(replayed_settlement(&s.stripe_payment_intent_id)));
    let body = payment_intent_event("evt_300", PAYMENT_INTENT_SUCCEEDED, "pi_300");
    let (status, _, body) = send_request(webhook_delivery(body), configure_webhook(db)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, RECEIVED);
}

#[actix_web::test]
async fn orphaned_intent_is_acknowledged() {
    let _ = env_logger::try_init();
    let mut db = MockPaymentManager::new();
    db.expect_settle_payment()
        .times(1)
        .returning(|s| Err(StoreError::PaymentNotFound(s.stripe_payment_intent_id.clone())));
    let body = payment_intent_event("evt_400", PAYMENT_INTENT_SUCCEEDED, "pi_unknown");
    let (status, _, body) = send_request(webhook_delivery(body), configure_webhook(db)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, RECEIVED);
}

#[actix_web::test]
async fn unknown_event_types_are_ignored() {
    let _ = env_logger::try_init();
    let mut db = MockPaymentManager::new();
    db.expect_settle_payment().never();
    let body = payment_intent_event("evt_500", "payment_intent.created", "pi_500");
    let (status, _, body) = send_request(webhook_delivery(body), configure_webhook(db)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, RECEIVED);
}

#[actix_web::test]
async fn storage_failures_ask_for_redelivery() {
    let _ = env_logger::try_init();
    let mut db = MockPaymentManager::new();
    db.expect_settle_payment().times(1).returning(|_| Err(StoreError::DatabaseError("database is locked".into())));
    let body = payment_intent_event("evt_600", PAYMENT_INTENT_SUCCEEDED, "pi_600");
    let (status, _, body) = send_request(webhook_delivery(body), configure_webhook(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("database is locked"), "{body}");
}

#[actix_web::test]
async fn forged_signature_is_rejected() {
    let _ = env_logger::try_init();
    let mut db = MockPaymentManager::new();
    db.expect_settle_payment().never();
    let body = payment_intent_event("evt_700", PAYMENT_INTENT_SUCCEEDED, "pi_700");
    let signature = sign_payload("whsec_somebody_else", Utc::now().timestamp(), &body).unwrap();
    let req =
        TestRequest::post().uri("/webhook/stripe").insert_header(("Stripe-Signature", signature)).set_payload(body);
    let (status, _, body) = send_request(req, configure_webhook(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("signature"), "{body}");
}

#[actix_web::test]
async fn tampered_body_is_rejected() {
    let _ = env_logger::try_init();
    let mut db = MockPaymentManager::new();
    db.expect_settle_payment().never();
    let body = payment_intent_event("evt_710", PAYMENT_INTENT_FAILED, "pi_710");
    let signature = sign_payload(WEBHOOK_SECRET, Utc::now().timestamp(), &body).unwrap();
    let tampered = String::from_utf8(body).unwrap().replace("payment_failed", "succeeded");
    let req =
        TestRequest::post().uri("/webhook/stripe").insert_header(("Stripe-Signature", signature)).set_payload(tampered);
    let (status, _, _) = send_request(req, configure_webhook(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn stale_or_missing_signatures_are_rejected() {
    let _ = env_logger::try_init();
    let body = payment_intent_event("evt_800", PAYMENT_INTENT_SUCCEEDED, "pi_800");
    let stale = sign_payload(WEBHOOK_SECRET, Utc::now().timestamp() - 3600, &body).unwrap();
    let req = TestRequest::post()
        .uri("/webhook/stripe")
        .insert_header(("Stripe-Signature", stale))
        .set_payload(body.clone());
    let mut db = MockPaymentManager::new();
    db.expect_settle_payment().never();
    let (status, _, _) = send_request(req, configure_webhook(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::post().uri("/webhook/stripe").set_payload(body);
    let mut db = MockPaymentManager::new();
    db.expect_settle_payment().never();
    let (status, _, _) = send_request(req, configure_webhook(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn malformed_authentic_payload_is_rejected() {
    let _ = env_logger::try_init();
    let mut db = MockPaymentManager::new();
    db.expect_settle_payment().never();
    let (status, _, body) = send_request(webhook_delivery(b"{not json".to_vec()), configure_webhook(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Malformed"), "{body}");
}

#[actix_web::test]
async fn cors_preflight() {
    let _ = env_logger::try_init();
    let req = TestRequest::default().method(actix_web::http::Method::OPTIONS).uri("/webhook/stripe");
    let (status, headers, body) = send_request(req, configure_webhook(MockPaymentManager::new())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
    assert_eq!(headers.get("Access-Control-Allow-Methods").unwrap(), "POST, OPTIONS");
    let allowed = headers.get("Access-Control-Allow-Headers").unwrap().to_str().unwrap();
    assert!(allowed.contains("Stripe-Signature"));
}

#[actix_web::test]
async fn webhook_only_accepts_post() {
    let _ = env_logger::try_init();
    let req = TestRequest::get().uri("/webhook/stripe");
    let (status, _, _) = send_request(req, configure_webhook(MockPaymentManager::new())).await;
    assert!(status.is_client_error());
}
