use std::path::Path;

use chrono::Utc;
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use website_order_engine::{
    db_types::{Identity, NewPaymentRecord, Order, OrderId, PaymentRecord, PaymentType},
    onboarding::{ContactInfo, DraftPatch, Feature, OnboardingData, PurposeSelection},
    payments::sign_payload,
    OrderManagement,
    PaymentManagement,
    SqliteDatabase,
};
use wop_common::Cents;

pub const WEBHOOK_SECRET: &str = "whsec_integration_tests";

pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await
}

pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/wop_test_store_{}.db", dir.display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) -> SqliteDatabase {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
    db
}

pub async fn create_database<P: AsRef<Path>>(path: P) {
    let p = path.as_ref().as_os_str().to_str().unwrap();
    if let Err(e) = Sqlite::drop_database(p).await {
        trace!("Could not drop database {p}: {e:?}");
    }
    Sqlite::create_database(p).await.expect("Error creating database");
    info!("Created Sqlite database {p}");
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("🚀️ Failed to remove test database {url}: {e}");
    }
}

/// A business site with custom design for Jane, priced at $1850.00.
pub fn business_draft() -> OnboardingData {
    OnboardingData::from(
        DraftPatch::default()
            .with_purpose(PurposeSelection::new("business", Cents::from_dollars(650)))
            .with_features(vec![Feature::new("custom-design", "Custom design", Cents::from_dollars(1200))])
            .with_contact_info(ContactInfo::new("Jane Doe", "jane@example.com")),
    )
}

pub fn jane() -> Identity {
    Identity::new("client-jane").with_email("jane@example.com")
}

/// Inserts a submitted order and a pending payment of the given type for it.
pub async fn order_with_payment(
    db: &SqliteDatabase,
    intent_id: &str,
    payment_type: PaymentType,
) -> (Order, PaymentRecord) {
    let order = website_order_engine::db_types::NewOrder::new(
        jane().id,
        "Business website".into(),
        Cents::from_dollars(1850),
    )
    .with_purpose_type("business".into())
    .with_contact("jane@example.com".into(), Some("Jane Doe".into()));
    let order = db.insert_order(order).await.expect("Error inserting order");
    let payment = add_payment(db, &order.id, intent_id, payment_type).await;
    (order, payment)
}

pub async fn add_payment(
    db: &SqliteDatabase,
    order_id: &OrderId,
    intent_id: &str,
    payment_type: PaymentType,
) -> PaymentRecord {
    let payment = NewPaymentRecord::new(order_id.clone(), intent_id, payment_type, Cents::from_dollars(925));
    db.insert_payment(payment).await.expect("Error inserting payment")
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

pub fn signed(body: &[u8]) -> String {
    sign_payload(WEBHOOK_SECRET, Utc::now().timestamp(), body).expect("Error signing payload")
}
