use std::{collections::HashMap, fmt::Debug};

use cucumber::World;
use log::*;
use website_order_engine::{
    db_types::OrderId,
    events::EventProducers,
    payments::{PaymentEventProcessor, SignatureVerifier, WebhookError, WebhookOutcome},
    submission::OrderSubmissionGateway,
    SqliteDatabase,
};
use wop_common::Secret;

use crate::support::prepare_env::{prepare_test_env, random_db_path, WEBHOOK_SECRET};

#[derive(Default, Debug, World)]
pub struct WebsiteOrderWorld {
    pub system: Option<OrderSystem>,
}

pub struct OrderSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub gateway: OrderSubmissionGateway<SqliteDatabase>,
    pub processor: PaymentEventProcessor<SqliteDatabase>,
    /// Orders by the name the feature file gave them.
    pub orders: HashMap<String, OrderId>,
    pub last_delivery: Option<Result<WebhookOutcome, WebhookError>>,
}

impl Debug for OrderSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderSystem({}, {} orders)", self.db_path, self.orders.len())
    }
}

impl WebsiteOrderWorld {
    pub fn system(&mut self) -> &mut OrderSystem {
        self.system.as_mut().expect("Order system not initialised")
    }
}

impl OrderSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        debug!("Created database: {url}");
        let gateway = OrderSubmissionGateway::new(db.clone(), EventProducers::default());
        let verifier = SignatureVerifier::new(Secret::from(WEBHOOK_SECRET));
        let processor = PaymentEventProcessor::new(db.clone(), verifier, EventProducers::default());
        Self { db_path: url, db, gateway, processor, orders: HashMap::new(), last_delivery: None }
    }

    pub fn order_id(&self, name: &str) -> OrderId {
        self.orders.get(name).cloned().unwrap_or_else(|| panic!("No order called {name}"))
    }
}
