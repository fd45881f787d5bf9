use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::events::{
    EventHandler,
    EventProducer,
    Handler,
    OrderStatusChangedEvent,
    OrderSubmittedEvent,
    PaymentSettledEvent,
};

type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Cloneable set of publishers handed to the submission gateway and the webhook processor.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_submitted_producer: Vec<EventProducer<OrderSubmittedEvent>>,
    pub order_status_changed_producer: Vec<EventProducer<OrderStatusChangedEvent>>,
    pub payment_settled_producer: Vec<EventProducer<PaymentSettledEvent>>,
}

impl EventProducers {
    pub async fn publish_order_submitted(&self, event: OrderSubmittedEvent) {
        for producer in &self.order_submitted_producer {
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_order_status_changed(&self, event: OrderStatusChangedEvent) {
        for producer in &self.order_status_changed_producer {
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_payment_settled(&self, event: PaymentSettledEvent) {
        for producer in &self.payment_settled_producer {
            producer.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_order_submitted: Option<EventHandler<OrderSubmittedEvent>>,
    pub on_order_status_changed: Option<EventHandler<OrderStatusChangedEvent>>,
    pub on_payment_settled: Option<EventHandler<PaymentSettledEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_submitted = hooks.on_order_submitted.map(|f| EventHandler::new(buffer_size, f));
        let on_order_status_changed = hooks.on_order_status_changed.map(|f| EventHandler::new(buffer_size, f));
        let on_payment_settled = hooks.on_payment_settled.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_submitted, on_order_status_changed, on_payment_settled }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_submitted {
            result.order_submitted_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_status_changed {
            result.order_status_changed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_payment_settled {
            result.payment_settled_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns a task per registered hook. Each task ends once all producers for it have been dropped.
    pub fn start_handlers(self) {
        if let Some(handler) = self.on_order_submitted {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_order_status_changed {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_payment_settled {
            tokio::spawn(handler.start_handler());
        }
        debug!("📬️ Event handlers started");
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_submitted: Option<Handler<OrderSubmittedEvent>>,
    pub on_order_status_changed: Option<Handler<OrderStatusChangedEvent>>,
    pub on_payment_settled: Option<Handler<PaymentSettledEvent>>,
}

impl EventHooks {
    pub fn on_order_submitted<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderSubmittedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_order_submitted = Some(Arc::new(f));
        self
    }

    pub fn on_order_status_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderStatusChangedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_order_status_changed = Some(Arc::new(f));
        self
    }

    pub fn on_payment_settled<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PaymentSettledEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_payment_settled = Some(Arc::new(f));
        self
    }
}
