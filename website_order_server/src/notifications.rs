use log::*;
use website_order_engine::events::{
    EventHandlers,
    EventHooks,
    OrderStatusChangedEvent,
    OrderSubmittedEvent,
    PaymentSettledEvent,
};

pub const NOTIFICATION_EVENT_BUFFER_SIZE: usize = 25;

/// Assigns the server's event handlers.
///
/// The handlers write an audit trail of every order and payment transition to the `wop::audit` log target, off the
/// request path:
///
/// 1. OrderSubmittedEvent - a new order was written by the submission gateway.
/// 2. PaymentSettledEvent - a payment record moved from pending to a terminal status.
/// 3. OrderStatusChangedEvent - a successful payment advanced an order through its lifecycle.
pub fn create_notification_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    // --- On OrderSubmitted Handler ---
    hooks.on_order_submitted(|ev| {
        let OrderSubmittedEvent { order } = ev;
        Box::pin(async move {
            info!(
                target: "wop::audit",
                "📬️ Order {} submitted by client {} for {} ({})",
                order.id, order.client_id, order.total_amount, order.purpose_type
            );
        })
    });
    // --- On PaymentSettled Handler ---
    hooks.on_payment_settled(|ev| {
        let PaymentSettledEvent { payment, settled_at } = ev;
        Box::pin(async move {
            info!(
                target: "wop::audit",
                "📬️ {} payment {} for order {} settled as {} at {settled_at}",
                payment.payment_type, payment.stripe_payment_intent_id, payment.order_id, payment.status
            );
        })
    });
    // --- On OrderStatusChanged Handler ---
    hooks.on_order_status_changed(|ev| {
        let new_status = ev.new_status();
        let OrderStatusChangedEvent { order, old_status } = ev;
        Box::pin(async move {
            info!(
                target: "wop::audit",
                "📬️ Order {} moved from {old_status} to {new_status}. Project stage is now {:?}",
                order.id,
                new_status.stage()
            );
        })
    });
    EventHandlers::new(NOTIFICATION_EVENT_BUFFER_SIZE, hooks)
}
