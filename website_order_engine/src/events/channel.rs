//! Stateless pub-sub plumbing for engine events.
//!
//! Components subscribe to engine events through a hook, and the engine publishes to them through an
//! [`EventProducer`]. Handlers see only the event itself, never engine state. Handlers may be async, and each
//! event is handled on its own task.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, listener) = mpsc::channel(buffer_size);
        Self { listener, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs until every producer has been dropped, then waits for in-flight handlers to finish.
    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // the handler stops once the last external producer is gone
        drop(self.sender);
        let mut jobs = JoinSet::new();
        while let Some(ev) = self.listener.recv().await {
            trace!("📬️ Handling event");
            let handler = Arc::clone(&self.handler);
            jobs.spawn(async move { (handler)(ev).await });
            // reap finished jobs so the set does not grow without bound
            while let Some(done) = jobs.try_join_next() {
                if let Err(e) = done {
                    warn!("📬️ An event handler task failed: {e}");
                }
            }
        }
        while let Some(done) = jobs.join_next().await {
            if let Err(e) = done {
                warn!("📬️ An event handler task failed: {e}");
            }
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    /// Publishing never fails the caller. A closed channel is logged and the event dropped.
    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    #[tokio::test]
    async fn every_published_event_is_handled_before_shutdown() {
        let _ = env_logger::try_init();
        let total = Arc::new(AtomicU64::new(0));
        let t2 = total.clone();
        let handler: Handler<u64> = Arc::new(move |v| {
            let total = total.clone();
            Box::pin(async move {
                tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
                total.fetch_add(v, Ordering::SeqCst);
            })
        });
        let event_handler = EventHandler::new(1, handler);
        let odd = event_handler.subscribe();
        let even = event_handler.subscribe();
        tokio::spawn(async move {
            for i in 0..5 {
                odd.publish_event(i * 2 + 1).await;
            }
        });
        tokio::spawn(async move {
            for i in 0..5 {
                even.publish_event(i * 2).await;
            }
        });
        event_handler.start_handler().await;
        assert_eq!(t2.load(Ordering::SeqCst), 45);
    }
}
