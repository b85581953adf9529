//! Simple stateless pub-sub event handler
//!
//! Components subscribe to engine events by registering a handler. Handlers are stateless: they receive the event
//! and nothing else. They may be async, and each event is handled in its own task, so a slow handler (e.g. one that
//! sends an email) never holds up the request that published the event.
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
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs until every producer has been dropped, then waits for in-flight handlers to finish.
    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // Without this, the channel would never close, since we'd always be holding a sender ourselves.
        drop(self.sender);
        let mut jobs = JoinSet::new();
        while let Some(ev) = self.listener.recv().await {
            trace!("📬️ Handling event");
            let handler = Arc::clone(&self.handler);
            jobs.spawn(async move {
                (handler)(ev).await;
            });
            // Reap whatever has already finished so the set doesn't grow without bound
            while let Some(res) = jobs.try_join_next() {
                log_job_result(res);
            }
        }
        if !jobs.is_empty() {
            debug!("📬️ Waiting for {} event handlers to complete", jobs.len());
        }
        while let Some(res) = jobs.join_next().await {
            log_job_result(res);
        }
        debug!("📬️ Event handler has shut down");
    }
}

fn log_job_result(res: Result<(), tokio::task::JoinError>) {
    match res {
        Ok(()) => trace!("📬️ Event handled"),
        Err(e) => error!("📬️ Event handler task failed: {e}"),
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

    /// Delivery is best-effort: if the handler has gone away, the failure is logged and the event dropped.
    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}
