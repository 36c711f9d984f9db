//! Shutdown coordination for the router server.

use std::future::Future;

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// `HttpServer::run` awaits [`Shutdown::signalled`]; the signal task drives
/// [`Shutdown::trigger_after`]. Dropping the coordinator also releases every
/// waiter.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Future that resolves once shutdown is triggered or the coordinator
    /// is gone. Subscribes immediately, so a trigger fired before the first
    /// poll is not missed.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }

    pub fn trigger(&self) {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::info!(waiters = notified, "Shutdown triggered");
    }

    /// Trigger shutdown once `event` completes.
    pub async fn trigger_after<F: Future>(&self, event: F) {
        event.await;
        self.trigger();
    }

    /// Number of waiters that have not yet dropped their receiver.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
