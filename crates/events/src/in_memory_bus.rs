//! In-memory event bus.

use std::convert::Infallible;
use std::sync::{Mutex, MutexGuard, PoisonError, mpsc};

use tracing::warn;

use crate::bus::{EventBus, Subscription};

/// In-memory pub/sub bus.
///
/// Fan-out is synchronous, into one queue per subscriber, in registration
/// order. Dropped subscriptions are pruned on the next publish.
///
/// The sender list stays valid even if a thread panics while holding the lock,
/// so a poisoned lock is recovered (and logged) rather than reported: neither
/// publishing nor subscribing can fail.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subscriptions that were still alive at the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.senders().len()
    }

    fn senders(&self) -> MutexGuard<'_, Vec<mpsc::Sender<M>>> {
        self.subscribers.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("event bus lock poisoned; recovering subscriber list");
            poisoned.into_inner()
        })
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = Infallible;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        self.senders().retain(|tx| tx.send(message.clone()).is_ok());
        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();
        self.senders().push(tx);
        Subscription::new(rx)
    }
}
