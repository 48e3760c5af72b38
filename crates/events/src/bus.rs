//! Event publishing/subscription abstraction (mechanics only).
//!
//! This is the **change notification** seam: a mutating component publishes one
//! message per applied event and every subscriber receives its own copy.
//!
//! - **Broadcast**: each subscription gets every message published after it subscribed
//! - **Ordered per publisher**: a single publisher's messages arrive in publication order
//! - **No persistence**: the bus distributes, it does not store
//!
//! Dropping a `Subscription` unsubscribes it.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to an event stream.
///
/// ```ignore
/// let sub = bus.subscribe();
/// store.add_item(&product, 1)?;
/// while let Ok(envelope) = sub.try_recv() {
///     redraw_badge(envelope.payload());
/// }
/// ```
///
/// Subscriptions are meant for single-threaded consumption.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain every message that is already queued, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// Implementations must deliver to subscribers in registration order, and must
/// have handed the message to every live subscriber before `publish` returns.
///
/// The trait requires `Send + Sync` so a bus can sit behind a shared store.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
