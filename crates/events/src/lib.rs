//! Domain events and in-process change notification.
//!
//! Aggregates decide events; this crate wraps them in envelopes and fans them out
//! to subscribers (display and checkout consumers).

pub mod bus;
pub mod envelope;
pub mod event;
pub mod handler;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::execute;
pub use in_memory_bus::InMemoryEventBus;
