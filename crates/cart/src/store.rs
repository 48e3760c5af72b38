//! Session-scoped cart store with change notification.
//!
//! ```text
//! caller ──command──▶ CartStore ──handle/apply──▶ Cart
//!                         │
//!                         └──EventEnvelope<CartEvent>──▶ EventBus ──▶ subscribers
//! ```
//!
//! Every mutating call runs to completion (decide, apply, publish) before it
//! returns, so a subscriber never observes a half-applied change. `CartStore`
//! takes `&mut self`; share it across threads through [`SharedCartStore`].

use std::sync::{Arc, Mutex};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use storefront_catalog::Product;
use storefront_core::AggregateRoot;
use storefront_events::{Event, EventBus, EventEnvelope, Subscription, execute};

use crate::cart::{
    AddItem, Cart, CartCommand, CartError, CartEvent, CartId, ClearCart, LineId, RemoveItem,
    UpdateQuantity,
};
use crate::snapshot::CartSnapshot;

/// Aggregate type stamped on published envelopes.
pub const CART_AGGREGATE_TYPE: &str = "cart";

pub type CartEnvelope = EventEnvelope<CartEvent>;

/// Result of a successful add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The full requested quantity was added.
    Added { line_id: LineId, quantity: u32 },
    /// Stock capped the line; `quantity` is what the line now holds.
    Clamped {
        line_id: LineId,
        quantity: u32,
        requested: u32,
    },
}

impl AddOutcome {
    pub fn line_id(&self) -> LineId {
        match self {
            AddOutcome::Added { line_id, .. } | AddOutcome::Clamped { line_id, .. } => *line_id,
        }
    }

    /// Line quantity after the add.
    pub fn quantity(&self) -> u32 {
        match self {
            AddOutcome::Added { quantity, .. } | AddOutcome::Clamped { quantity, .. } => *quantity,
        }
    }

    pub fn is_clamped(&self) -> bool {
        matches!(self, AddOutcome::Clamped { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated { line_id: LineId, quantity: u32 },
    Removed { line_id: LineId },
}

/// Removal is idempotent; both variants are success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotPresent,
}

/// Owns the cart for one shopping session.
#[derive(Debug)]
pub struct CartStore<B> {
    cart: Cart,
    bus: B,
}

impl<B> CartStore<B>
where
    B: EventBus<CartEnvelope>,
{
    /// Start a session with an empty cart.
    pub fn open(cart_id: CartId, bus: B) -> Self {
        info!(cart_id = %cart_id, "cart session opened");
        Self {
            cart: Cart::new(cart_id),
            bus,
        }
    }

    pub fn cart_id(&self) -> CartId {
        self.cart.id_typed()
    }

    /// Register for change notifications. Only changes made after this call are delivered.
    pub fn subscribe(&self) -> Subscription<CartEnvelope> {
        self.bus.subscribe()
    }

    /// Add `quantity` units of `product`, clamped to its stock.
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> Result<AddOutcome, CartError> {
        let line_id = LineId::for_product(product.id);
        let before = self.quantity_of(line_id);

        self.dispatch(CartCommand::AddItem(AddItem {
            cart_id: self.cart_id(),
            product: product.clone(),
            quantity,
            occurred_at: Utc::now(),
        }))?;

        let after = self.quantity_of(line_id);
        if after < before.saturating_add(quantity) {
            debug!(
                cart_id = %self.cart_id(),
                line_id = %line_id,
                requested = quantity,
                quantity = after,
                stock = product.stock_count,
                "add clamped to stock"
            );
            return Ok(AddOutcome::Clamped {
                line_id,
                quantity: after,
                requested: quantity,
            });
        }

        Ok(AddOutcome::Added {
            line_id,
            quantity: after,
        })
    }

    /// Set a line's quantity exactly; zero or below removes it.
    pub fn update_quantity(
        &mut self,
        line_id: LineId,
        quantity: i64,
    ) -> Result<UpdateOutcome, CartError> {
        self.dispatch(CartCommand::UpdateQuantity(UpdateQuantity {
            cart_id: self.cart_id(),
            line_id,
            quantity,
            occurred_at: Utc::now(),
        }))?;

        Ok(match self.cart.line(line_id) {
            Some(line) => UpdateOutcome::Updated {
                line_id,
                quantity: line.quantity,
            },
            None => UpdateOutcome::Removed { line_id },
        })
    }

    pub fn remove_item(&mut self, line_id: LineId) -> Result<RemoveOutcome, CartError> {
        let events = self.dispatch(CartCommand::RemoveItem(RemoveItem {
            cart_id: self.cart_id(),
            line_id,
            occurred_at: Utc::now(),
        }))?;

        Ok(if events.is_empty() {
            RemoveOutcome::NotPresent
        } else {
            RemoveOutcome::Removed
        })
    }

    /// Empty the cart. Returns how many lines were removed.
    pub fn clear(&mut self) -> Result<usize, CartError> {
        let removed = self.cart.lines().len();
        self.dispatch(CartCommand::ClearCart(ClearCart {
            cart_id: self.cart_id(),
            occurred_at: Utc::now(),
        }))?;
        Ok(removed)
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::of(&self.cart)
    }

    /// End the session, returning the cart as it was left.
    pub fn close(self) -> CartSnapshot {
        let snapshot = self.snapshot();
        info!(
            cart_id = %snapshot.cart_id,
            lines = snapshot.lines.len(),
            item_count = snapshot.item_count,
            "cart session closed"
        );
        snapshot
    }

    fn quantity_of(&self, line_id: LineId) -> u32 {
        self.cart.line(line_id).map(|l| l.quantity).unwrap_or(0)
    }

    fn dispatch(&mut self, command: CartCommand) -> Result<Vec<CartEvent>, CartError> {
        let events = execute(&mut self.cart, &command).inspect_err(|err| {
            debug!(cart_id = %self.cart.id_typed(), error = %err, "cart command rejected");
        })?;

        self.publish(&events);
        Ok(events)
    }

    /// Publish applied events with their stream positions.
    ///
    /// The cart is already updated at this point, so a bus failure is logged and
    /// does not undo the change.
    fn publish(&self, events: &[CartEvent]) {
        let aggregate_id = self.cart.id_typed().0;
        let first_sequence = self.cart.version() + 1 - events.len() as u64;

        for (offset, event) in events.iter().enumerate() {
            let sequence_number = first_sequence + offset as u64;
            let envelope = EventEnvelope::new(
                Uuid::now_v7(),
                aggregate_id,
                CART_AGGREGATE_TYPE,
                sequence_number,
                event.clone(),
            );

            debug!(
                cart_id = %self.cart.id_typed(),
                category = event.category(),
                event_type = event.event_type(),
                sequence_number,
                "publishing cart change"
            );
            if let Err(err) = self.bus.publish(envelope) {
                warn!(
                    cart_id = %self.cart.id_typed(),
                    sequence_number,
                    error = ?err,
                    "cart change notification failed"
                );
            }
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SharedStoreError {
    #[error("cart store lock poisoned")]
    Poisoned,
}

/// A `CartStore` behind a mutex, for callers on several threads.
///
/// Each closure passed to [`SharedCartStore::with`] holds the lock for its whole
/// duration, so mutating calls never interleave.
#[derive(Debug)]
pub struct SharedCartStore<B> {
    inner: Arc<Mutex<CartStore<B>>>,
}

impl<B> Clone for SharedCartStore<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B> SharedCartStore<B>
where
    B: EventBus<CartEnvelope>,
{
    pub fn new(store: CartStore<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut CartStore<B>) -> R) -> Result<R, SharedStoreError> {
        let mut store = self.inner.lock().map_err(|_| SharedStoreError::Poisoned)?;
        Ok(f(&mut store))
    }

    pub fn snapshot(&self) -> Result<CartSnapshot, SharedStoreError> {
        self.with(|store| store.snapshot())
    }
}
