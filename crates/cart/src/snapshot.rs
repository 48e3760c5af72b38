use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use storefront_core::{AggregateRoot, Entity, Money};

use crate::cart::{Cart, CartId, CartLine, LineId};
use crate::pricing::{OrderSummary, PricingPolicy};

/// Read-only copy of a cart for display and checkout consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub cart_id: CartId,
    /// Cart version at the time of the snapshot.
    pub revision: u64,
    /// Lines in insertion order.
    pub lines: Vec<CartLine>,
    pub item_count: u64,
    pub subtotal: Money,
}

impl CartSnapshot {
    pub fn of(cart: &Cart) -> Self {
        Self {
            cart_id: cart.id_typed(),
            revision: cart.version(),
            lines: cart.lines().to_vec(),
            item_count: cart.item_count(),
            subtotal: cart.subtotal(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, line_id: LineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    /// Re-sum the lines and compare with the derived totals. Also checks that
    /// no product appears on two lines.
    pub fn is_consistent(&self) -> bool {
        let item_count: u64 = self.lines.iter().map(|l| u64::from(l.quantity)).sum();
        let subtotal: Money = self.lines.iter().map(CartLine::line_total).sum();
        let mut seen = HashSet::with_capacity(self.lines.len());
        let distinct = self.lines.iter().all(|line| seen.insert(*line.id()));

        distinct
            && self.lines.iter().all(|l| l.quantity >= 1)
            && item_count == self.item_count
            && subtotal == self.subtotal
    }

    pub fn summary(&self, policy: &PricingPolicy) -> OrderSummary {
        policy.summarize(self.subtotal, self.item_count)
    }
}
