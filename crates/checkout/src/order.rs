use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_cart::{CartLine, OrderSummary};
use storefront_catalog::ProductId;
use storefront_core::{Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, Money};
use storefront_events::Event;

use crate::address::ShippingAddress;

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order status lifecycle.
///
/// `pending → processing → shipped → delivered`; `cancelled` from pending or
/// processing. Delivered and cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The next fulfilment step, if any.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn can_cancel(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order line: what was bought, frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id,
            name: line.product.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

/// Aggregate root: Order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    status: OrderStatus,
    lines: Vec<OrderLine>,
    shipping_address: Option<ShippingAddress>,
    payment_method: String,
    summary: Option<OrderSummary>,
    placed_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Order {
    /// Create an empty, not-yet-placed aggregate instance.
    pub fn empty(id: OrderId) -> Self {
        Self {
            id,
            status: OrderStatus::Pending,
            lines: Vec::new(),
            shipping_address: None,
            payment_method: String::new(),
            summary: None,
            placed_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn shipping_address(&self) -> Option<&ShippingAddress> {
        self.shipping_address.as_ref()
    }

    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    pub fn summary(&self) -> Option<&OrderSummary> {
        self.summary.as_ref()
    }

    pub fn total(&self) -> Money {
        self.summary.map(|s| s.total).unwrap_or(Money::ZERO)
    }

    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        self.placed_at
    }

    pub fn is_placed(&self) -> bool {
        self.created
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: PlaceOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub order_id: OrderId,
    pub lines: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub summary: OrderSummary,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AdvanceStatus (one fulfilment step forward).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceStatus {
    pub order_id: OrderId,
    pub to: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrder {
    pub order_id: OrderId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    PlaceOrder(PlaceOrder),
    AdvanceStatus(AdvanceStatus),
    CancelOrder(CancelOrder),
}

/// Event: OrderPlaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub lines: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub summary: OrderSummary,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusAdvanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAdvanced {
    pub order_id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: OrderId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderPlaced(OrderPlaced),
    StatusAdvanced(StatusAdvanced),
    OrderCancelled(OrderCancelled),
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "checkout.order.placed",
            OrderEvent::StatusAdvanced(_) => "checkout.order.status_advanced",
            OrderEvent::OrderCancelled(_) => "checkout.order.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderPlaced(e) => e.occurred_at,
            OrderEvent::StatusAdvanced(e) => e.occurred_at,
            OrderEvent::OrderCancelled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::OrderPlaced(e) => {
                self.id = e.order_id;
                self.status = OrderStatus::Pending;
                self.lines = e.lines.clone();
                self.shipping_address = Some(e.shipping_address.clone());
                self.payment_method = e.payment_method.clone();
                self.summary = Some(e.summary);
                self.placed_at = Some(e.occurred_at);
                self.created = true;
            }
            OrderEvent::StatusAdvanced(e) => {
                self.status = e.to;
            }
            OrderEvent::OrderCancelled(_) => {
                self.status = OrderStatus::Cancelled;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::PlaceOrder(cmd) => self.handle_place(cmd),
            OrderCommand::AdvanceStatus(cmd) => self.handle_advance(cmd),
            OrderCommand::CancelOrder(cmd) => self.handle_cancel(cmd),
        }
    }
}

impl Order {
    fn ensure_order_id(&self, order_id: OrderId) -> Result<(), DomainError> {
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }

    fn handle_place(&self, cmd: &PlaceOrder) -> DomainResult<Vec<OrderEvent>> {
        if self.created {
            return Err(DomainError::conflict("order already placed"));
        }
        self.ensure_order_id(cmd.order_id)?;

        if cmd.lines.is_empty() {
            return Err(DomainError::validation("cannot place order without lines"));
        }

        if cmd.lines.iter().any(|l| l.quantity == 0) {
            return Err(DomainError::validation("order line quantity must be positive"));
        }

        cmd.shipping_address
            .validate()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let subtotal: Money = cmd.lines.iter().map(OrderLine::line_total).sum();
        let item_count: u64 = cmd.lines.iter().map(|l| u64::from(l.quantity)).sum();
        if subtotal != cmd.summary.subtotal || item_count != cmd.summary.item_count {
            return Err(DomainError::invariant("order summary does not match order lines"));
        }

        Ok(vec![OrderEvent::OrderPlaced(OrderPlaced {
            order_id: cmd.order_id,
            lines: cmd.lines.clone(),
            shipping_address: cmd.shipping_address.clone(),
            payment_method: cmd.payment_method.clone(),
            summary: cmd.summary,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_advance(&self, cmd: &AdvanceStatus) -> DomainResult<Vec<OrderEvent>> {
        if !self.created {
            return Err(DomainError::not_found("order"));
        }
        self.ensure_order_id(cmd.order_id)?;

        if self.status.next() != Some(cmd.to) {
            return Err(DomainError::invariant(format!(
                "cannot move order from {} to {}",
                self.status, cmd.to
            )));
        }

        Ok(vec![OrderEvent::StatusAdvanced(StatusAdvanced {
            order_id: cmd.order_id,
            from: self.status,
            to: cmd.to,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelOrder) -> DomainResult<Vec<OrderEvent>> {
        if !self.created {
            return Err(DomainError::not_found("order"));
        }
        self.ensure_order_id(cmd.order_id)?;

        if !self.status.can_cancel() {
            return Err(DomainError::invariant(
                "only pending or processing orders can be cancelled",
            ));
        }

        Ok(vec![OrderEvent::OrderCancelled(OrderCancelled {
            order_id: cmd.order_id,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

/// Admin order list filter; `None` means all statuses.
pub fn filter_by_status(orders: &[Order], status: Option<OrderStatus>) -> Vec<&Order> {
    orders
        .iter()
        .filter(|o| status.is_none_or(|s| o.status() == s))
        .collect()
}
