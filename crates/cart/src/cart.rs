use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_catalog::{Product, ProductId};
use storefront_core::{Aggregate, AggregateId, AggregateRoot, Entity, Money};
use storefront_events::Event;

/// Cart identifier (one cart per shopping session).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(pub AggregateId);

impl CartId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CartId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Cart line identifier.
///
/// Derived from the product, so a product always maps to the same line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub ProductId);

impl LineId {
    pub fn for_product(product_id: ProductId) -> Self {
        Self(product_id)
    }

    pub fn product_id(&self) -> ProductId {
        self.0
    }
}

impl core::fmt::Display for LineId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Cart line: product snapshot, quantity, unit price captured when first added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: LineId,
    /// Product as seen by the last add; its `stock_count` bounds quantity updates.
    pub product: Product,
    /// Always >= 1 while the line exists.
    pub quantity: u32,
    pub unit_price: Money,
}

impl CartLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

impl Entity for CartLine {
    type Id = LineId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Rejections. On any of these the cart is left unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    #[error("requested quantity {requested} exceeds available stock {available} for line {line_id}")]
    QuantityExceedsStock {
        line_id: LineId,
        requested: i64,
        available: u32,
    },

    #[error("cart line not found: {0}")]
    LineNotFound(LineId),

    #[error("requested quantity must be at least 1")]
    InvalidQuantity,

    #[error("command addressed to cart {actual}, this is cart {expected}")]
    CartMismatch { expected: CartId, actual: CartId },
}

/// Aggregate root: Cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    id: CartId,
    lines: Vec<CartLine>,
    version: u64,
}

impl Cart {
    /// A new, empty cart.
    pub fn new(id: CartId) -> Self {
        Self {
            id,
            lines: Vec::new(),
            version: 0,
        }
    }

    pub fn id_typed(&self) -> CartId {
        self.id
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, line_id: LineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of unit price times quantity across lines.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

impl AggregateRoot for Cart {
    type Id = CartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddItem {
    pub cart_id: CartId,
    /// Fresh snapshot from the catalog, read by the caller.
    pub product: Product,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateQuantity. Zero or negative removes the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuantity {
    pub cart_id: CartId,
    pub line_id: LineId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub cart_id: CartId,
    pub line_id: LineId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCart {
    pub cart_id: CartId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CartCommand {
    AddItem(AddItem),
    UpdateQuantity(UpdateQuantity),
    RemoveItem(RemoveItem),
    ClearCart(ClearCart),
}

/// Event: ItemAdded. `quantity` is the line's resulting quantity, not a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub cart_id: CartId,
    pub line_id: LineId,
    pub product: Product,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantityUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityUpdated {
    pub cart_id: CartId,
    pub line_id: LineId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRemoved {
    pub cart_id: CartId,
    pub line_id: LineId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CartCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCleared {
    pub cart_id: CartId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CartEvent {
    ItemAdded(ItemAdded),
    QuantityUpdated(QuantityUpdated),
    LineRemoved(LineRemoved),
    CartCleared(CartCleared),
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded(_) => "cart.item_added",
            CartEvent::QuantityUpdated(_) => "cart.quantity_updated",
            CartEvent::LineRemoved(_) => "cart.line_removed",
            CartEvent::CartCleared(_) => "cart.cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::ItemAdded(e) => e.occurred_at,
            CartEvent::QuantityUpdated(e) => e.occurred_at,
            CartEvent::LineRemoved(e) => e.occurred_at,
            CartEvent::CartCleared(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = CartError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::ItemAdded(e) => match self.lines.iter_mut().find(|l| l.id == e.line_id) {
                // Price stays as first captured; the stock snapshot is refreshed.
                Some(line) => {
                    line.product = e.product.clone();
                    line.quantity = e.quantity;
                }
                None => self.lines.push(CartLine {
                    id: e.line_id,
                    product: e.product.clone(),
                    quantity: e.quantity,
                    unit_price: e.product.price,
                }),
            },
            CartEvent::QuantityUpdated(e) => {
                if let Some(line) = self.lines.iter_mut().find(|l| l.id == e.line_id) {
                    line.quantity = e.quantity;
                }
            }
            CartEvent::LineRemoved(e) => {
                self.lines.retain(|l| l.id != e.line_id);
            }
            CartEvent::CartCleared(_) => {
                self.lines.clear();
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddItem(cmd) => self.handle_add_item(cmd),
            CartCommand::UpdateQuantity(cmd) => self.handle_update_quantity(cmd),
            CartCommand::RemoveItem(cmd) => self.handle_remove_item(cmd),
            CartCommand::ClearCart(cmd) => self.handle_clear(cmd),
        }
    }
}

impl Cart {
    fn ensure_cart_id(&self, cart_id: CartId) -> Result<(), CartError> {
        if self.id != cart_id {
            return Err(CartError::CartMismatch {
                expected: self.id,
                actual: cart_id,
            });
        }
        Ok(())
    }

    fn handle_add_item(&self, cmd: &AddItem) -> Result<Vec<CartEvent>, CartError> {
        self.ensure_cart_id(cmd.cart_id)?;

        if cmd.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        if !cmd.product.is_available() {
            return Err(CartError::OutOfStock(cmd.product.id));
        }

        let line_id = LineId::for_product(cmd.product.id);
        let existing = self.line(line_id);

        // Clamp to stock; a fresh snapshot with less stock can lower an existing line.
        let target = existing
            .map_or(0, |l| l.quantity)
            .saturating_add(cmd.quantity)
            .min(cmd.product.stock_count);

        // A fully clamped re-add still stores a changed snapshot, so later
        // updates are bounded by the newest stock.
        if existing.is_some_and(|l| l.quantity == target && l.product == cmd.product) {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::ItemAdded(ItemAdded {
            cart_id: cmd.cart_id,
            line_id,
            product: cmd.product.clone(),
            quantity: target,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_quantity(&self, cmd: &UpdateQuantity) -> Result<Vec<CartEvent>, CartError> {
        self.ensure_cart_id(cmd.cart_id)?;

        let line = self
            .line(cmd.line_id)
            .ok_or(CartError::LineNotFound(cmd.line_id))?;

        if cmd.quantity <= 0 {
            return Ok(vec![CartEvent::LineRemoved(LineRemoved {
                cart_id: cmd.cart_id,
                line_id: cmd.line_id,
                occurred_at: cmd.occurred_at,
            })]);
        }

        let available = line.product.stock_count;
        let exceeds = || CartError::QuantityExceedsStock {
            line_id: cmd.line_id,
            requested: cmd.quantity,
            available,
        };
        let quantity = u32::try_from(cmd.quantity).map_err(|_| exceeds())?;
        if quantity > available {
            return Err(exceeds());
        }

        if quantity == line.quantity {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::QuantityUpdated(QuantityUpdated {
            cart_id: cmd.cart_id,
            line_id: cmd.line_id,
            quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_item(&self, cmd: &RemoveItem) -> Result<Vec<CartEvent>, CartError> {
        self.ensure_cart_id(cmd.cart_id)?;

        if self.line(cmd.line_id).is_none() {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::LineRemoved(LineRemoved {
            cart_id: cmd.cart_id,
            line_id: cmd.line_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_clear(&self, cmd: &ClearCart) -> Result<Vec<CartEvent>, CartError> {
        self.ensure_cart_id(cmd.cart_id)?;

        if self.lines.is_empty() {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::CartCleared(CartCleared {
            cart_id: cmd.cart_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::AggregateId;

    fn test_cart_id() -> CartId {
        CartId::new(AggregateId::new())
    }

    fn test_product(price_cents: u64, stock: u32) -> Product {
        Product::new(
            ProductId::new(AggregateId::new()),
            "Canvas Tote",
            Money::from_cents(price_cents),
            stock,
        )
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn add(cart: &Cart, product: &Product, quantity: u32) -> CartCommand {
        CartCommand::AddItem(AddItem {
            cart_id: cart.id_typed(),
            product: product.clone(),
            quantity,
            occurred_at: test_time(),
        })
    }

    fn update(cart: &Cart, line_id: LineId, quantity: i64) -> CartCommand {
        CartCommand::UpdateQuantity(UpdateQuantity {
            cart_id: cart.id_typed(),
            line_id,
            quantity,
            occurred_at: test_time(),
        })
    }

    fn run(cart: &mut Cart, command: impl FnOnce(&Cart) -> CartCommand) -> Vec<CartEvent> {
        let command = command(cart);
        let events = cart.handle(&command).unwrap();
        for e in &events {
            cart.apply(e);
        }
        events
    }

    #[test]
    fn add_item_emits_item_added_with_requested_quantity() {
        let cart = Cart::new(test_cart_id());
        let product = test_product(1_000, 5);

        let events = cart.handle(&add(&cart, &product, 2)).unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            CartEvent::ItemAdded(e) => {
                assert_eq!(e.cart_id, cart.id_typed());
                assert_eq!(e.line_id, LineId::for_product(product.id));
                assert_eq!(e.quantity, 2);
            }
            _ => panic!("Expected ItemAdded event"),
        }
    }

    #[test]
    fn new_line_is_clamped_to_stock() {
        let mut cart = Cart::new(test_cart_id());
        let product = test_product(1_000, 3);

        run(&mut cart, |c| add(c, &product, 5));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn adding_existing_product_increments_same_line() {
        let mut cart = Cart::new(test_cart_id());
        let product = test_product(1_000, 5);

        run(&mut cart, |c| add(c, &product, 2));
        run(&mut cart, |c| add(c, &product, 4));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.subtotal(), Money::from_cents(5_000));
    }

    #[test]
    fn adding_at_stock_limit_emits_nothing() {
        let mut cart = Cart::new(test_cart_id());
        let product = test_product(1_000, 2);
        run(&mut cart, |c| add(c, &product, 2));

        let events = cart.handle(&add(&cart, &product, 1)).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn fully_clamped_readd_still_refreshes_stock_snapshot() {
        let mut cart = Cart::new(test_cart_id());
        let product = test_product(1_000, 5);
        run(&mut cart, |c| add(c, &product, 3));

        let mut fresh = product.clone();
        fresh.stock_count = 3;
        let events = run(&mut cart, |c| add(c, &fresh, 1));

        assert_eq!(events.len(), 1);
        let line = cart.line(LineId::for_product(product.id)).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.product.stock_count, 3);
    }

    #[test]
    fn unit_price_is_captured_at_first_add() {
        let mut cart = Cart::new(test_cart_id());
        let product = test_product(1_000, 10);
        run(&mut cart, |c| add(c, &product, 1));

        let mut repriced = product.clone();
        repriced.price = Money::from_cents(9_999);
        run(&mut cart, |c| add(c, &repriced, 1));

        let line = &cart.lines()[0];
        assert_eq!(line.unit_price, Money::from_cents(1_000));
        assert_eq!(line.product.price, Money::from_cents(9_999));
        assert_eq!(cart.subtotal(), Money::from_cents(2_000));
    }

    #[test]
    fn out_of_stock_product_is_rejected() {
        let cart = Cart::new(test_cart_id());
        let empty = test_product(1_000, 0);

        let err = cart.handle(&add(&cart, &empty, 1)).unwrap_err();
        assert_eq!(err, CartError::OutOfStock(empty.id));

        let mut flagged = test_product(1_000, 4);
        flagged.in_stock = false;
        let err = cart.handle(&add(&cart, &flagged, 1)).unwrap_err();
        assert_eq!(err, CartError::OutOfStock(flagged.id));
    }

    #[test]
    fn zero_quantity_add_is_invalid() {
        let cart = Cart::new(test_cart_id());
        let product = test_product(1_000, 4);

        let err = cart.handle(&add(&cart, &product, 0)).unwrap_err();
        assert_eq!(err, CartError::InvalidQuantity);
    }

    #[test]
    fn update_above_captured_stock_is_rejected() {
        let mut cart = Cart::new(test_cart_id());
        let product = test_product(1_000, 3);
        run(&mut cart, |c| add(c, &product, 1));
        let line_id = LineId::for_product(product.id);

        let err = cart.handle(&update(&cart, line_id, 4)).unwrap_err();
        assert_eq!(
            err,
            CartError::QuantityExceedsStock {
                line_id,
                requested: 4,
                available: 3,
            }
        );
        assert_eq!(cart.line(line_id).unwrap().quantity, 1);
    }

    #[test]
    fn update_to_zero_or_below_removes_line() {
        let mut cart = Cart::new(test_cart_id());
        let product = test_product(1_000, 3);
        run(&mut cart, |c| add(c, &product, 2));
        let line_id = LineId::for_product(product.id);

        let events = cart.handle(&update(&cart, line_id, -3)).unwrap();
        match &events[..] {
            [CartEvent::LineRemoved(e)] => assert_eq!(e.line_id, line_id),
            _ => panic!("Expected a single LineRemoved event"),
        }

        run(&mut cart, |c| update(c, line_id, 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn update_unknown_line_is_not_found() {
        let cart = Cart::new(test_cart_id());
        let line_id = LineId::for_product(ProductId::new(AggregateId::new()));

        let err = cart.handle(&update(&cart, line_id, 0)).unwrap_err();
        assert_eq!(err, CartError::LineNotFound(line_id));
    }

    #[test]
    fn remove_absent_line_emits_nothing() {
        let cart = Cart::new(test_cart_id());
        let cmd = CartCommand::RemoveItem(RemoveItem {
            cart_id: cart.id_typed(),
            line_id: LineId::for_product(ProductId::new(AggregateId::new())),
            occurred_at: test_time(),
        });

        assert!(cart.handle(&cmd).unwrap().is_empty());
    }

    #[test]
    fn command_for_other_cart_is_rejected() {
        let cart = Cart::new(test_cart_id());
        let other = test_cart_id();
        let cmd = CartCommand::ClearCart(ClearCart {
            cart_id: other,
            occurred_at: test_time(),
        });

        let err = cart.handle(&cmd).unwrap_err();
        assert_eq!(
            err,
            CartError::CartMismatch {
                expected: cart.id_typed(),
                actual: other,
            }
        );
    }

    #[test]
    fn lines_keep_insertion_order() {
        let mut cart = Cart::new(test_cart_id());
        let first = test_product(100, 5);
        let second = test_product(200, 5);
        let third = test_product(300, 5);

        run(&mut cart, |c| add(c, &first, 1));
        run(&mut cart, |c| add(c, &second, 1));
        run(&mut cart, |c| add(c, &third, 1));
        run(&mut cart, |c| add(c, &first, 1));

        let ids: Vec<_> = cart.lines().iter().map(|l| l.id).collect();
        assert_eq!(
            ids,
            vec![
                LineId::for_product(first.id),
                LineId::for_product(second.id),
                LineId::for_product(third.id),
            ]
        );
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let mut cart = Cart::new(test_cart_id());
        let product = test_product(1_000, 5);
        run(&mut cart, |c| add(c, &product, 1));
        let before = cart.clone();

        let events1 = cart.handle(&add(&cart, &product, 1)).unwrap();
        let events2 = cart.handle(&update(&cart, LineId::for_product(product.id), 0)).unwrap();

        assert_eq!(cart, before);
        assert_eq!(events1.len(), 1);
        assert_eq!(events2.len(), 1);
    }

    #[test]
    fn version_increments_on_apply() {
        let mut cart = Cart::new(test_cart_id());
        assert_eq!(cart.version(), 0);

        let product = test_product(1_000, 5);
        run(&mut cart, |c| add(c, &product, 1));
        assert_eq!(cart.version(), 1);

        run(&mut cart, |c| update(c, LineId::for_product(product.id), 3));
        assert_eq!(cart.version(), 2);
    }

    #[test]
    fn apply_is_deterministic() {
        let cart_id = test_cart_id();
        let product = test_product(250, 9);
        let line_id = LineId::for_product(product.id);

        let events = vec![
            CartEvent::ItemAdded(ItemAdded {
                cart_id,
                line_id,
                product: product.clone(),
                quantity: 2,
                occurred_at: test_time(),
            }),
            CartEvent::QuantityUpdated(QuantityUpdated {
                cart_id,
                line_id,
                quantity: 7,
                occurred_at: test_time(),
            }),
        ];

        let mut cart1 = Cart::new(cart_id);
        let mut cart2 = Cart::new(cart_id);
        for e in &events {
            cart1.apply(e);
            cart2.apply(e);
        }

        assert_eq!(cart1, cart2);
        assert_eq!(cart1.item_count(), 7);
        assert_eq!(cart1.subtotal(), Money::from_cents(1_750));
    }
}
