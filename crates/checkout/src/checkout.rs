//! Placing an order from the current cart.

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use storefront_cart::{CartEnvelope, CartError, CartStore, PricingPolicy};
use storefront_core::{AggregateId, DomainError};
use storefront_events::{EventBus, execute};

use crate::address::{AddressError, ShippingAddress};
use crate::order::{Order, OrderCommand, OrderId, OrderLine, PlaceOrder};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("order rejected: {0}")]
    Order(#[from] DomainError),

    #[error("cart could not be cleared: {0}")]
    Cart(#[from] CartError),
}

/// What the checkout form collects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub shipping_address: ShippingAddress,
    /// Label only (e.g. "card"); no payment is taken.
    pub payment_method: String,
}

/// Turn the cart into a pending order, then empty the cart.
///
/// The cart is cleared only after the order has been placed; on any error it is
/// left as it was.
pub fn place_order<B>(
    store: &mut CartStore<B>,
    request: CheckoutRequest,
    policy: &PricingPolicy,
) -> Result<Order, CheckoutError>
where
    B: EventBus<CartEnvelope>,
{
    let snapshot = store.snapshot();
    if snapshot.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    request.shipping_address.validate().inspect_err(|err| {
        warn!(cart_id = %snapshot.cart_id, error = %err, "checkout address invalid");
    })?;

    let order_id = OrderId::new(AggregateId::new());
    let mut order = Order::empty(order_id);
    let command = OrderCommand::PlaceOrder(PlaceOrder {
        order_id,
        lines: snapshot.lines.iter().map(OrderLine::from).collect(),
        shipping_address: request.shipping_address,
        payment_method: request.payment_method,
        summary: snapshot.summary(policy),
        occurred_at: Utc::now(),
    });
    execute(&mut order, &command).inspect_err(|err| {
        warn!(
            order_id = %order_id,
            client_error = err.is_client_error(),
            error = %err,
            "order rejected"
        );
    })?;

    store.clear()?;

    info!(
        order_id = %order_id,
        cart_id = %snapshot.cart_id,
        item_count = snapshot.item_count,
        total = %order.total(),
        "order placed"
    );
    Ok(order)
}
