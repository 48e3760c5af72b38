//! Checkout and order lifecycle.
//!
//! Turns a cart snapshot into a placed [`Order`] and tracks it through
//! fulfilment. Payment is recorded as a label only; no payment is processed.

pub mod address;
pub mod checkout;
pub mod order;

pub use address::{AddressError, AddressField, ShippingAddress};
pub use checkout::{CheckoutError, CheckoutRequest, place_order};
pub use order::{
    AdvanceStatus, CancelOrder, Order, OrderCancelled, OrderCommand, OrderEvent, OrderId,
    OrderLine, OrderPlaced, OrderStatus, PlaceOrder, StatusAdvanced, filter_by_status,
};
