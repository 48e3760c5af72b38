//! Shopping cart domain module.
//!
//! [`Cart`] holds the business rules (stock clamping, quantity limits) as pure
//! decide/apply logic. [`CartStore`] owns one cart for a session, executes
//! commands against it and notifies subscribers after every change.

pub mod cart;
pub mod pricing;
pub mod snapshot;
pub mod store;

pub use cart::{
    AddItem, Cart, CartCleared, CartCommand, CartError, CartEvent, CartId, CartLine, ClearCart,
    ItemAdded, LineId, LineRemoved, QuantityUpdated, RemoveItem, UpdateQuantity,
};
pub use pricing::{DEFAULT_TAX_RATE_BPS, OrderSummary, PricingPolicy, TAX_RATE_ENV};
pub use snapshot::CartSnapshot;
pub use store::{
    AddOutcome, CART_AGGREGATE_TYPE, CartEnvelope, CartStore, RemoveOutcome, SharedCartStore,
    SharedStoreError, UpdateOutcome,
};
