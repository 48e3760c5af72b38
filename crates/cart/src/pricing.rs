//! Checkout pricing derived from a cart subtotal.

use serde::{Deserialize, Serialize};
use tracing::warn;

use storefront_core::Money;

/// 10%, in basis points.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1_000;

/// Environment variable overriding the tax rate (basis points).
pub const TAX_RATE_ENV: &str = "STOREFRONT_TAX_RATE_BPS";

/// Tax and shipping rules applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub tax_rate_bps: u32,
    pub shipping: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            shipping: Money::ZERO,
        }
    }
}

impl PricingPolicy {
    /// Read the tax rate from `STOREFRONT_TAX_RATE_BPS`, falling back to the default.
    pub fn from_env() -> Self {
        Self::from_tax_setting(std::env::var(TAX_RATE_ENV).ok().as_deref())
    }

    fn from_tax_setting(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        match raw.trim().parse::<u32>() {
            Ok(tax_rate_bps) => Self::default().with_tax_rate_bps(tax_rate_bps),
            Err(err) => {
                warn!(
                    env = TAX_RATE_ENV,
                    value = raw,
                    error = %err,
                    "invalid tax rate, using default"
                );
                Self::default()
            }
        }
    }

    pub fn with_tax_rate_bps(mut self, tax_rate_bps: u32) -> Self {
        self.tax_rate_bps = tax_rate_bps;
        self
    }

    pub fn with_shipping(mut self, shipping: Money) -> Self {
        self.shipping = shipping;
        self
    }

    pub fn tax(&self, subtotal: Money) -> Money {
        subtotal.basis_points(self.tax_rate_bps)
    }

    /// Recomputed on every call; nothing here is cached.
    pub fn summarize(&self, subtotal: Money, item_count: u64) -> OrderSummary {
        let tax = self.tax(subtotal);
        OrderSummary {
            item_count,
            subtotal,
            shipping: self.shipping,
            tax,
            total: subtotal + self.shipping + tax,
        }
    }
}

/// Totals shown on the cart and checkout screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub item_count: u64,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}
