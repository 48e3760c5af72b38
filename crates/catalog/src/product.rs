use serde::{Deserialize, Serialize};

use storefront_core::{AggregateId, Money};

use crate::rating::StarRating;

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Browsing category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Product record as handed out by the catalog.
///
/// A `Product` value is a snapshot: holding one never observes later catalog
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub brand: String,
    /// Category id (see [`Category::id`]).
    pub category: String,
    pub price: Money,
    pub original_price: Option<Money>,
    /// Average review score in [0, 5].
    pub rating: f64,
    pub review_count: u32,
    pub in_stock: bool,
    pub stock_count: u32,
    pub featured: bool,
}

impl Product {
    /// A minimal product; `in_stock` follows `stock_count`.
    pub fn new(id: ProductId, name: impl Into<String>, price: Money, stock_count: u32) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            brand: String::new(),
            category: String::new(),
            price,
            original_price: None,
            rating: 0.0,
            review_count: 0,
            in_stock: stock_count > 0,
            stock_count,
            featured: false,
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_rating(mut self, rating: f64, review_count: u32) -> Self {
        self.rating = rating;
        self.review_count = review_count;
        self
    }

    pub fn with_original_price(mut self, original_price: Money) -> Self {
        self.original_price = Some(original_price);
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    /// Whether at least one unit can be put in a cart.
    pub fn is_available(&self) -> bool {
        self.in_stock && self.stock_count > 0
    }

    /// The struck-through "was" price, shown only when it is above the current price.
    pub fn compare_at_price(&self) -> Option<Money> {
        self.original_price.filter(|original| *original > self.price)
    }

    pub fn star_rating(&self) -> StarRating {
        StarRating::from_rating(self.rating)
    }
}
