//! Product catalog collaborator.
//!
//! Products are owned and mutated here; consumers (the cart, product views)
//! only ever receive cloned snapshots through [`ProductCatalog`].

pub mod lookup;
pub mod product;
pub mod rating;

pub use lookup::{CatalogError, InMemoryCatalog, ProductCatalog, FEATURED_LIMIT};
pub use product::{Category, Product, ProductId};
pub use rating::{Star, StarRating};
