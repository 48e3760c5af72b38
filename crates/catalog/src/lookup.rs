//! Catalog lookup seam and an in-memory implementation.

use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

use crate::product::{Category, Product, ProductId};

/// Featured listings are capped like the storefront's home screen query.
pub const FEATURED_LIMIT: usize = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The backing store could not answer (remote failure, poisoned lock).
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read path into product records.
///
/// Callers fetch a fresh snapshot here before asking the cart to add or resize
/// a line; the cart never calls the catalog itself.
pub trait ProductCatalog: Send + Sync {
    fn get_product(&self, id: ProductId) -> Result<Product, CatalogError>;

    fn products(&self) -> Result<Vec<Product>, CatalogError>;

    /// Featured products, at most [`FEATURED_LIMIT`].
    fn featured(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self
            .products()?
            .into_iter()
            .filter(|p| p.featured)
            .take(FEATURED_LIMIT)
            .collect())
    }

    fn by_category(&self, category_id: &str) -> Result<Vec<Product>, CatalogError> {
        Ok(self
            .products()?
            .into_iter()
            .filter(|p| p.category == category_id)
            .collect())
    }

    fn categories(&self) -> Result<Vec<Category>, CatalogError>;
}

/// In-memory catalog for tests/dev. Listing order is insertion order.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: Mutex<Vec<Product>>,
    categories: Mutex<Vec<Category>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product (matched by id).
    pub fn upsert(&self, product: Product) -> Result<(), CatalogError> {
        let mut products = self.products.lock().map_err(|_| poisoned())?;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }
        Ok(())
    }

    pub fn add_category(&self, category: Category) -> Result<(), CatalogError> {
        let mut categories = self.categories.lock().map_err(|_| poisoned())?;
        categories.retain(|c| c.id != category.id);
        categories.push(category);
        Ok(())
    }

    /// Change a product's stock; the in-stock flag follows the count.
    pub fn set_stock(&self, id: ProductId, stock_count: u32) -> Result<Product, CatalogError> {
        let mut products = self.products.lock().map_err(|_| poisoned())?;
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CatalogError::NotFound(id))?;

        product.stock_count = stock_count;
        product.in_stock = stock_count > 0;
        debug!(product_id = %id, stock_count, "catalog stock updated");
        Ok(product.clone())
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let products = self.products.lock().map_err(|_| poisoned())?;
        products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    fn products(&self) -> Result<Vec<Product>, CatalogError> {
        let products = self.products.lock().map_err(|_| poisoned())?;
        Ok(products.clone())
    }

    fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        let categories = self.categories.lock().map_err(|_| poisoned())?;
        Ok(categories.clone())
    }
}

fn poisoned() -> CatalogError {
    CatalogError::Unavailable("catalog lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{AggregateId, Money};

    fn product(name: &str, category: &str) -> Product {
        Product::new(
            ProductId::new(AggregateId::new()),
            name,
            Money::from_cents(1_000),
            3,
        )
        .with_category(category)
    }

    #[test]
    fn get_product_returns_snapshot_not_live_reference() {
        let catalog = InMemoryCatalog::new();
        let p = product("Mug", "kitchen");
        catalog.upsert(p.clone()).unwrap();

        let snapshot = catalog.get_product(p.id).unwrap();
        catalog.set_stock(p.id, 0).unwrap();

        assert_eq!(snapshot.stock_count, 3);
        let fresh = catalog.get_product(p.id).unwrap();
        assert_eq!(fresh.stock_count, 0);
        assert!(!fresh.in_stock);
    }

    #[test]
    fn unknown_product_is_not_found() {
        let catalog = InMemoryCatalog::new();
        let id = ProductId::new(AggregateId::new());
        assert_eq!(catalog.get_product(id), Err(CatalogError::NotFound(id)));
        assert_eq!(catalog.set_stock(id, 1), Err(CatalogError::NotFound(id)));
    }

    #[test]
    fn upsert_replaces_in_place() {
        let catalog = InMemoryCatalog::new();
        let first = product("Lamp", "home");
        let second = product("Rug", "home");
        catalog.upsert(first.clone()).unwrap();
        catalog.upsert(second.clone()).unwrap();

        let mut renamed = first.clone();
        renamed.name = "Desk Lamp".to_string();
        catalog.upsert(renamed).unwrap();

        let names: Vec<_> = catalog.products().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Desk Lamp", "Rug"]);
    }

    #[test]
    fn featured_is_capped() {
        let catalog = InMemoryCatalog::new();
        for i in 0..(FEATURED_LIMIT + 3) {
            catalog.upsert(product(&format!("P{i}"), "misc").featured()).unwrap();
        }
        catalog.upsert(product("Plain", "misc")).unwrap();

        let featured = catalog.featured().unwrap();
        assert_eq!(featured.len(), FEATURED_LIMIT);
        assert!(featured.iter().all(|p| p.featured));
    }

    #[test]
    fn by_category_filters_exactly() {
        let catalog = InMemoryCatalog::new();
        catalog.upsert(product("Pan", "kitchen")).unwrap();
        catalog.upsert(product("Sofa", "home")).unwrap();
        catalog.upsert(product("Whisk", "kitchen")).unwrap();

        let kitchen = catalog.by_category("kitchen").unwrap();
        assert_eq!(kitchen.len(), 2);
        assert!(catalog.by_category("garden").unwrap().is_empty());
    }

    #[test]
    fn categories_are_replaced_by_id() {
        let catalog = InMemoryCatalog::new();
        catalog
            .add_category(Category { id: "home".into(), name: "Home".into(), description: None })
            .unwrap();
        catalog
            .add_category(Category {
                id: "home".into(),
                name: "Home & Living".into(),
                description: Some("Furniture and decor".into()),
            })
            .unwrap();

        let categories = catalog.categories().unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Home & Living");
    }
}
