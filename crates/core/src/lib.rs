//! Domain building blocks shared by the storefront crates: ids, money, errors
//! and the aggregate traits. No IO.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::AggregateId;
pub use money::Money;
pub use value_object::ValueObject;
