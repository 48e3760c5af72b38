//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two values with the same attributes are
/// equal. They are immutable; "changing" one means building a new one.
///
/// - **Value Object**: `Money::from_cents(1999)`, a shipping address, a star rating
/// - **Entity**: a cart line, identified by its `LineId` while its quantity changes
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Money(u64);
///
/// impl ValueObject for Money {}
///
/// assert_eq!(Money(100), Money(100)); // equal by value, not identity
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
