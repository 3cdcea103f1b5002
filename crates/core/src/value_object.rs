//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and are immutable; two instances with the same
/// attributes are interchangeable. In this workspace a category's price range is
/// a value object, while a product (keyed by its id) is an entity.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
