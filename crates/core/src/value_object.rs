//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared entirely by their attribute
/// values; a `Sku` or a template element position has no identity of its
/// own. To "modify" one, construct a new value. Events reference aggregates
/// only through ids and value objects, never through live entities.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
