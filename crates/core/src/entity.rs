//! Entities: objects with identity inside an aggregate boundary.

/// An object whose identity outlives its state.
///
/// Two entities with the same id are the same thing even when their other
/// fields differ; compare ids, not fields. Entities live inside an
/// aggregate and are reached through it, never persisted on their own.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
