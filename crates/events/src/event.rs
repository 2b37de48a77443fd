use chrono::{DateTime, Utc};

/// A domain event: an immutable fact describing one state transition.
///
/// Events carry only the data needed to reapply the transition: ids and
/// value objects, never live entities. They are append-only and versioned
/// for schema evolution.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "product.created").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
