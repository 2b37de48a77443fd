//! Append-only event storage.
//!
//! The [`EventStore`] trait is the single shared mutable resource of the
//! system: safe for concurrent callers across aggregate ids, with same-id
//! writers racing only on the optimistic concurrency check. Two
//! implementations ship here: [`InMemoryEventStore`] for tests/dev and
//! [`PostgresEventStore`] for durable storage.

mod in_memory;
mod postgres;
mod stream;
mod r#trait;

pub use in_memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use stream::EventStream;
pub use r#trait::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};
