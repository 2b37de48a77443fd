//! `cataloger-infra`: event storage and the aggregate repository built on
//! top of it.

pub mod event_store;
pub mod repository;


pub use event_store::{
    EventStore, EventStoreError, EventStream, InMemoryEventStore, PostgresEventStore,
    StoredEvent, UncommittedEvent,
};
pub use repository::{AggregateRepository, Repository, RepositoryError};
