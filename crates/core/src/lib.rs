//! `cataloger-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure
//! concerns): aggregate identity, the event-sourced aggregate contract and
//! the domain error model.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{
    AggregateRoot, AggregateState, EventSourcedAggregate, ExpectedVersion, UnknownEvent,
};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::AggregateId;
pub use value_object::ValueObject;
