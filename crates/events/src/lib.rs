//! `cataloger-events`: the event vocabulary and dispatch mechanics.
//!
//! Defines what an event is ([`Event`]), how a committed event travels
//! ([`EventEnvelope`]) and how it reaches subscribers ([`EventDispatcher`]).
//! Storage lives in `cataloger-infra`; this crate makes no persistence
//! assumptions.

pub mod dispatch;
pub mod envelope;
pub mod event;

pub use dispatch::{
    Delivery, DispatchReport, EventDispatch, EventDispatcher, EventDispatcherBuilder,
    EventHandler, HandlerFailure,
};
pub use envelope::EventEnvelope;
pub use event::Event;
