//! Generic aggregate repository: the load / save / exists boundary.
//!
//! One repository instance serves one aggregate kind, composed from an
//! [`EventStore`] and an [`EventDispatch`]. Loading replays the full stream
//! onto a blank instance (O(stream length), no snapshotting); saving drains
//! the aggregate's pending events, appends them under the optimistic
//! concurrency check and only then dispatches them, in emission order.

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use cataloger_core::{AggregateId, EventSourcedAggregate, ExpectedVersion};
use cataloger_events::{Delivery, Event, EventDispatch};

use crate::event_store::{EventStore, EventStoreError, EventStream, UncommittedEvent};

/// Repository operation error.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Another writer committed between load and save. Recoverable: retry
    /// the full load-mutate-save cycle.
    #[error("concurrency conflict: {0}")]
    Conflict(String),

    /// The stream contains an event this aggregate kind cannot apply, or
    /// violates stream invariants. Fatal for this load; signals a
    /// mismatched or corrupted store, not a runtime condition to retry.
    #[error("corrupt event stream: {0}")]
    CorruptStream(String),

    /// The store failed for infrastructure reasons.
    #[error(transparent)]
    Store(EventStoreError),
}

impl From<EventStoreError> for RepositoryError {
    fn from(value: EventStoreError) -> Self {
        match value {
            EventStoreError::Conflict(msg) => RepositoryError::Conflict(msg),
            EventStoreError::CorruptStream(msg) => RepositoryError::CorruptStream(msg),
            other => RepositoryError::Store(other),
        }
    }
}

/// The narrow boundary use-cases consume.
///
/// Absence is a result, not an error: callers decide whether a missing
/// aggregate is a problem for their use-case.
pub trait Repository<A>: Send + Sync {
    fn exists(&self, id: AggregateId) -> Result<bool, RepositoryError>;

    fn load(&self, id: AggregateId) -> Result<Option<A>, RepositoryError>;

    fn save(&self, aggregate: &mut A) -> Result<(), RepositoryError>;
}

/// Event-sourced [`Repository`] implementation, generic over one aggregate
/// kind.
#[derive(Debug)]
pub struct AggregateRepository<A, S, D> {
    store: S,
    dispatcher: D,
    delivery: Delivery,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A, S, D> AggregateRepository<A, S, D> {
    /// Repository with inline dispatch after each successful save.
    pub fn new(store: S, dispatcher: D) -> Self {
        Self::with_delivery(store, dispatcher, Delivery::Inline)
    }

    pub fn with_delivery(store: S, dispatcher: D, delivery: Delivery) -> Self {
        Self {
            store,
            dispatcher,
            delivery,
            _aggregate: PhantomData,
        }
    }
}

/// A stream is live when it has events and is not terminated by the kind's
/// deleted-event marker. Deleted streams read as absent; their ids stay
/// unusable because a fresh create would append at expected version 0
/// against the stream's real version and conflict.
fn is_live<A: EventSourcedAggregate>(stream: &EventStream) -> bool {
    match stream.last() {
        None => false,
        Some(last) => match A::deleted_event_type() {
            Some(deleted) => last.event_type != deleted,
            None => true,
        },
    }
}

impl<A, S, D> Repository<A> for AggregateRepository<A, S, D>
where
    A: EventSourcedAggregate,
    A::Event: Event + Serialize + DeserializeOwned,
    S: EventStore,
    D: EventDispatch,
{
    fn exists(&self, id: AggregateId) -> Result<bool, RepositoryError> {
        let stream = self.store.load_stream(id)?;
        Ok(is_live::<A>(&stream))
    }

    fn load(&self, id: AggregateId) -> Result<Option<A>, RepositoryError> {
        let stream = self.store.load_stream(id)?;
        if !is_live::<A>(&stream) {
            return Ok(None);
        }

        let mut aggregate = A::blank(id);
        for stored in stream.events() {
            if stored.aggregate_type != A::AGGREGATE_TYPE {
                return Err(RepositoryError::CorruptStream(format!(
                    "stream for {id} holds '{}' events, expected '{}'",
                    stored.aggregate_type,
                    A::AGGREGATE_TYPE
                )));
            }

            let event: A::Event = serde_json::from_value(stored.payload.clone()).map_err(|e| {
                RepositoryError::CorruptStream(format!(
                    "undecodable event '{}' at sequence {}: {e}",
                    stored.event_type, stored.sequence_number
                ))
            })?;

            aggregate
                .replay(std::iter::once(event))
                .map_err(|e| RepositoryError::CorruptStream(e.to_string()))?;
        }

        Ok(Some(aggregate))
    }

    fn save(&self, aggregate: &mut A) -> Result<(), RepositoryError> {
        let events = aggregate.pop_events();
        if events.is_empty() {
            // No store round-trip and no dispatch for a clean aggregate.
            return Ok(());
        }

        let expected = ExpectedVersion::Exact(aggregate.version());
        let mut uncommitted = Vec::with_capacity(events.len());
        for event in &events {
            uncommitted.push(UncommittedEvent::from_typed(
                aggregate.aggregate_id(),
                A::AGGREGATE_TYPE,
                Uuid::now_v7(),
                event,
            )?);
        }

        // Conflict propagates here, before any dispatch happens.
        let committed = self.store.append(uncommitted, expected)?;
        aggregate.mark_committed(committed.len() as u64);

        tracing::debug!(
            aggregate_id = %aggregate.aggregate_id(),
            aggregate_type = A::AGGREGATE_TYPE,
            committed = committed.len(),
            "aggregate saved"
        );

        // Handler failures are contained at the dispatch boundary; the
        // append is already durable.
        for stored in &committed {
            let _ = self.dispatcher.dispatch(stored.to_envelope(), self.delivery);
        }

        Ok(())
    }
}
