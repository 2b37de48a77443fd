use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use cataloger_core::{AggregateId, ExpectedVersion};
use cataloger_events::EventEnvelope;

use super::stream::EventStream;

/// An event ready to be appended to a stream, not yet assigned a sequence
/// number.
///
/// Built from a typed domain event with [`UncommittedEvent::from_typed`],
/// which serializes the payload to JSON and captures the event metadata
/// needed for later deserialization. The store assigns `sequence_number` and
/// `recorded_at` during append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncommittedEvent {
    pub event_id: Uuid,
    pub aggregate_id: AggregateId,
    pub aggregate_type: String,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,

    pub payload: JsonValue,
}

impl UncommittedEvent {
    /// Convenience constructor from a typed domain event.
    ///
    /// Keeps infra decoupled from domain modules while still capturing the
    /// metadata needed for deserialization.
    pub fn from_typed<E>(
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        event_id: Uuid,
        event: &E,
    ) -> Result<Self, EventStoreError>
    where
        E: cataloger_events::Event + Serialize,
    {
        let payload = serde_json::to_value(event).map_err(|e| {
            EventStoreError::InvalidAppend(format!("payload serialization failed: {e}"))
        })?;

        Ok(Self {
            event_id,
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            event_type: event.event_type().to_string(),
            event_version: event.version(),
            occurred_at: event.occurred_at(),
            payload,
        })
    }
}

/// A durably persisted event with its assigned stream position.
///
/// Sequence numbers are assigned by the store during append: 1-based,
/// stream-scoped, contiguous and immutable. `recorded_at` is the wall-clock
/// time the store accepted the event; `occurred_at` is business time carried
/// over from the domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: Uuid,
    pub aggregate_id: AggregateId,
    pub aggregate_type: String,

    /// Monotonically increasing position in the aggregate stream.
    pub sequence_number: u64,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,

    pub payload: JsonValue,
}

impl StoredEvent {
    /// Convert a stored event into the envelope shape delivered to
    /// subscribers.
    pub fn to_envelope(&self) -> EventEnvelope<JsonValue> {
        EventEnvelope::new(
            self.event_id,
            self.aggregate_id,
            self.aggregate_type.clone(),
            self.event_type.clone(),
            self.sequence_number,
            self.recorded_at,
            self.payload.clone(),
        )
    }
}

/// Event store operation error.
///
/// These are infrastructure failures (storage, concurrency, stream shape),
/// as opposed to domain errors (validation, invariants).
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// Expected-version mismatch on append: another writer committed in
    /// between. Recoverable by retrying the full load-mutate-save cycle.
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    /// The stream already belongs to a different aggregate type.
    #[error("aggregate type mismatch: {0}")]
    AggregateTypeMismatch(String),

    /// Invalid event data or batch shape.
    #[error("invalid append: {0}")]
    InvalidAppend(String),

    /// A loaded stream violated its ordering invariants (gap, duplicate or
    /// foreign event). Signals a corrupted or mismatched store.
    #[error("corrupt event stream: {0}")]
    CorruptStream(String),

    /// The storage backend failed (connection, pool, I/O).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Append-only event store keyed by aggregate id.
///
/// Streams hold the full ordered history of one aggregate. Implementations
/// must:
/// - enforce optimistic concurrency against the current stream version
/// - assign contiguous sequence numbers starting at `current_version + 1`
/// - persist a batch atomically (all events or none)
/// - keep the aggregate type stable across a stream
/// - return events in strict sequence order from `load_stream`, and an
///   empty stream (never an error) for an unknown id
pub trait EventStore: Send + Sync {
    /// Append events to an aggregate stream (append-only).
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError>;

    /// Load the full stream for an aggregate id.
    fn load_stream(&self, aggregate_id: AggregateId) -> Result<EventStream, EventStoreError>;
}

impl<S> EventStore for Arc<S>
where
    S: EventStore + ?Sized,
{
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).append(events, expected_version)
    }

    fn load_stream(&self, aggregate_id: AggregateId) -> Result<EventStream, EventStoreError> {
        (**self).load_stream(aggregate_id)
    }
}
