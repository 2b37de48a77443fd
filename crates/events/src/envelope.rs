use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cataloger_core::AggregateId;

/// Envelope for an event: the payload plus its ordering and identity
/// metadata.
///
/// This is the unit delivered to subscribers and the logical shape of what
/// the store persists.
///
/// Invariants:
/// - `sequence_number` is 1-based and strictly increasing per aggregate
///   stream, with no gaps and no duplicates.
/// - `recorded_at` is the wall-clock time the store accepted the event;
///   business time lives inside the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    aggregate_id: AggregateId,
    aggregate_type: String,

    event_type: String,

    /// Monotonically increasing position in the aggregate stream.
    sequence_number: u64,

    recorded_at: DateTime<Utc>,

    payload: E,
}

impl<E> EventEnvelope<E> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_id: Uuid,
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        event_type: impl Into<String>,
        sequence_number: u64,
        recorded_at: DateTime<Utc>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            event_type: event_type.into(),
            sequence_number,
            recorded_at,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value as JsonValue, json};

    #[test]
    fn envelope_serde_round_trip() {
        let envelope = EventEnvelope::new(
            Uuid::now_v7(),
            AggregateId::new(),
            "product.simple",
            "product.created",
            1,
            Utc::now(),
            json!({ "sku": "SKU-001" }),
        );

        let serialized = serde_json::to_string(&envelope).unwrap();
        let deserialized: EventEnvelope<JsonValue> = serde_json::from_str(&serialized).unwrap();

        assert_eq!(envelope, deserialized);
    }
}
