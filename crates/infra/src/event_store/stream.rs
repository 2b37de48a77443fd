use cataloger_core::AggregateId;

use super::r#trait::{EventStoreError, StoredEvent};

/// The ordered, replayable event history of one aggregate id.
///
/// Construction validates the stream invariants once, so every consumer can
/// rely on them: all events belong to the stream's aggregate id and carry
/// 1-based contiguous sequence numbers (no gaps, no duplicates). The version
/// of the stream equals its event count; a count of 0 means the aggregate
/// does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventStream {
    aggregate_id: AggregateId,
    events: Vec<StoredEvent>,
}

impl EventStream {
    pub fn empty(aggregate_id: AggregateId) -> Self {
        Self {
            aggregate_id,
            events: Vec::new(),
        }
    }

    /// Build a stream from events already ordered by sequence number,
    /// rejecting anything that violates the stream invariants.
    pub fn new(
        aggregate_id: AggregateId,
        events: Vec<StoredEvent>,
    ) -> Result<Self, EventStoreError> {
        for (idx, event) in events.iter().enumerate() {
            if event.aggregate_id != aggregate_id {
                return Err(EventStoreError::CorruptStream(format!(
                    "stream for {aggregate_id} contains event for {} at index {idx}",
                    event.aggregate_id
                )));
            }
            let expected_sequence = idx as u64 + 1;
            if event.sequence_number != expected_sequence {
                return Err(EventStoreError::CorruptStream(format!(
                    "stream for {aggregate_id} has sequence {} at index {idx}, expected {expected_sequence}",
                    event.sequence_number
                )));
            }
        }

        Ok(Self {
            aggregate_id,
            events,
        })
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    /// Current version of the aggregate: the number of committed events.
    pub fn version(&self) -> u64 {
        self.events.len() as u64
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[StoredEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&StoredEvent> {
        self.events.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StoredEvent> {
        self.events.iter()
    }

    pub fn into_events(self) -> Vec<StoredEvent> {
        self.events
    }
}

impl IntoIterator for EventStream {
    type Item = StoredEvent;
    type IntoIter = std::vec::IntoIter<StoredEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
