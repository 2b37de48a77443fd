//! Aggregate root contract for event-sourced domain models.
//!
//! An aggregate is a unit of consistency rebuilt entirely from its event
//! history. Mutation methods validate business rules, evolve in-memory state
//! and buffer exactly one pending event per logical change; the repository
//! drains that buffer on save and replays history on load.

use thiserror::Error;

use crate::error::{DomainError, DomainResult};
use crate::id::AggregateId;

/// Aggregate root marker + minimal interface.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Committed version of the aggregate: the stream count at load time,
    /// 0 for an aggregate that has never been persisted. Pending events do
    /// not count until they are appended.
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for an append.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (idempotent migrations, backfills).
    Any,
    /// Require the stream to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}

/// An aggregate kind received an event it cannot legally apply.
///
/// This is fatal for the load that encountered it: it signals a stream
/// written by a different aggregate kind or a deployment/versioning bug,
/// never a recoverable runtime condition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("aggregate kind '{aggregate_type}' cannot apply event '{event_type}'")]
pub struct UnknownEvent {
    pub aggregate_type: &'static str,
    pub event_type: String,
}

impl From<UnknownEvent> for DomainError {
    fn from(value: UnknownEvent) -> Self {
        DomainError::invariant(value.to_string())
    }
}

/// Bookkeeping shared by every event-sourced aggregate: the committed
/// version and the buffer of pending (not yet persisted) events.
///
/// Aggregates embed this next to their domain fields, the same way they
/// track any other state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateState<E> {
    version: u64,
    pending: Vec<E>,
}

impl<E> AggregateState<E> {
    pub fn new() -> Self {
        Self {
            version: 0,
            pending: Vec::new(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn pending(&self) -> &[E] {
        &self.pending
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn push_pending(&mut self, event: E) {
        self.pending.push(event);
    }

    /// Atomically take the pending buffer, leaving it empty.
    pub fn drain_pending(&mut self) -> Vec<E> {
        std::mem::take(&mut self.pending)
    }

    /// One historical event was applied during replay.
    pub fn mark_replayed(&mut self) {
        self.version += 1;
    }

    /// `appended` pending events were durably committed.
    pub fn mark_committed(&mut self, appended: u64) {
        self.version += appended;
    }
}

impl<E> Default for AggregateState<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Event-sourced aggregate execution semantics.
///
/// Implementors provide the blank construction path, access to the embedded
/// [`AggregateState`] and the per-kind `apply` switch; the lifecycle methods
/// (`record`, `replay`, `pop_events`) are provided and must not be
/// overridden.
pub trait EventSourcedAggregate: AggregateRoot {
    type Event: Clone + core::fmt::Debug;

    /// Stable aggregate-type identifier (e.g. "product.simple"). Stored with
    /// every event; streams never mix aggregate types.
    const AGGREGATE_TYPE: &'static str;

    /// Explicit rehydration construction path: a blank instance whose
    /// invariants hold trivially (empty/zero fields) until history is
    /// applied. Never used to hand out live aggregates directly.
    fn blank(id: AggregateId) -> Self;

    /// The untyped id under which this aggregate's stream is stored.
    fn aggregate_id(&self) -> AggregateId;

    fn state(&self) -> &AggregateState<Self::Event>;

    fn state_mut(&mut self) -> &mut AggregateState<Self::Event>;

    /// Evolve in-memory state from a single event.
    ///
    /// Covers exactly the events this kind can legally receive; anything
    /// else is [`UnknownEvent`]. Must stay deterministic and free of I/O.
    fn apply(&mut self, event: &Self::Event) -> Result<(), UnknownEvent>;

    /// Event type marking this kind's stream as logically deleted, if the
    /// kind supports deletion. Repositories treat a stream ending in this
    /// event as absent.
    fn deleted_event_type() -> Option<&'static str> {
        None
    }

    /// Apply a freshly raised event and buffer it as pending.
    ///
    /// State change and event emission are atomic within the calling
    /// mutation method: if `apply` rejects the event nothing is buffered.
    fn record(&mut self, event: Self::Event) -> DomainResult<()> {
        self.apply(&event)?;
        self.state_mut().push_pending(event);
        Ok(())
    }

    /// Rebuild state by applying historical events in ascending order.
    ///
    /// Used only for rehydration; bumps the committed version per event and
    /// never buffers pending events.
    fn replay<I>(&mut self, history: I) -> Result<(), UnknownEvent>
    where
        I: IntoIterator<Item = Self::Event>,
    {
        for event in history {
            self.apply(&event)?;
            self.state_mut().mark_replayed();
        }
        Ok(())
    }

    /// Drain the pending buffer in emission order.
    ///
    /// A second call before any new mutation returns an empty sequence.
    fn pop_events(&mut self) -> Vec<Self::Event> {
        self.state_mut().drain_pending()
    }

    fn has_pending_events(&self) -> bool {
        self.state().has_pending()
    }

    /// Called by the repository after a successful append.
    fn mark_committed(&mut self, appended: u64) {
        self.state_mut().mark_committed(appended);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum TickEvent {
        Ticked,
        Rejected,
    }

    #[derive(Debug)]
    struct TickCounter {
        id: AggregateId,
        ticks: u64,
        state: AggregateState<TickEvent>,
    }

    impl AggregateRoot for TickCounter {
        type Id = AggregateId;

        fn id(&self) -> &Self::Id {
            &self.id
        }

        fn version(&self) -> u64 {
            self.state.version()
        }
    }

    impl EventSourcedAggregate for TickCounter {
        type Event = TickEvent;

        const AGGREGATE_TYPE: &'static str = "test.tick_counter";

        fn blank(id: AggregateId) -> Self {
            Self {
                id,
                ticks: 0,
                state: AggregateState::new(),
            }
        }

        fn aggregate_id(&self) -> AggregateId {
            self.id
        }

        fn state(&self) -> &AggregateState<Self::Event> {
            &self.state
        }

        fn state_mut(&mut self) -> &mut AggregateState<Self::Event> {
            &mut self.state
        }

        fn apply(&mut self, event: &Self::Event) -> Result<(), UnknownEvent> {
            match event {
                TickEvent::Ticked => {
                    self.ticks += 1;
                    Ok(())
                }
                TickEvent::Rejected => Err(UnknownEvent {
                    aggregate_type: Self::AGGREGATE_TYPE,
                    event_type: "test.rejected".to_string(),
                }),
            }
        }
    }

    #[test]
    fn record_buffers_pending_without_bumping_version() {
        let mut counter = TickCounter::blank(AggregateId::new());
        counter.record(TickEvent::Ticked).unwrap();
        counter.record(TickEvent::Ticked).unwrap();

        assert_eq!(counter.ticks, 2);
        assert_eq!(counter.version(), 0);
        assert!(counter.has_pending_events());
    }

    #[test]
    fn pop_events_drains_once() {
        let mut counter = TickCounter::blank(AggregateId::new());
        counter.record(TickEvent::Ticked).unwrap();

        assert_eq!(counter.pop_events(), vec![TickEvent::Ticked]);
        assert!(counter.pop_events().is_empty());
    }

    #[test]
    fn replay_bumps_version_and_leaves_no_pending() {
        let mut counter = TickCounter::blank(AggregateId::new());
        counter
            .replay(vec![TickEvent::Ticked, TickEvent::Ticked, TickEvent::Ticked])
            .unwrap();

        assert_eq!(counter.ticks, 3);
        assert_eq!(counter.version(), 3);
        assert!(!counter.has_pending_events());
    }

    #[test]
    fn rejected_event_is_not_buffered() {
        let mut counter = TickCounter::blank(AggregateId::new());
        let err = counter.record(TickEvent::Rejected).unwrap_err();

        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert!(!counter.has_pending_events());
    }

    #[test]
    fn expected_version_exact_mismatch_is_conflict() {
        let err = ExpectedVersion::Exact(0).check(2).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(ExpectedVersion::Any.matches(7));
    }
}
