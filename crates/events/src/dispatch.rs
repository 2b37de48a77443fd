//! Event dispatch: delivery of committed events to registered handlers.
//!
//! The dispatcher is a plain registry resolved once at startup: for each
//! event type, an ordered list of handler registrations (descending
//! priority, ties in registration order). Delivery happens strictly after a
//! successful store append; a failing handler is isolated, logged,
//! reported and never blocks later handlers nor rolls back the append.
//!
//! Two delivery modes exist. `Inline` delivers before `dispatch` returns.
//! `Queued` hands the envelope to a single background worker thread over a
//! channel; a single FIFO consumer preserves per-aggregate event order while
//! guaranteeing eventual, not immediate, delivery.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use serde_json::Value as JsonValue;

use crate::envelope::EventEnvelope;

/// A subscriber invoked with committed event envelopes.
///
/// Handlers receive the serialized payload together with the owning
/// aggregate id and metadata, and deserialize the event types they care
/// about themselves.
pub trait EventHandler: Send + Sync {
    /// Stable handler name, used in failure reports and logs.
    fn name(&self) -> &'static str;

    fn handle(&self, envelope: &EventEnvelope<JsonValue>) -> anyhow::Result<()>;
}

/// Delivery mode for a single dispatch call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Deliver to every handler before returning.
    Inline,
    /// Enqueue for the background worker; eventual delivery, per-aggregate
    /// order preserved.
    Queued,
}

/// One handler's failure during inline delivery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("handler '{handler}' failed for '{event_type}': {error}")]
pub struct HandlerFailure {
    pub handler: &'static str,
    pub event_type: String,
    pub error: String,
}

/// Outcome of a dispatch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchReport {
    /// Inline delivery completed; failures are contained, never propagated.
    Delivered {
        delivered: usize,
        failures: Vec<HandlerFailure>,
    },
    /// Envelope was handed to the background worker. Failures on the worker
    /// are logged there.
    Queued,
}

impl DispatchReport {
    pub fn failures(&self) -> &[HandlerFailure] {
        match self {
            DispatchReport::Delivered { failures, .. } => failures,
            DispatchReport::Queued => &[],
        }
    }
}

/// Dispatch seam consumed by repositories.
pub trait EventDispatch: Send + Sync {
    fn dispatch(&self, envelope: EventEnvelope<JsonValue>, delivery: Delivery) -> DispatchReport;
}

impl<D> EventDispatch for Arc<D>
where
    D: EventDispatch + ?Sized,
{
    fn dispatch(&self, envelope: EventEnvelope<JsonValue>, delivery: Delivery) -> DispatchReport {
        (**self).dispatch(envelope, delivery)
    }
}

struct Registration {
    priority: i32,
    handler: Arc<dyn EventHandler>,
}

/// Resolved routing table: event type to registrations in delivery order.
struct Routes {
    by_type: HashMap<String, Vec<Registration>>,
}

impl Routes {
    fn deliver(&self, envelope: &EventEnvelope<JsonValue>) -> DispatchReport {
        let mut delivered = 0;
        let mut failures = Vec::new();

        if let Some(registrations) = self.by_type.get(envelope.event_type()) {
            for registration in registrations {
                match registration.handler.handle(envelope) {
                    Ok(()) => delivered += 1,
                    Err(error) => {
                        tracing::warn!(
                            handler = registration.handler.name(),
                            event_type = envelope.event_type(),
                            aggregate_id = %envelope.aggregate_id(),
                            sequence_number = envelope.sequence_number(),
                            %error,
                            "event handler failed; continuing with remaining handlers"
                        );
                        failures.push(HandlerFailure {
                            handler: registration.handler.name(),
                            event_type: envelope.event_type().to_string(),
                            error: error.to_string(),
                        });
                    }
                }
            }
        }

        DispatchReport::Delivered {
            delivered,
            failures,
        }
    }
}

/// Builds the handler registry, then freezes it into an [`EventDispatcher`].
///
/// Priorities are explicit per-registration integers with no further
/// semantics; higher runs first, equal priorities run in registration order.
#[derive(Default)]
pub struct EventDispatcherBuilder {
    by_type: HashMap<String, Vec<Registration>>,
}

impl EventDispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        mut self,
        event_type: impl Into<String>,
        priority: i32,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        self.by_type
            .entry(event_type.into())
            .or_default()
            .push(Registration { priority, handler });
        self
    }

    fn into_routes(mut self) -> Routes {
        for registrations in self.by_type.values_mut() {
            // Stable sort: ties keep registration order.
            registrations.sort_by_key(|r| std::cmp::Reverse(r.priority));
        }
        Routes {
            by_type: self.by_type,
        }
    }

    /// Inline-only dispatcher; `Queued` dispatches degrade to inline.
    pub fn build(self) -> EventDispatcher {
        EventDispatcher {
            routes: Arc::new(self.into_routes()),
            worker: None,
        }
    }

    /// Dispatcher with a background worker thread for queued delivery.
    pub fn build_with_worker(self) -> EventDispatcher {
        let routes = Arc::new(self.into_routes());
        let (sender, receiver) = mpsc::channel::<EventEnvelope<JsonValue>>();

        let worker_routes = Arc::clone(&routes);
        let handle = thread::spawn(move || {
            while let Ok(envelope) = receiver.recv() {
                // Failures are logged inside deliver; nothing to return here.
                let _ = worker_routes.deliver(&envelope);
            }
        });

        EventDispatcher {
            routes,
            worker: Some(QueueWorker { sender, handle }),
        }
    }
}

struct QueueWorker {
    sender: mpsc::Sender<EventEnvelope<JsonValue>>,
    handle: thread::JoinHandle<()>,
}

/// Priority-ordered event dispatcher.
pub struct EventDispatcher {
    routes: Arc<Routes>,
    worker: Option<QueueWorker>,
}

impl EventDispatcher {
    pub fn builder() -> EventDispatcherBuilder {
        EventDispatcherBuilder::new()
    }

    /// Stop the worker after it drains every queued envelope.
    ///
    /// Deterministic shutdown for processes and tests; a dispatcher dropped
    /// without calling this still terminates its worker once the channel
    /// disconnects.
    pub fn shutdown(mut self) {
        if let Some(worker) = self.worker.take() {
            drop(worker.sender);
            if worker.handle.join().is_err() {
                tracing::error!("dispatch worker panicked during shutdown");
            }
        }
    }
}

impl EventDispatch for EventDispatcher {
    fn dispatch(&self, envelope: EventEnvelope<JsonValue>, delivery: Delivery) -> DispatchReport {
        match delivery {
            Delivery::Inline => self.routes.deliver(&envelope),
            Delivery::Queued => match &self.worker {
                Some(worker) => {
                    if let Err(mpsc::SendError(envelope)) = worker.sender.send(envelope) {
                        // Worker gone (shutdown race); fall back to inline so
                        // the committed event is still delivered.
                        tracing::error!("dispatch queue disconnected; delivering inline");
                        return self.routes.deliver(&envelope);
                    }
                    DispatchReport::Queued
                }
                None => self.routes.deliver(&envelope),
            },
        }
    }
}
