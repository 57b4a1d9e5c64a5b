//! Fan-in point between listeners and registered consumers.

use crate::api::message::Message;
use crate::error::ConsumerCallbackError;
use crate::observability::{events, fields};
use crate::routing::flow_context::FlowContext;
use arc_swap::ArcSwap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, trace, warn};

const COMPONENT: &str = "dispatcher";

/// Application callback receiving `(message, origin_parent)`.
pub type ConsumerCallback = Arc<dyn Fn(&Message, &str) -> anyhow::Result<()> + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsumerId(u64);

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "consumer-{}", self.0)
    }
}

#[derive(Clone)]
struct RegisteredConsumer {
    id: ConsumerId,
    callback: ConsumerCallback,
}

/// Copy-on-write list of consumers, in registration order.
pub(crate) struct ConsumerRegistry {
    consumers: ArcSwap<Vec<RegisteredConsumer>>,
    next_id: AtomicU64,
}

impl ConsumerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            consumers: ArcSwap::from_pointee(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Appends without de-duplication: the same callback registered twice runs twice.
    pub(crate) fn register(&self, callback: ConsumerCallback) -> ConsumerId {
        let id = ConsumerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = RegisteredConsumer { id, callback };
        self.consumers.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(entry.clone());
            next
        });
        id
    }

    pub(crate) fn clear(&self) {
        self.consumers.store(Arc::new(Vec::new()));
    }

    pub(crate) fn len(&self) -> usize {
        self.consumers.load().len()
    }
}

/// Outcome of delivering one message to every consumer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failures: Vec<ConsumerCallbackError>,
}

impl DispatchReport {
    pub fn invoked(&self) -> usize {
        self.delivered + self.failures.len()
    }
}

/// Handle listeners use to hand inbound messages to the router.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ConsumerRegistry>,
}

impl Dispatcher {
    pub(crate) fn new(registry: Arc<ConsumerRegistry>) -> Self {
        Self { registry }
    }

    /// Runs every consumer, in order, inside `flow_context`.
    ///
    /// A consumer returning an error or panicking is logged and skipped; the
    /// remaining consumers still run. The context is gone once this returns.
    pub fn dispatch(
        &self,
        flow_context: FlowContext,
        message: &Message,
        origin_parent: &str,
    ) -> DispatchReport {
        let consumers = self.registry.consumers.load_full();

        flow_context.enter(|| {
            let mut report = DispatchReport::default();
            for consumer in consumers.iter() {
                match Self::invoke(consumer, message, origin_parent) {
                    Ok(()) => report.delivered += 1,
                    Err(failure) => report.failures.push(failure),
                }
            }
            report
        })
    }

    fn invoke(
        consumer: &RegisteredConsumer,
        message: &Message,
        origin_parent: &str,
    ) -> Result<(), ConsumerCallbackError> {
        trace!(
            component = COMPONENT,
            consumer = %consumer.id,
            origin = origin_parent,
            "invoking consumer"
        );

        match catch_unwind(AssertUnwindSafe(|| (consumer.callback)(message, origin_parent))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                warn!(
                    event = events::DISPATCH_CONSUMER_FAILED,
                    component = COMPONENT,
                    consumer = %consumer.id,
                    origin = origin_parent,
                    payload = %fields::format_payload(message),
                    err = %format!("{err:#}"),
                    "consumer callback returned an error"
                );
                Err(ConsumerCallbackError {
                    consumer: consumer.id,
                    origin: origin_parent.to_string(),
                    reason: format!("{err:#}"),
                })
            }
            Err(panic) => {
                let reason = fields::format_panic_payload(panic.as_ref());
                error!(
                    event = events::DISPATCH_CONSUMER_PANICKED,
                    component = COMPONENT,
                    consumer = %consumer.id,
                    origin = origin_parent,
                    payload = %fields::format_payload(message),
                    reason = reason.as_str(),
                    "consumer callback panicked"
                );
                Err(ConsumerCallbackError {
                    consumer: consumer.id,
                    origin: origin_parent.to_string(),
                    reason: format!("panicked: {reason}"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConsumerCallback, ConsumerRegistry, Dispatcher};
    use crate::api::message::Message;
    use crate::routing::flow_context::FlowContext;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    fn recording_consumer(log: Arc<Mutex<Vec<String>>>, tag: &'static str) -> ConsumerCallback {
        Arc::new(move |message: &Message, origin: &str| {
            let flow = FlowContext::current().map(|ctx| ctx.flow_name().to_string());
            log.lock()
                .push(format!("{tag}:{origin}:{message}:{}", flow.unwrap_or_default()));
            Ok(())
        })
    }

    #[test]
    fn consumers_run_in_registration_order_with_flow_context() {
        let registry = Arc::new(ConsumerRegistry::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        registry.register(recording_consumer(log.clone(), "first"));
        registry.register(recording_consumer(log.clone(), "second"));

        let report = Dispatcher::new(registry).dispatch(
            FlowContext::new("ingest"),
            &json!(1),
            "p1",
        );

        assert_eq!(report.delivered, 2);
        assert_eq!(
            *log.lock(),
            vec!["first:p1:1:ingest".to_string(), "second:p1:1:ingest".to_string()]
        );
        assert!(FlowContext::current().is_none());
    }

    #[test]
    fn failing_and_panicking_consumers_do_not_stop_the_rest() {
        let registry = Arc::new(ConsumerRegistry::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        registry.register(recording_consumer(log.clone(), "a"));
        let failing = registry.register(Arc::new(
            |_: &Message, _: &str| -> anyhow::Result<()> { Err(anyhow::anyhow!("bad input")) },
        ));
        let panicking = registry.register(Arc::new(
            |_: &Message, _: &str| -> anyhow::Result<()> { panic!("consumer bug") },
        ));
        registry.register(recording_consumer(log.clone(), "d"));

        let report =
            Dispatcher::new(registry).dispatch(FlowContext::new("f"), &json!("m"), "p2");

        assert_eq!(report.delivered, 2);
        assert_eq!(report.invoked(), 4);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].consumer, failing);
        assert_eq!(report.failures[0].reason, "bad input");
        assert_eq!(report.failures[1].consumer, panicking);
        assert!(report.failures[1].reason.contains("consumer bug"));
        assert_eq!(log.lock().len(), 2);
        assert!(FlowContext::current().is_none());
    }

    #[test]
    fn duplicate_registration_invokes_twice() {
        let registry = Arc::new(ConsumerRegistry::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let consumer = recording_consumer(log.clone(), "dup");
        let first = registry.register(consumer.clone());
        let second = registry.register(consumer);

        Dispatcher::new(registry.clone()).dispatch(FlowContext::new("f"), &json!(0), "p");

        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn cleared_registry_delivers_nothing() {
        let registry = Arc::new(ConsumerRegistry::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        registry.register(recording_consumer(log.clone(), "gone"));
        registry.clear();

        let report = Dispatcher::new(registry).dispatch(FlowContext::new("f"), &json!(0), "p");

        assert_eq!(report.invoked(), 0);
        assert!(log.lock().is_empty());
    }
}
