//! Listener over a [`MemoryBus`] subscription.

use crate::api::message::Envelope;
use crate::data_plane::dispatcher::Dispatcher;
use crate::data_plane::listener::{Listener, ListenerOptions, ListenerState};
use crate::data_plane::memory_bus::{MemoryBus, SubscriptionToken};
use crate::error::ListenerError;
use crate::observability::{events, fields};
use crate::routing::flow_context::FlowContext;
use parking_lot::{Mutex, ReentrantMutex};
use tokio::sync::mpsc::{error::TryRecvError, Receiver};
use tracing::{debug, info};

const COMPONENT: &str = "ingress_listener";

pub struct BusListener {
    options: ListenerOptions,
    bus: MemoryBus,
    subscription: SubscriptionToken,
    inbox: Mutex<Option<Receiver<Envelope>>>,
    dispatcher: Mutex<Option<Dispatcher>>,
    state: Mutex<ListenerState>,
    // Held while dispatching so that fetch and the close-time drain never
    // interleave. Reentrant: a consumer may close its own listener.
    delivery: ReentrantMutex<()>,
}

impl BusListener {
    pub fn subscribe(bus: &MemoryBus, options: ListenerOptions) -> Result<Self, ListenerError> {
        let (subscription, inbox) = bus.subscribe(
            &options.remote_address,
            options.local_node.as_str(),
            options.config.queue_capacity,
        )?;

        debug!(
            component = COMPONENT,
            origin = options.origin_node_name.as_str(),
            address = %options.remote_address,
            node = %options.local_node,
            "subscribed to origin"
        );

        Ok(Self {
            options,
            bus: bus.clone(),
            subscription,
            inbox: Mutex::new(Some(inbox)),
            dispatcher: Mutex::new(None),
            state: Mutex::new(ListenerState::Constructed),
            delivery: ReentrantMutex::new(()),
        })
    }

    pub fn options(&self) -> &ListenerOptions {
        &self.options
    }

    fn pull(&self, limit: usize) -> Result<Vec<Envelope>, ListenerError> {
        let mut inbox = self.inbox.lock();
        let Some(receiver) = inbox.as_mut() else {
            return Ok(Vec::new());
        };

        let mut batch = Vec::new();
        while batch.len() < limit {
            match receiver.try_recv() {
                Ok(envelope) => batch.push(envelope),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if batch.is_empty() {
                        return Err(ListenerError::SubscriptionClosed(
                            self.options.remote_address.clone(),
                        ));
                    }
                    break;
                }
            }
        }
        Ok(batch)
    }

    fn deliver(&self, dispatcher: &Dispatcher, envelope: Envelope) {
        let origin = self.options.origin_node_name.as_str();

        debug!(
            event = events::INGRESS_RECEIVE,
            component = COMPONENT,
            origin,
            msg_id = %fields::format_envelope_id(&envelope),
            flow = envelope.flow.as_str(),
            sender = envelope.origin_node.as_str(),
            "received ingress message"
        );

        let Envelope { flow, payload, .. } = envelope;
        dispatcher.dispatch(FlowContext::new(flow), &payload, origin);
    }
}

impl Listener for BusListener {
    fn register_dispatcher(&self, dispatcher: Dispatcher) {
        *self.dispatcher.lock() = Some(dispatcher);

        let mut state = self.state.lock();
        if *state == ListenerState::Constructed {
            *state = ListenerState::Active;
        }
    }

    fn fetch(&self) -> Result<usize, ListenerError> {
        if *self.state.lock() != ListenerState::Active {
            return Ok(0);
        }
        let Some(dispatcher) = self.dispatcher.lock().clone() else {
            return Ok(0);
        };

        let _delivering = self.delivery.lock();
        let batch = self.pull(self.options.config.max_batch)?;
        let fetched = batch.len();
        for envelope in batch {
            self.deliver(&dispatcher, envelope);
        }
        Ok(fetched)
    }

    fn close(&self, force: bool) {
        {
            let mut state = self.state.lock();
            if matches!(*state, ListenerState::Closing | ListenerState::Closed) {
                return;
            }
            *state = ListenerState::Closing;
        }

        let mut drained = 0;
        if !force {
            let _delivering = self.delivery.lock();
            let dispatcher = self.dispatcher.lock().clone();
            if let (Some(dispatcher), Ok(pending)) =
                (dispatcher, self.pull(self.options.config.drain_limit))
            {
                drained = pending.len();
                for envelope in pending {
                    self.deliver(&dispatcher, envelope);
                }
            }
        }

        self.inbox.lock().take();
        self.bus.unsubscribe(
            &self.options.remote_address,
            self.options.local_node.as_str(),
            self.subscription,
        );
        *self.state.lock() = ListenerState::Closed;

        if drained > 0 {
            debug!(
                event = events::INGRESS_DRAIN_ON_CLOSE,
                component = COMPONENT,
                origin = self.options.origin_node_name.as_str(),
                drained,
                "delivered pending messages before close"
            );
        }
        info!(
            event = events::INGRESS_CLOSED,
            component = COMPONENT,
            origin = self.options.origin_node_name.as_str(),
            address = %self.options.remote_address,
            force,
            "listener closed"
        );
    }

    fn state(&self) -> ListenerState {
        *self.state.lock()
    }
}
