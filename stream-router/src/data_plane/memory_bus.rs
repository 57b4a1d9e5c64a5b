//! In-process transport connecting producers and listeners of several routers.

use crate::api::message::{Envelope, RemoteAddress};
use crate::data_plane::ingress_listener::BusListener;
use crate::data_plane::listener::{Listener, ListenerFactory, ListenerOptions};
use crate::data_plane::producer::DownstreamTransport;
use crate::error::{ListenerError, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tracing::debug;

const MEMORY_BUS_TAG: &str = "MemoryBus:";
const MEMORY_BUS_FN_SUBSCRIBE_TAG: &str = "subscribe:";
const MEMORY_BUS_FN_PUBLISH_TAG: &str = "publish:";
const MEMORY_BUS_FN_UNSUBSCRIBE_TAG: &str = "unsubscribe:";

type SubscriptionKey = (RemoteAddress, String);

/// Identifies one `subscribe` call, so a late `unsubscribe` from a closed
/// listener cannot remove the subscription that replaced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SubscriptionToken(u64);

struct Subscription {
    token: SubscriptionToken,
    sender: Sender<Envelope>,
}

/// Subscriptions keyed by `(publisher address, subscribing node)`.
///
/// A node holds at most one live subscription per publisher address; a second
/// parent naming the same address is rejected with
/// [`ListenerError::AlreadySubscribed`].
#[derive(Clone, Default)]
pub struct MemoryBus {
    subscriptions: Arc<Mutex<HashMap<SubscriptionKey, Subscription>>>,
    next_token: Arc<AtomicU64>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(
        &self,
        address: &RemoteAddress,
        node: &str,
        capacity: usize,
    ) -> Result<(SubscriptionToken, Receiver<Envelope>), ListenerError> {
        let mut subscriptions = self.subscriptions.lock();
        let key = (address.clone(), node.to_string());

        if let Some(existing) = subscriptions.get(&key) {
            if !existing.sender.is_closed() {
                return Err(ListenerError::AlreadySubscribed {
                    address: address.clone(),
                    node: node.to_string(),
                });
            }
            debug!("{MEMORY_BUS_TAG}:{MEMORY_BUS_FN_SUBSCRIBE_TAG} replacing stale subscription of {node:?} on {address}");
        }

        let (tx, rx) = mpsc::channel(capacity.max(1));
        let token = SubscriptionToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        subscriptions.insert(key, Subscription { token, sender: tx });
        Ok((token, rx))
    }

    /// Removes the subscription of `node` on `address` if it is still the one
    /// identified by `token`.
    pub(crate) fn unsubscribe(
        &self,
        address: &RemoteAddress,
        node: &str,
        token: SubscriptionToken,
    ) -> bool {
        let mut subscriptions = self.subscriptions.lock();
        let key = (address.clone(), node.to_string());
        match subscriptions.get(&key) {
            Some(current) if current.token == token => {
                subscriptions.remove(&key);
                true
            }
            Some(_) => {
                debug!("{MEMORY_BUS_TAG}:{MEMORY_BUS_FN_UNSUBSCRIBE_TAG} {node:?} on {address} already resubscribed, keeping it");
                false
            }
            None => false,
        }
    }

    /// Delivers `envelope` to the node named by its target, if it listens on `address`.
    pub fn publish(&self, address: &RemoteAddress, envelope: Envelope) -> Result<(), TransportError> {
        let mut subscriptions = self.subscriptions.lock();
        let key = (address.clone(), envelope.target.clone());

        let Some(subscription) = subscriptions.get(&key) else {
            return Err(TransportError::NoSubscriber {
                address: address.clone(),
                target: envelope.target,
            });
        };

        match subscription.sender.try_send(envelope) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(envelope)) => Err(TransportError::QueueFull(envelope.target)),
            Err(TrySendError::Closed(envelope)) => {
                subscriptions.remove(&key);
                debug!("{MEMORY_BUS_TAG}:{MEMORY_BUS_FN_PUBLISH_TAG} pruned closed subscription of {:?} on {address}", envelope.target);
                Err(TransportError::Disconnected(envelope.target))
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Transport publishing from `local_address`, for an [`crate::EgressProducer`].
    pub fn transport(&self, local_address: RemoteAddress) -> BusTransport {
        BusTransport {
            bus: self.clone(),
            local_address,
        }
    }

    pub fn listener_factory(&self) -> BusListenerFactory {
        BusListenerFactory { bus: self.clone() }
    }
}

pub struct BusTransport {
    bus: MemoryBus,
    local_address: RemoteAddress,
}

#[async_trait]
impl DownstreamTransport for BusTransport {
    async fn send(&self, envelope: Envelope) -> Result<(), TransportError> {
        self.bus.publish(&self.local_address, envelope)
    }
}

pub struct BusListenerFactory {
    bus: MemoryBus,
}

impl ListenerFactory for BusListenerFactory {
    fn create(&self, options: ListenerOptions) -> Result<Arc<dyn Listener>, ListenerError> {
        Ok(Arc::new(BusListener::subscribe(&self.bus, options)?))
    }
}
