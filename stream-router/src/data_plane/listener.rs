//! Inbound listener contract.

use crate::api::config::ListenerConfig;
use crate::api::message::{NodeIdentity, RemoteAddress};
use crate::data_plane::dispatcher::Dispatcher;
use crate::error::ListenerError;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerState {
    Constructed,
    Active,
    Closing,
    Closed,
}

/// Merged construction options for one listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenerOptions {
    pub config: ListenerConfig,
    pub remote_address: RemoteAddress,
    /// Parent node the messages originate from; passed to consumers.
    pub origin_node_name: String,
    /// Node this listener receives on behalf of.
    pub local_node: NodeIdentity,
}

/// Delivers an ordered stream of `(flow_context, message)` pairs from exactly
/// one origin address.
///
/// `fetch` must return promptly: the router polls every listener from one
/// shared thread.
pub trait Listener: Send + Sync {
    /// Installs the dispatch callback; moves `Constructed -> Active`.
    fn register_dispatcher(&self, dispatcher: Dispatcher);

    /// Dispatches currently available messages and returns how many.
    /// A no-op returning `0` once closed.
    fn fetch(&self) -> Result<usize, ListenerError>;

    /// Graceful bounded drain when `force` is `false`, immediate release otherwise.
    fn close(&self, force: bool);

    fn state(&self) -> ListenerState;
}

pub trait ListenerFactory: Send + Sync {
    fn create(&self, options: ListenerOptions) -> Result<Arc<dyn Listener>, ListenerError>;
}
