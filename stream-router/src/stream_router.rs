/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use crate::api::config::{ListenerConfig, ProducerConfig, RouterSettings};
use crate::api::message::{Message, NodeIdentity, RemoteAddress};
use crate::control_plane::flow_table::FlowTable;
use crate::control_plane::lifecycle::{
    begin_start, begin_stop, ensure_not_stopped, LifecycleState, StartOutcome,
};
use crate::control_plane::topology::{LinkEventKind, ListenerKey, ParentLinkEvent, TopologyOutcome};
use crate::data_plane::dispatcher::{ConsumerCallback, ConsumerId, ConsumerRegistry, Dispatcher};
use crate::data_plane::ingress_registry::ListenerRegistry;
use crate::data_plane::listener::{ListenerFactory, ListenerOptions};
use crate::data_plane::producer::{Producer, ProducerFactory, StatisticsSink};
use crate::error::RouterError;
use crate::observability::events;
use crate::routing::flow_context::FlowContext;
use crate::routing::flow_resolution::{resolve_flow, FlowSource};
use crate::runtime::poll_runtime::spawn_poll_loop;
use arc_swap::ArcSwap;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

const STREAM_ROUTER_TAG: &str = "StreamRouter:";
const STREAM_ROUTER_FN_NEW_TAG: &str = "new():";
const STREAM_ROUTER_FN_CONFIGURE_LISTENERS_TAG: &str = "configure_listeners():";
const STREAM_ROUTER_FN_SEND_MESSAGE_TAG: &str = "send_message():";
const STREAM_ROUTER_FN_STOP_TAG: &str = "stop():";
const COMPONENT: &str = "stream_router";

/// Result of a successful [`StreamRouter::send_message`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Handed to the producer on `flow`.
    Produced { flow: String, source: FlowSource },
    /// The producer has no downstream targets; nothing was produced.
    NoDownstreamTargets,
}

/// Node-local router between upstream listeners, application consumers and
/// one downstream producer.
///
/// All methods take `&self`; share the router behind an `Arc` to call it from
/// consumers or other threads.
pub struct StreamRouter {
    name: String,
    node: NodeIdentity,
    settings: RouterSettings,
    listener_factory: Arc<dyn ListenerFactory>,
    producer_factory: Arc<dyn ProducerFactory>,
    flows: ArcSwap<FlowTable>,
    listeners: ListenerRegistry,
    consumers: Arc<ConsumerRegistry>,
    dispatcher: Dispatcher,
    producer: RwLock<Option<Arc<dyn Producer>>>,
    // Serialises topology mutations, producer replacement and stop.
    // Reentrant: consumers running on the poll thread may call back in.
    topology_lock: ReentrantMutex<()>,
    lifecycle: Mutex<LifecycleState>,
    running: Arc<AtomicBool>,
    poll_thread: Mutex<Option<JoinHandle<()>>>,
}

impl StreamRouter {
    pub fn new(
        node: impl Into<NodeIdentity>,
        listener_factory: Arc<dyn ListenerFactory>,
        producer_factory: Arc<dyn ProducerFactory>,
    ) -> Self {
        Self::with_settings(
            node,
            RouterSettings::default(),
            listener_factory,
            producer_factory,
        )
    }

    pub fn with_settings(
        node: impl Into<NodeIdentity>,
        settings: RouterSettings,
        listener_factory: Arc<dyn ListenerFactory>,
        producer_factory: Arc<dyn ProducerFactory>,
    ) -> Self {
        let node = node.into();
        let name = format!("{STREAM_ROUTER_TAG}:{node}:");
        debug!("{name}:{STREAM_ROUTER_FN_NEW_TAG} StreamRouter created");
        info!(
            event = events::ROUTER_CREATED,
            component = COMPONENT,
            node = %node,
            poll_interval_us = settings.poll_interval_us,
            "stream router created"
        );

        let consumers = Arc::new(ConsumerRegistry::new());
        Self {
            name,
            node,
            settings,
            listener_factory,
            producer_factory,
            flows: ArcSwap::from_pointee(FlowTable::new()),
            listeners: ListenerRegistry::new(),
            dispatcher: Dispatcher::new(consumers.clone()),
            consumers,
            producer: RwLock::new(None),
            topology_lock: ReentrantMutex::new(()),
            lifecycle: Mutex::new(LifecycleState::NotStarted),
            running: Arc::new(AtomicBool::new(false)),
            poll_thread: Mutex::new(None),
        }
    }

    /// Installs `table`, replacing the previous one wholesale.
    ///
    /// A `Some` default overrides whatever default the table carries. The
    /// default is not checked against the table until a send falls back to it.
    pub fn configure_flows(&self, mut table: FlowTable, default_flow: Option<String>) {
        if default_flow.is_some() {
            table.set_default_flow(default_flow);
        }
        info!(
            event = events::ROUTER_FLOWS_CONFIGURED,
            component = COMPONENT,
            node = %self.node,
            flows = table.len(),
            default_flow = table.default_flow().unwrap_or("-"),
            "flow table installed"
        );
        self.flows.store(Arc::new(table));
    }

    /// Parses and installs a JSON flow table, see [`FlowTable::from_json_str`].
    pub fn configure_flows_from_json(&self, document: &str) -> Result<(), RouterError> {
        let table = FlowTable::from_json_str(document)?;
        self.configure_flows(table, None);
        Ok(())
    }

    /// Builds the producer and registers `statistics_sink` on it. The producer
    /// is started right away; with no targets it stays dormant.
    ///
    /// A producer configured earlier is closed gracefully and replaced.
    pub fn configure_producer(
        &self,
        statistics_sink: StatisticsSink,
        config: &ProducerConfig,
        downstream_targets: &[String],
        node_name: &str,
    ) -> Result<(), RouterError> {
        config.validate()?;
        let _topology = self.topology_lock.lock();
        ensure_not_stopped(*self.lifecycle.lock())?;

        let producer =
            self.producer_factory
                .create(config, downstream_targets, &NodeIdentity::new(node_name))?;
        producer.register_statistics_listener(statistics_sink);
        producer.start()?;

        let previous = self.producer.write().replace(producer);
        if let Some(previous) = previous {
            info!(
                event = events::ROUTER_PRODUCER_REPLACED,
                component = COMPONENT,
                node = %self.node,
                "closing previous producer"
            );
            previous.close(false);
        }

        info!(
            event = events::ROUTER_PRODUCER_CONFIGURED,
            component = COMPONENT,
            node = %self.node,
            targets = downstream_targets.len(),
            "producer configured"
        );
        Ok(())
    }

    /// [`Self::configure_producer`] with the `producer` section of the
    /// router's settings.
    pub fn configure_producer_with_defaults(
        &self,
        statistics_sink: StatisticsSink,
        downstream_targets: &[String],
        node_name: &str,
    ) -> Result<(), RouterError> {
        self.configure_producer(
            statistics_sink,
            &self.settings.producer,
            downstream_targets,
            node_name,
        )
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Applies topology events in order and reports what each one did.
    ///
    /// The first listener that cannot be constructed aborts the call: earlier
    /// events stay applied and later ones are not looked at.
    pub fn configure_listeners(
        &self,
        config: &ListenerConfig,
        link_events: &[ParentLinkEvent],
        node_name: &str,
    ) -> Result<Vec<TopologyOutcome>, RouterError> {
        config.validate()?;
        let mut outcomes = Vec::with_capacity(link_events.len());
        for link_event in link_events {
            debug!(
                "{}:{STREAM_ROUTER_FN_CONFIGURE_LISTENERS_TAG} {:?} {}@{}",
                self.name,
                link_event.kind,
                link_event.parent_name,
                link_event.remote_address()
            );
            let outcome = match link_event.kind {
                LinkEventKind::Add => self.add_listener(config, link_event, node_name)?,
                LinkEventKind::Del => self.remove_listener(link_event.listener_key()),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// [`Self::configure_listeners`] with the `listener` section of the
    /// router's settings.
    pub fn configure_listeners_with_defaults(
        &self,
        link_events: &[ParentLinkEvent],
        node_name: &str,
    ) -> Result<Vec<TopologyOutcome>, RouterError> {
        self.configure_listeners(&self.settings.listener, link_events, node_name)
    }

    fn add_listener(
        &self,
        config: &ListenerConfig,
        link_event: &ParentLinkEvent,
        node_name: &str,
    ) -> Result<TopologyOutcome, RouterError> {
        let _topology = self.topology_lock.lock();
        ensure_not_stopped(*self.lifecycle.lock())?;

        let key = link_event.listener_key();
        let inserted = self
            .listeners
            .insert_with(key.clone(), || {
                let listener = self.listener_factory.create(ListenerOptions {
                    config: config.clone(),
                    remote_address: key.address.clone(),
                    origin_node_name: key.parent_name.clone(),
                    local_node: NodeIdentity::new(node_name),
                })?;
                listener.register_dispatcher(self.dispatcher.clone());
                Ok(listener)
            })
            .map_err(|source| {
                error!(
                    event = events::TOPOLOGY_LISTENER_CREATE_FAILED,
                    component = COMPONENT,
                    node = %self.node,
                    listener = %key,
                    err = %source,
                    "unable to construct listener"
                );
                RouterError::Topology {
                    parent: key.parent_name.clone(),
                    address: key.address.clone(),
                    source,
                }
            })?;

        if inserted {
            info!(
                event = events::TOPOLOGY_LISTENER_ADDED,
                component = COMPONENT,
                node = %self.node,
                listener = %key,
                "listener added"
            );
            Ok(TopologyOutcome::Added(key))
        } else {
            debug!(
                event = events::TOPOLOGY_LISTENER_ALREADY_PRESENT,
                component = COMPONENT,
                node = %self.node,
                listener = %key,
                "listener already present, add ignored"
            );
            Ok(TopologyOutcome::AlreadyPresent(key))
        }
    }

    fn remove_listener(&self, key: ListenerKey) -> TopologyOutcome {
        let removed = {
            let _topology = self.topology_lock.lock();
            self.listeners.remove(&key)
        };

        let Some(listener) = removed else {
            debug!(
                event = events::TOPOLOGY_LISTENER_NOT_PRESENT,
                component = COMPONENT,
                node = %self.node,
                listener = %key,
                "no listener to remove, del ignored"
            );
            return TopologyOutcome::NotPresent(key);
        };

        // Closed outside the topology lock: a graceful drain dispatches to
        // consumers, which may themselves reconfigure the topology.
        listener.close(false);
        info!(
            event = events::TOPOLOGY_LISTENER_REMOVED,
            component = COMPONENT,
            node = %self.node,
            listener = %key,
            "listener removed"
        );
        TopologyOutcome::Removed(key)
    }

    /// Appends a consumer. The same callback registered twice runs twice.
    pub fn register_consumer(&self, callback: ConsumerCallback) -> ConsumerId {
        let id = self.consumers.register(callback);
        debug!(
            event = events::ROUTER_CONSUMER_REGISTERED,
            component = COMPONENT,
            node = %self.node,
            consumer = %id,
            "consumer registered"
        );
        id
    }

    /// Dispatch handle shared with every listener this router creates.
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Launches the poll thread on first call.
    pub fn start_listening(&self) -> Result<StartOutcome, RouterError> {
        let mut lifecycle = self.lifecycle.lock();
        let outcome = begin_start(&mut lifecycle)?;
        if outcome == StartOutcome::AlreadyRunning {
            return Ok(outcome);
        }

        self.running.store(true, Ordering::Release);
        match spawn_poll_loop(
            self.node.to_string(),
            self.running.clone(),
            self.listeners.shared(),
            self.settings.poll_interval(),
        ) {
            Ok(handle) => {
                *self.poll_thread.lock() = Some(handle);
                Ok(outcome)
            }
            Err(err) => {
                self.running.store(false, Ordering::Release);
                *lifecycle = LifecycleState::NotStarted;
                Err(RouterError::PollThread(err))
            }
        }
    }

    /// Resolves the outbound flow and hands `message` to the producer.
    ///
    /// Called from inside a consumer without an explicit flow, the flow of the
    /// inbound message being dispatched wins over the table default.
    pub fn send_message(
        &self,
        message: Message,
        flow_name: Option<&str>,
    ) -> Result<SendOutcome, RouterError> {
        let Some(producer) = self.producer.read().clone() else {
            return Err(RouterError::StreamingNotConfigured);
        };

        if producer.downstream_targets().is_empty() {
            debug!(
                event = events::SEND_NO_DOWNSTREAM_TARGETS,
                component = COMPONENT,
                node = %self.node,
                "producer has no downstream targets, message not produced"
            );
            return Ok(SendOutcome::NoDownstreamTargets);
        }

        let inherited = FlowContext::current();
        let table = self.flows.load();
        let resolved = resolve_flow(&table, flow_name, inherited.as_ref())?;

        debug!(
            "{}:{STREAM_ROUTER_FN_SEND_MESSAGE_TAG} producing on flow {:?} ({:?})",
            self.name,
            resolved.definition.name(),
            resolved.source
        );
        producer.produce(&resolved.definition, message)?;

        Ok(SendOutcome::Produced {
            flow: resolved.definition.name().to_string(),
            source: resolved.source,
        })
    }

    /// Tears the router down for good.
    ///
    /// Every listener is closed with `force`, consumers are cleared and the
    /// producer is closed before the poll thread is joined. Called from a
    /// consumer on the poll thread, the join is skipped and the thread exits
    /// after its current sweep.
    pub fn stop(&self, force: bool) {
        let listeners = {
            let _topology = self.topology_lock.lock();
            if !begin_stop(&mut self.lifecycle.lock()) {
                debug!("{}:{STREAM_ROUTER_FN_STOP_TAG} already stopped", self.name);
                return;
            }
            self.running.store(false, Ordering::Release);
            self.listeners.drain_all()
        };

        info!(
            event = events::ROUTER_STOP,
            component = COMPONENT,
            node = %self.node,
            force,
            listeners = listeners.len(),
            "stopping stream router"
        );

        for (key, listener) in &listeners {
            debug!("{}:{STREAM_ROUTER_FN_STOP_TAG} closing listener {key}", self.name);
            listener.close(force);
        }
        self.consumers.clear();

        // Taken only now: replies sent by consumers during a graceful drain
        // still need the producer.
        let producer = self.producer.write().take();
        if let Some(producer) = producer {
            producer.close(force);
        }

        let Some(handle) = self.poll_thread.lock().take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            warn!(
                event = events::ROUTER_STOP_FROM_POLL_THREAD,
                component = COMPONENT,
                node = %self.node,
                "stop called from the poll thread, not joining it"
            );
            return;
        }
        if handle.join().is_err() {
            error!(
                event = events::POLL_THREAD_PANICKED,
                component = COMPONENT,
                node = %self.node,
                "poll thread panicked"
            );
        }
    }

    /// Forgets every listener without closing it and returns how many were
    /// abandoned. Only for when the underlying sockets are already gone.
    pub fn reset_listeners(&self) -> usize {
        let abandoned = {
            let _topology = self.topology_lock.lock();
            self.listeners.drain_all().len()
        };
        warn!(
            event = events::ROUTER_RESET_LISTENERS,
            component = COMPONENT,
            node = %self.node,
            abandoned,
            "listener map reset without closing listeners"
        );
        abandoned
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listener(&self, parent_name: &str, address: &RemoteAddress) -> bool {
        self.listeners
            .contains(&ListenerKey::new(parent_name, address.clone()))
    }

    pub fn listener_keys(&self) -> Vec<ListenerKey> {
        let mut keys: Vec<_> = self.listeners.snapshot().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }

    pub fn has_producer(&self) -> bool {
        self.producer.read().is_some()
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        *self.lifecycle.lock()
    }

    pub fn is_listening(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn node_name(&self) -> &str {
        self.node.as_str()
    }

    pub fn flow_table(&self) -> Arc<FlowTable> {
        self.flows.load_full()
    }
}

impl Drop for StreamRouter {
    fn drop(&mut self) {
        if self.lifecycle_state() != LifecycleState::Stopped {
            self.stop(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SendOutcome, StreamRouter};
    use crate::api::config::{ListenerConfig, ProducerConfig};
    use crate::api::message::{Message, NodeIdentity, RemoteAddress};
    use crate::control_plane::flow_table::{FlowDefinition, FlowEdge, FlowTable};
    use crate::control_plane::lifecycle::{LifecycleState, StartOutcome};
    use crate::control_plane::topology::{ListenerKey, ParentLinkEvent, TopologyOutcome};
    use crate::data_plane::dispatcher::Dispatcher;
    use crate::data_plane::listener::{Listener, ListenerFactory, ListenerOptions, ListenerState};
    use crate::data_plane::producer::{
        Producer, ProducerFactory, SendStatistics, StatisticsSink,
    };
    use crate::error::{ListenerError, ProducerError, RouterError};
    use crate::routing::flow_context::FlowContext;
    use crate::routing::flow_resolution::FlowSource;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Default)]
    struct StubListener {
        closed_with: Mutex<Option<bool>>,
    }

    impl Listener for StubListener {
        fn register_dispatcher(&self, _dispatcher: Dispatcher) {}

        fn fetch(&self) -> Result<usize, ListenerError> {
            Ok(0)
        }

        fn close(&self, force: bool) {
            *self.closed_with.lock() = Some(force);
        }

        fn state(&self) -> ListenerState {
            ListenerState::Active
        }
    }

    #[derive(Default)]
    struct StubListenerFactory {
        created: Mutex<Vec<Arc<StubListener>>>,
        fail_for: Option<String>,
    }

    impl ListenerFactory for StubListenerFactory {
        fn create(&self, options: ListenerOptions) -> Result<Arc<dyn Listener>, ListenerError> {
            if self.fail_for.as_deref() == Some(options.origin_node_name.as_str()) {
                return Err(ListenerError::Transport("connection refused".to_string()));
            }
            let listener = Arc::new(StubListener::default());
            self.created.lock().push(listener.clone());
            Ok(listener)
        }
    }

    struct StubProducer {
        targets: Vec<String>,
        produced: Arc<Mutex<Vec<(String, Message)>>>,
    }

    impl Producer for StubProducer {
        fn register_statistics_listener(&self, _sink: StatisticsSink) {}

        fn start(&self) -> Result<(), ProducerError> {
            Ok(())
        }

        fn produce(&self, flow: &FlowDefinition, message: Message) -> Result<(), ProducerError> {
            self.produced.lock().push((flow.name().to_string(), message));
            Ok(())
        }

        fn close(&self, _force: bool) {}

        fn downstream_targets(&self) -> &[String] {
            &self.targets
        }
    }

    #[derive(Default)]
    struct StubProducerFactory {
        produced: Arc<Mutex<Vec<(String, Message)>>>,
    }

    impl ProducerFactory for StubProducerFactory {
        fn create(
            &self,
            _config: &ProducerConfig,
            downstream_targets: &[String],
            _node: &NodeIdentity,
        ) -> Result<Arc<dyn Producer>, ProducerError> {
            Ok(Arc::new(StubProducer {
                targets: downstream_targets.to_vec(),
                produced: self.produced.clone(),
            }))
        }
    }

    fn router() -> (StreamRouter, Arc<StubListenerFactory>, Arc<StubProducerFactory>) {
        let listeners = Arc::new(StubListenerFactory::default());
        let producers = Arc::new(StubProducerFactory::default());
        let router = StreamRouter::new("nodeA", listeners.clone(), producers.clone());
        router.configure_flows(
            FlowTable::new()
                .with_flow(FlowDefinition::new("default", vec![FlowEdge::new("nodeB")]))
                .with_flow(FlowDefinition::new("replies", vec![FlowEdge::new("nodeB")])),
            Some("default".to_string()),
        );
        (router, listeners, producers)
    }

    fn sink() -> StatisticsSink {
        Arc::new(|_: &SendStatistics| {})
    }

    #[test]
    fn send_without_producer_is_not_configured() {
        let (router, _, _) = router();

        assert!(matches!(
            router.send_message(json!(1), None),
            Err(RouterError::StreamingNotConfigured)
        ));
    }

    #[test]
    fn explicit_flow_is_produced_once() {
        let (router, _, producers) = router();
        router
            .configure_producer(sink(), &ProducerConfig::default(), &["nodeB".to_string()], "nodeA")
            .unwrap();

        let outcome = router.send_message(json!({"x": 1}), Some("replies")).unwrap();

        assert_eq!(
            outcome,
            SendOutcome::Produced {
                flow: "replies".to_string(),
                source: FlowSource::Explicit
            }
        );
        assert_eq!(
            *producers.produced.lock(),
            vec![("replies".to_string(), json!({"x": 1}))]
        );
    }

    #[test]
    fn inherited_flow_beats_default() {
        let (router, _, producers) = router();
        router
            .configure_producer(sink(), &ProducerConfig::default(), &["nodeB".to_string()], "nodeA")
            .unwrap();

        let outcome = FlowContext::new("replies")
            .enter(|| router.send_message(json!(2), None))
            .unwrap();

        assert!(matches!(
            outcome,
            SendOutcome::Produced {
                source: FlowSource::Inherited,
                ..
            }
        ));
        assert_eq!(producers.produced.lock()[0].0, "replies");
    }

    #[test]
    fn failed_add_keeps_earlier_events_and_skips_later_ones() {
        let listeners = Arc::new(StubListenerFactory {
            fail_for: Some("bad".to_string()),
            ..StubListenerFactory::default()
        });
        let router = StreamRouter::new(
            "nodeA",
            listeners.clone(),
            Arc::new(StubProducerFactory::default()),
        );

        let result = router.configure_listeners(
            &ListenerConfig::default(),
            &[
                ParentLinkEvent::add("p1", "h", 1),
                ParentLinkEvent::add("bad", "h", 2),
                ParentLinkEvent::add("p3", "h", 3),
            ],
            "nodeA",
        );

        assert!(matches!(
            result,
            Err(RouterError::Topology { ref parent, .. }) if parent == "bad"
        ));
        assert_eq!(
            router.listener_keys(),
            vec![ListenerKey::new("p1", RemoteAddress::new("h", 1))]
        );
        assert_eq!(listeners.created.lock().len(), 1);
    }

    #[test]
    fn del_closes_gracefully_and_reset_abandons() {
        let (router, listeners, _) = router();
        let outcomes = router
            .configure_listeners(
                &ListenerConfig::default(),
                &[
                    ParentLinkEvent::add("p1", "h", 1),
                    ParentLinkEvent::add("p1", "h", 2),
                    ParentLinkEvent::del("p1", "h", 1),
                    ParentLinkEvent::del("p1", "h", 1),
                ],
                "nodeA",
            )
            .unwrap();

        let key = ListenerKey::new("p1", RemoteAddress::new("h", 1));
        assert_eq!(
            outcomes,
            vec![
                TopologyOutcome::Added(key.clone()),
                TopologyOutcome::Added(ListenerKey::new("p1", RemoteAddress::new("h", 2))),
                TopologyOutcome::Removed(key.clone()),
                TopologyOutcome::NotPresent(key),
            ]
        );
        assert_eq!(*listeners.created.lock()[0].closed_with.lock(), Some(false));

        assert_eq!(router.reset_listeners(), 1);
        assert_eq!(router.listener_count(), 0);
        assert_eq!(*listeners.created.lock()[1].closed_with.lock(), None);
    }

    #[test]
    fn lifecycle_is_one_shot() {
        let (router, _, _) = router();

        assert_eq!(router.start_listening().unwrap(), StartOutcome::Launched);
        assert_eq!(router.start_listening().unwrap(), StartOutcome::AlreadyRunning);
        router.stop(false);

        assert_eq!(router.lifecycle_state(), LifecycleState::Stopped);
        assert!(!router.is_listening());
        assert!(matches!(router.start_listening(), Err(RouterError::Stopped)));
        assert!(matches!(
            router.configure_producer(sink(), &ProducerConfig::default(), &[], "nodeA"),
            Err(RouterError::Stopped)
        ));
        router.stop(true);
    }
}
