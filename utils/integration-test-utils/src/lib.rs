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

//! Probes and fixtures shared by the stream-router integration tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::thread;
use std::time::{Duration, Instant};
use stream_router::{
    Dispatcher, DownstreamTransport, Envelope, FlowContext, FlowDefinition, Listener,
    ListenerError, ListenerFactory, ListenerOptions, ListenerState, Message, NodeIdentity,
    Producer, ProducerConfig, ProducerError, ProducerFactory, RemoteAddress, SendStatistics,
    StatisticsSink, TransportError,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Installs a test-writer `tracing` subscriber once per test binary.
/// Honours `RUST_LOG`, defaulting to `warn`.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Polls `condition` every millisecond until it holds or `timeout` elapses.
pub fn wait_for(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

/// Listener fed by the test through [`ScriptedListener::push`].
pub struct ScriptedListener {
    options: ListenerOptions,
    dispatcher: Mutex<Option<Dispatcher>>,
    pending: Mutex<VecDeque<(String, Message)>>,
    state: Mutex<ListenerState>,
    close_calls: Mutex<Vec<bool>>,
    fetch_calls: AtomicUsize,
    fail_fetch: AtomicBool,
}

impl ScriptedListener {
    fn new(options: ListenerOptions) -> Self {
        Self {
            options,
            dispatcher: Mutex::new(None),
            pending: Mutex::new(VecDeque::new()),
            state: Mutex::new(ListenerState::Constructed),
            close_calls: Mutex::new(Vec::new()),
            fetch_calls: AtomicUsize::new(0),
            fail_fetch: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &ListenerOptions {
        &self.options
    }

    /// Queues a message tagged with `flow` for the next fetch.
    pub fn push(&self, flow: &str, message: Message) {
        self.pending.lock().push_back((flow.to_string(), message));
    }

    /// `force` of every `close` call, in order.
    pub fn close_calls(&self) -> Vec<bool> {
        self.close_calls.lock().clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    fn deliver(&self, limit: usize) -> usize {
        let Some(dispatcher) = self.dispatcher.lock().clone() else {
            return 0;
        };

        let mut delivered = 0;
        while delivered < limit {
            let Some((flow, message)) = self.pending.lock().pop_front() else {
                break;
            };
            dispatcher.dispatch(
                FlowContext::new(flow),
                &message,
                &self.options.origin_node_name,
            );
            delivered += 1;
        }
        delivered
    }
}

impl Listener for ScriptedListener {
    fn register_dispatcher(&self, dispatcher: Dispatcher) {
        *self.dispatcher.lock() = Some(dispatcher);
        let mut state = self.state.lock();
        if *state == ListenerState::Constructed {
            *state = ListenerState::Active;
        }
    }

    fn fetch(&self) -> Result<usize, ListenerError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ListenerError::Transport("scripted fetch failure".to_string()));
        }
        if *self.state.lock() != ListenerState::Active {
            return Ok(0);
        }
        Ok(self.deliver(self.options.config.max_batch))
    }

    fn close(&self, force: bool) {
        self.close_calls.lock().push(force);
        *self.state.lock() = ListenerState::Closing;
        if force {
            self.pending.lock().clear();
        } else {
            self.deliver(self.options.config.drain_limit);
        }
        *self.state.lock() = ListenerState::Closed;
    }

    fn state(&self) -> ListenerState {
        *self.state.lock()
    }
}

/// Builds [`ScriptedListener`]s and keeps a handle to each one.
#[derive(Default)]
pub struct RecordingListenerFactory {
    created: Mutex<Vec<Arc<ScriptedListener>>>,
    refuse: Mutex<Vec<String>>,
}

impl RecordingListenerFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every later `create` for `parent_name` fail.
    pub fn refuse_parent(&self, parent_name: &str) {
        self.refuse.lock().push(parent_name.to_string());
    }

    pub fn created(&self) -> Vec<Arc<ScriptedListener>> {
        self.created.lock().clone()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }

    /// Most recently created listener for `(parent_name, address)`.
    pub fn listener(&self, parent_name: &str, address: &RemoteAddress) -> Option<Arc<ScriptedListener>> {
        self.created
            .lock()
            .iter()
            .rev()
            .find(|listener| {
                listener.options.origin_node_name == parent_name
                    && &listener.options.remote_address == address
            })
            .cloned()
    }
}

impl ListenerFactory for RecordingListenerFactory {
    fn create(&self, options: ListenerOptions) -> Result<Arc<dyn Listener>, ListenerError> {
        if self.refuse.lock().contains(&options.origin_node_name) {
            return Err(ListenerError::Transport(format!(
                "connection to {} refused",
                options.remote_address
            )));
        }
        debug!(
            origin = options.origin_node_name.as_str(),
            address = %options.remote_address,
            "creating scripted listener"
        );
        let listener = Arc::new(ScriptedListener::new(options));
        self.created.lock().push(listener.clone());
        Ok(listener)
    }
}

/// One `produce` call as seen by a [`RecordingProducer`].
#[derive(Clone, Debug, PartialEq)]
pub struct ProducedMessage {
    pub flow: FlowDefinition,
    pub message: Message,
}

pub struct RecordingProducer {
    node: NodeIdentity,
    config: ProducerConfig,
    downstream_targets: Vec<String>,
    produced: Mutex<Vec<ProducedMessage>>,
    sinks: Mutex<Vec<StatisticsSink>>,
    started: AtomicBool,
    close_calls: Mutex<Vec<bool>>,
}

impl RecordingProducer {
    pub fn node(&self) -> &NodeIdentity {
        &self.node
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }

    pub fn produced(&self) -> Vec<ProducedMessage> {
        self.produced.lock().clone()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> Vec<bool> {
        self.close_calls.lock().clone()
    }

    pub fn statistics_sink_count(&self) -> usize {
        self.sinks.lock().len()
    }
}

impl Producer for RecordingProducer {
    fn register_statistics_listener(&self, sink: StatisticsSink) {
        self.sinks.lock().push(sink);
    }

    fn start(&self) -> Result<(), ProducerError> {
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn produce(&self, flow: &FlowDefinition, message: Message) -> Result<(), ProducerError> {
        if !self.close_calls.lock().is_empty() {
            return Err(ProducerError::Closed);
        }
        self.produced.lock().push(ProducedMessage {
            flow: flow.clone(),
            message,
        });
        Ok(())
    }

    fn close(&self, force: bool) {
        self.close_calls.lock().push(force);
    }

    fn downstream_targets(&self) -> &[String] {
        &self.downstream_targets
    }
}

#[derive(Default)]
pub struct RecordingProducerFactory {
    created: Mutex<Vec<Arc<RecordingProducer>>>,
}

impl RecordingProducerFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn created(&self) -> Vec<Arc<RecordingProducer>> {
        self.created.lock().clone()
    }

    pub fn latest(&self) -> Option<Arc<RecordingProducer>> {
        self.created.lock().last().cloned()
    }
}

impl ProducerFactory for RecordingProducerFactory {
    fn create(
        &self,
        config: &ProducerConfig,
        downstream_targets: &[String],
        node: &NodeIdentity,
    ) -> Result<Arc<dyn Producer>, ProducerError> {
        let producer = Arc::new(RecordingProducer {
            node: node.clone(),
            config: config.clone(),
            downstream_targets: downstream_targets.to_vec(),
            produced: Mutex::new(Vec::new()),
            sinks: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
            close_calls: Mutex::new(Vec::new()),
        });
        self.created.lock().push(producer.clone());
        Ok(producer)
    }
}

/// Downstream transport that records envelopes; targets listed in
/// `unreachable` fail.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Envelope>>,
    unreachable: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn mark_unreachable(&self, target: &str) {
        self.unreachable.lock().push(target.to_string());
    }

    pub fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, target: &str) -> Vec<Envelope> {
        self.sent
            .lock()
            .iter()
            .filter(|envelope| envelope.target == target)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl DownstreamTransport for RecordingTransport {
    async fn send(&self, envelope: Envelope) -> Result<(), TransportError> {
        if self.unreachable.lock().contains(&envelope.target) {
            return Err(TransportError::Other(format!(
                "{} unreachable",
                envelope.target
            )));
        }
        self.sent.lock().push(envelope);
        Ok(())
    }
}

/// Statistics sink collecting everything it is handed.
pub fn recording_statistics_sink() -> (StatisticsSink, Arc<Mutex<Vec<SendStatistics>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let sink: StatisticsSink = Arc::new(move |statistics: &SendStatistics| {
        recorder.lock().push(statistics.clone())
    });
    (sink, seen)
}

/// JSON payload helper used across scenarios.
pub fn payload(n: i64) -> Message {
    serde_json::json!({ "n": n })
}
