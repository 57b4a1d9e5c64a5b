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

//! # stream-router
//!
//! `stream-router` is the node-local router of a streaming pipeline. It attaches
//! one [`Listener`] per upstream parent replica, hands every inbound message to
//! the registered consumers and fans outbound messages out to downstream nodes
//! through a single [`Producer`], picking the route from a [`FlowTable`].
//!
//! A reply sent synchronously from inside a consumer inherits the flow of the
//! message being handled unless an explicit flow is given.
//!
//! ## Quick start
//!
//! ```
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//! use parking_lot::Mutex;
//! use serde_json::json;
//! use stream_router::{
//!     EgressProducerFactory, FlowDefinition, FlowEdge, FlowTable, ListenerConfig, MemoryBus,
//!     Message, ParentLinkEvent, ProducerConfig, RemoteAddress, SendStatistics, StreamRouter,
//! };
//!
//! let bus = MemoryBus::new();
//! let router = |node: &str, port: u16| {
//!     StreamRouter::new(
//!         node,
//!         Arc::new(bus.listener_factory()),
//!         Arc::new(EgressProducerFactory::new(Arc::new(
//!             bus.transport(RemoteAddress::new(node, port)),
//!         ))),
//!     )
//! };
//!
//! let upstream = router("nodeA", 7000);
//! upstream.configure_flows(
//!     FlowTable::new().with_flow(FlowDefinition::new("ingest", vec![FlowEdge::new("nodeB")])),
//!     Some("ingest".to_string()),
//! );
//! upstream
//!     .configure_producer(
//!         Arc::new(|_: &SendStatistics| {}),
//!         &ProducerConfig::default(),
//!         &["nodeB".to_string()],
//!         "nodeA",
//!     )
//!     .unwrap();
//!
//! let downstream = router("nodeB", 7001);
//! let received = Arc::new(Mutex::new(Vec::new()));
//! let sink = received.clone();
//! downstream.register_consumer(Arc::new(move |message: &Message, origin: &str| -> anyhow::Result<()> {
//!     sink.lock().push((origin.to_string(), message.clone()));
//!     Ok(())
//! }));
//! downstream
//!     .configure_listeners(
//!         &ListenerConfig::default(),
//!         &[ParentLinkEvent::add("nodeA", "nodeA", 7000)],
//!         "nodeB",
//!     )
//!     .unwrap();
//! downstream.start_listening().unwrap();
//!
//! upstream.send_message(json!({"x": 1}), None).unwrap();
//!
//! let deadline = Instant::now() + Duration::from_secs(5);
//! while received.lock().is_empty() && Instant::now() < deadline {
//!     std::thread::sleep(Duration::from_millis(1));
//! }
//! assert_eq!(*received.lock(), vec![("nodeA".to_string(), json!({"x": 1}))]);
//!
//! downstream.stop(false);
//! upstream.stop(false);
//! ```
//!
//! ## Internal architecture map
//!
//! - API: messages, addresses and serde-backed configuration
//! - Control plane: flow table, parent-link topology vocabulary and lifecycle
//! - Routing: flow selection and the task-local inherited flow context
//! - Data plane: listener/producer contracts, dispatch, ingress registry and
//!   the egress forwarder pool, plus the in-memory bus transport
//! - Runtime: the ingress poll thread and egress worker thread boundaries
//!
//! ## Observability model
//!
//! The crate uses `tracing` for logs/events, with stable `event` names from
//! [`observability::events`]. Library code emits events and does not
//! initialize a global subscriber. Binaries and tests are responsible for
//! one-time `tracing_subscriber` initialization at process boundaries.

pub mod api;
pub use api::config::{ListenerConfig, ProducerConfig, RouterSettings};
pub use api::message::{Envelope, Message, NodeIdentity, RemoteAddress};

mod control_plane;
pub use control_plane::flow_table::{FlowDefinition, FlowEdge, FlowTable};
pub use control_plane::lifecycle::{LifecycleState, StartOutcome};
pub use control_plane::topology::{LinkEventKind, ListenerKey, ParentLinkEvent, TopologyOutcome};

mod data_plane;
pub use data_plane::dispatcher::{ConsumerCallback, ConsumerId, DispatchReport, Dispatcher};
pub use data_plane::egress_pool::{EgressProducer, EgressProducerFactory};
pub use data_plane::ingress_listener::BusListener;
pub use data_plane::listener::{Listener, ListenerFactory, ListenerOptions, ListenerState};
pub use data_plane::memory_bus::{BusListenerFactory, BusTransport, MemoryBus};
pub use data_plane::producer::{
    DeliveryStatus, DownstreamTransport, Producer, ProducerFactory, SendStatistics,
    StatisticsSink,
};

mod error;
pub use error::{ConsumerCallbackError, ListenerError, ProducerError, RouterError, TransportError};

#[doc(hidden)]
pub mod observability;

mod routing;
pub use routing::flow_context::FlowContext;
pub use routing::flow_resolution::FlowSource;

mod runtime;

mod stream_router;
pub use stream_router::{SendOutcome, StreamRouter};
