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

//! Data-plane layer.
//!
//! Owns the listener and producer contracts, the listener registry, consumer
//! dispatch and egress forwarder pooling. The in-memory bus is the reference
//! transport both sides are tested against.
//!
//! ```
//! use std::sync::Arc;
//! use stream_router::{
//!     EgressProducerFactory, FlowDefinition, FlowEdge, FlowTable, Message, MemoryBus,
//!     ParentLinkEvent, ProducerConfig, RemoteAddress, SendStatistics, StreamRouter,
//! };
//!
//! let bus = MemoryBus::new();
//! let upstream = StreamRouter::new(
//!     "nodeA",
//!     Arc::new(bus.listener_factory()),
//!     Arc::new(EgressProducerFactory::new(Arc::new(
//!         bus.transport(RemoteAddress::new("nodeA", 7000)),
//!     ))),
//! );
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
//! let downstream = StreamRouter::new(
//!     "nodeB",
//!     Arc::new(bus.listener_factory()),
//!     Arc::new(EgressProducerFactory::new(Arc::new(
//!         bus.transport(RemoteAddress::new("nodeB", 7001)),
//!     ))),
//! );
//! downstream.register_consumer(Arc::new(|_: &Message, _: &str| -> anyhow::Result<()> { Ok(()) }));
//! downstream
//!     .configure_listeners(
//!         &Default::default(),
//!         &[ParentLinkEvent::add("nodeA", "nodeA", 7000)],
//!         "nodeB",
//!     )
//!     .unwrap();
//!
//! // Listeners and forwarders are torn down with their router.
//! downstream.stop(false);
//! upstream.stop(false);
//! ```

pub(crate) mod dispatcher;
pub(crate) mod egress_pool;
pub(crate) mod egress_worker;
pub(crate) mod ingress_listener;
pub(crate) mod ingress_registry;
pub(crate) mod listener;
pub(crate) mod memory_bus;
pub(crate) mod producer;
