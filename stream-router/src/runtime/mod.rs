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

//! Runtime integration layer.
//!
//! Isolates thread boundaries: the single ingress poll thread per router and
//! the dedicated egress threads, each owning a current-thread Tokio runtime.
//! Nothing in here carries routing policy.
//!
//! ```ignore
//! use std::sync::Arc;
//! use stream_router::{MemoryBus, EgressProducerFactory, RemoteAddress, StreamRouter};
//!
//! let bus = MemoryBus::new();
//! let router = StreamRouter::new(
//!     "runtime-doc",
//!     Arc::new(bus.listener_factory()),
//!     Arc::new(EgressProducerFactory::new(Arc::new(bus.transport(RemoteAddress::new("h", 1))))),
//! );
//! // Launches the poll thread; stop joins it.
//! router.start_listening().unwrap();
//! router.stop(false);
//! ```

pub(crate) mod poll_runtime;
pub(crate) mod worker_runtime;
