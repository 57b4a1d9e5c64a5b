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

//! Routing layer.
//!
//! Decides which flow an outbound message travels on. An explicit flow name
//! wins, then the flow inherited from the inbound message currently being
//! dispatched, then the table default.
//!
//! The inherited flow lives in a task-local [`FlowContext`] that dispatch enters
//! for exactly the duration of one delivery, so replies issued on another
//! thread or task never observe it.
//!
//! ```
//! use stream_router::FlowContext;
//!
//! assert!(FlowContext::current().is_none());
//! let seen = FlowContext::new("ingest").enter(|| FlowContext::current());
//! assert_eq!(seen.unwrap().flow_name(), "ingest");
//! assert!(FlowContext::current().is_none());
//! ```

pub(crate) mod flow_context;
pub(crate) mod flow_resolution;
