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

//! Control-plane layer.
//!
//! Owns the compiled flow table, the parent-link topology vocabulary and the
//! one-shot router lifecycle. Topology events are idempotent: a duplicate `Add`
//! and a `Del` for an unknown link both resolve to named outcomes instead of
//! errors.
//!
//! ```
//! use stream_router::{FlowDefinition, FlowEdge, FlowTable, ParentLinkEvent};
//!
//! let table = FlowTable::new()
//!     .with_flow(FlowDefinition::new("default", vec![FlowEdge::new("nodeB")]))
//!     .with_default_flow("default");
//! assert!(table.get("default").is_some());
//!
//! let add = ParentLinkEvent::add("p1", "h", 1);
//! assert_eq!(add.remote_address().to_string(), "h:1");
//! ```

pub(crate) mod flow_table;
pub(crate) mod lifecycle;
pub(crate) mod topology;
