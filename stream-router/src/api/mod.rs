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

//! API facade layer.
//!
//! Value types shared by the router and its collaborators: node identities,
//! remote addresses, messages and envelopes, plus the serde-backed settings the
//! scheduler hands to the router.
//!
//! ```
//! use stream_router::{ListenerConfig, RemoteAddress, RouterSettings};
//!
//! let settings = RouterSettings::from_json5_str(
//!     "{ poll_interval_us: 500, listener: { max_batch: 8 } }",
//! )
//! .unwrap();
//! assert_eq!(settings.listener.max_batch, 8);
//! assert_eq!(settings.listener.drain_limit, ListenerConfig::default().drain_limit);
//! assert_eq!(RemoteAddress::new("h", 1).to_string(), "h:1");
//! ```

pub mod config;
pub mod message;
