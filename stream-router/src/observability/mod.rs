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

//! Shared `tracing` vocabulary.
//!
//! Every structured event emitted by the crate carries `event = <name>` from
//! [`events`] and a `component` field, so log assertions and dashboards can key
//! on stable identifiers instead of message text.

pub mod events;
pub mod fields;
