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

//! Field formatters shared by log call sites.

use crate::api::message::{Envelope, Message};
use std::any::Any;

const PAYLOAD_PREVIEW_LIMIT: usize = 96;

pub fn format_envelope_id(envelope: &Envelope) -> String {
    envelope.id.hyphenated().to_string()
}

/// Renders a payload for logs, truncated to keep single events readable.
pub fn format_payload(message: &Message) -> String {
    let rendered = message.to_string();
    if rendered.len() <= PAYLOAD_PREVIEW_LIMIT {
        return rendered;
    }

    let mut cut = PAYLOAD_PREVIEW_LIMIT;
    while !rendered.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &rendered[..cut])
}

pub fn format_flow(flow: Option<&str>) -> &str {
    flow.unwrap_or("<none>")
}

/// Extracts the human readable part of a panic payload.
pub fn format_panic_payload(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
