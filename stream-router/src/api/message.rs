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

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque application payload carried through the router.
pub type Message = serde_json::Value;

/// Name of the pipeline node owning a router.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIdentity(String);

impl NodeIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeIdentity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for NodeIdentity {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RemoteAddress {
    pub host: String,
    pub port: u16,
}

impl RemoteAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for RemoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Unit of transfer between two nodes: one payload on one flow edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: Uuid,
    pub origin_node: String,
    pub flow: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    pub payload: Message,
}

impl Envelope {
    pub fn new(
        origin_node: &NodeIdentity,
        flow: &str,
        target: &str,
        transform: Option<&str>,
        payload: Message,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin_node: origin_node.to_string(),
            flow: flow.to_string(),
            target: target.to_string(),
            transform: transform.map(str::to_string),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Envelope, NodeIdentity, RemoteAddress};
    use serde_json::json;

    #[test]
    fn envelopes_get_distinct_ids() {
        let node = NodeIdentity::new("nodeA");
        let first = Envelope::new(&node, "default", "nodeB", None, json!({"x": 1}));
        let second = Envelope::new(&node, "default", "nodeB", None, json!({"x": 1}));

        assert_ne!(first.id, second.id);
        assert_eq!(first.origin_node, "nodeA");
    }

    #[test]
    fn envelope_omits_missing_transform_on_the_wire() {
        let node = NodeIdentity::new("nodeA");
        let envelope = Envelope::new(&node, "f", "nodeB", None, json!(null));
        let encoded = serde_json::to_value(&envelope).expect("serialize envelope");

        assert!(encoded.get("transform").is_none());
        assert_eq!(encoded["flow"], "f");
    }

    #[test]
    fn remote_addresses_compare_by_host_and_port() {
        assert_eq!(RemoteAddress::new("h", 1), RemoteAddress::new("h", 1));
        assert_ne!(RemoteAddress::new("h", 1), RemoteAddress::new("h", 2));
    }
}
