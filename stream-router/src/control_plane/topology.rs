//! Parent-link topology events and the listener identity they map to.

use crate::api::message::RemoteAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkEventKind {
    Add,
    Del,
}

/// Topology change issued by the scheduler for one parent replica.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLinkEvent {
    pub parent_name: String,
    pub host: String,
    pub port: u16,
    #[serde(rename = "type")]
    pub kind: LinkEventKind,
}

impl ParentLinkEvent {
    pub fn add(parent_name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            parent_name: parent_name.into(),
            host: host.into(),
            port,
            kind: LinkEventKind::Add,
        }
    }

    pub fn del(parent_name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            parent_name: parent_name.into(),
            host: host.into(),
            port,
            kind: LinkEventKind::Del,
        }
    }

    pub fn remote_address(&self) -> RemoteAddress {
        RemoteAddress::new(self.host.clone(), self.port)
    }

    pub fn listener_key(&self) -> ListenerKey {
        ListenerKey {
            parent_name: self.parent_name.clone(),
            address: self.remote_address(),
        }
    }
}

/// At most one live listener exists per key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerKey {
    pub parent_name: String,
    pub address: RemoteAddress,
}

impl ListenerKey {
    pub fn new(parent_name: impl Into<String>, address: RemoteAddress) -> Self {
        Self {
            parent_name: parent_name.into(),
            address,
        }
    }
}

impl fmt::Display for ListenerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.parent_name, self.address)
    }
}

/// What a single topology event did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopologyOutcome {
    Added(ListenerKey),
    AlreadyPresent(ListenerKey),
    Removed(ListenerKey),
    NotPresent(ListenerKey),
}

impl TopologyOutcome {
    pub fn key(&self) -> &ListenerKey {
        match self {
            TopologyOutcome::Added(key)
            | TopologyOutcome::AlreadyPresent(key)
            | TopologyOutcome::Removed(key)
            | TopologyOutcome::NotPresent(key) => key,
        }
    }
}
