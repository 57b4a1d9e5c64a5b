//! Compiled flow plans keyed by flow name.

use crate::error::RouterError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// One directed edge of a flow: a downstream target and an optional transform
/// applied by whoever sits on the receiving side.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowEdge {
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

impl FlowEdge {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: impl Into<String>) -> Self {
        self.transform = Some(transform.into());
        self
    }
}

/// Named fan-out plan. Immutable once built; the router never looks inside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowDefinition {
    name: String,
    edges: Vec<FlowEdge>,
}

impl FlowDefinition {
    pub fn new(name: impl Into<String>, edges: Vec<FlowEdge>) -> Self {
        Self {
            name: name.into(),
            edges,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.edges.iter().map(|edge| edge.target.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct FlowTableDocument {
    #[serde(default)]
    default_flow: Option<String>,
    flows: BTreeMap<String, Vec<FlowEdge>>,
}

#[derive(Clone, Debug, Default)]
pub struct FlowTable {
    flows: HashMap<String, Arc<FlowDefinition>>,
    default_flow: Option<String>,
}

impl FlowTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a compiled table of the form
    /// `{"default_flow": "f", "flows": {"f": [{"target": "nodeB"}]}}`.
    pub fn from_json_str(document: &str) -> Result<Self, RouterError> {
        let document: FlowTableDocument = serde_json::from_str(document)
            .map_err(|err| RouterError::Config(format!("unable to parse flow table: {err}")))?;

        let mut table = Self::new();
        for (name, edges) in document.flows {
            table.insert(FlowDefinition::new(name, edges));
        }
        table.default_flow = document.default_flow;
        Ok(table)
    }

    pub fn with_flow(mut self, flow: FlowDefinition) -> Self {
        self.insert(flow);
        self
    }

    pub fn with_default_flow(mut self, name: impl Into<String>) -> Self {
        self.default_flow = Some(name.into());
        self
    }

    /// Adds or replaces a flow while the table is still being assembled.
    pub fn insert(&mut self, flow: FlowDefinition) -> Option<Arc<FlowDefinition>> {
        self.flows.insert(flow.name.clone(), Arc::new(flow))
    }

    pub(crate) fn set_default_flow(&mut self, name: Option<String>) {
        self.default_flow = name;
    }

    pub fn get(&self, name: &str) -> Option<Arc<FlowDefinition>> {
        self.flows.get(name).cloned()
    }

    /// Name of the fallback flow. Not checked against the table until used.
    pub fn default_flow(&self) -> Option<&str> {
        self.default_flow.as_deref()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn flow_names(&self) -> impl Iterator<Item = &str> {
        self.flows.keys().map(String::as_str)
    }
}
