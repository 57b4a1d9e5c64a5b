//! Outbound flow selection policy.

use crate::control_plane::flow_table::{FlowDefinition, FlowTable};
use crate::error::RouterError;
use crate::observability::{events, fields};
use crate::routing::flow_context::FlowContext;
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "flow_resolution";

/// Where a resolved flow name came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowSource {
    Explicit,
    Inherited,
    Default,
}

#[derive(Clone, Debug)]
pub(crate) struct ResolvedFlow {
    pub(crate) definition: Arc<FlowDefinition>,
    pub(crate) source: FlowSource,
}

/// Picks the flow name: explicit, then inherited, then the table default.
fn select_flow_name<'a>(
    table: &'a FlowTable,
    explicit: Option<&'a str>,
    inherited: Option<&'a FlowContext>,
) -> Option<(&'a str, FlowSource)> {
    if let Some(name) = explicit {
        return Some((name, FlowSource::Explicit));
    }
    if let Some(context) = inherited {
        return Some((context.flow_name(), FlowSource::Inherited));
    }
    table
        .default_flow()
        .map(|name| (name, FlowSource::Default))
}

pub(crate) fn resolve_flow(
    table: &FlowTable,
    explicit: Option<&str>,
    inherited: Option<&FlowContext>,
) -> Result<ResolvedFlow, RouterError> {
    let Some((name, source)) = select_flow_name(table, explicit, inherited) else {
        warn!(
            event = events::FLOW_RESOLUTION_FAILED,
            component = COMPONENT,
            reason = "missing_default_flow",
            "no flow could be selected for outbound message"
        );
        return Err(RouterError::MissingDefaultFlow);
    };

    let Some(definition) = table.get(name) else {
        warn!(
            event = events::FLOW_RESOLUTION_FAILED,
            component = COMPONENT,
            flow = name,
            source = ?source,
            reason = "unknown_flow",
            "selected flow is not in the flow table"
        );
        return Err(RouterError::UnknownFlow(name.to_string()));
    };

    debug!(
        event = events::FLOW_RESOLVED,
        component = COMPONENT,
        flow = name,
        source = ?source,
        inherited = fields::format_flow(inherited.map(FlowContext::flow_name)),
        "resolved outbound flow"
    );

    Ok(ResolvedFlow { definition, source })
}

#[cfg(test)]
mod tests {
    use super::{resolve_flow, FlowSource};
    use crate::control_plane::flow_table::{FlowDefinition, FlowEdge, FlowTable};
    use crate::error::RouterError;
    use crate::routing::flow_context::FlowContext;

    fn table() -> FlowTable {
        FlowTable::new()
            .with_flow(FlowDefinition::new("default", vec![FlowEdge::new("nodeB")]))
            .with_flow(FlowDefinition::new("reply", vec![FlowEdge::new("nodeC")]))
            .with_default_flow("default")
    }

    #[test]
    fn explicit_name_beats_inherited_and_default() {
        let inherited = FlowContext::new("reply");
        let resolved = resolve_flow(&table(), Some("default"), Some(&inherited)).unwrap();

        assert_eq!(resolved.definition.name(), "default");
        assert_eq!(resolved.source, FlowSource::Explicit);
    }

    #[test]
    fn inherited_context_beats_default() {
        let inherited = FlowContext::new("reply");
        let resolved = resolve_flow(&table(), None, Some(&inherited)).unwrap();

        assert_eq!(resolved.definition.name(), "reply");
        assert_eq!(resolved.source, FlowSource::Inherited);
    }

    #[test]
    fn default_is_used_last() {
        let resolved = resolve_flow(&table(), None, None).unwrap();
        assert_eq!(resolved.source, FlowSource::Default);
    }

    #[test]
    fn no_candidate_is_missing_default_flow() {
        let bare = FlowTable::new().with_flow(FlowDefinition::new("x", vec![]));
        assert!(matches!(
            resolve_flow(&bare, None, None),
            Err(RouterError::MissingDefaultFlow)
        ));
    }

    #[test]
    fn inherited_flow_absent_from_table_is_unknown() {
        let inherited = FlowContext::new("gone");
        match resolve_flow(&table(), None, Some(&inherited)) {
            Err(RouterError::UnknownFlow(name)) => assert_eq!(name, "gone"),
            other => panic!("expected UnknownFlow, got {other:?}"),
        }
    }
}
