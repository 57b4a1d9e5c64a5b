//! Egress producer owning one forwarder per downstream target.

use crate::api::config::ProducerConfig;
use crate::api::message::{Envelope, Message, NodeIdentity};
use crate::control_plane::flow_table::FlowDefinition;
use crate::data_plane::egress_worker::TargetForwarder;
use crate::data_plane::producer::{
    DownstreamTransport, Producer, ProducerFactory, SendStatistics, StatisticsSink,
    StatisticsSinks,
};
use crate::error::ProducerError;
use crate::observability::events;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const EGRESS_PRODUCER_TAG: &str = "EgressProducer:";
const EGRESS_PRODUCER_FN_START_TAG: &str = "start:";
const EGRESS_PRODUCER_FN_CLOSE_TAG: &str = "close:";
const COMPONENT: &str = "egress_pool";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ProducerState {
    Constructed,
    Running,
    Dormant,
    Closed,
}

pub struct EgressProducer {
    node: NodeIdentity,
    config: ProducerConfig,
    downstream_targets: Vec<String>,
    transport: Arc<dyn DownstreamTransport>,
    statistics: Arc<StatisticsSinks>,
    forwarders: Mutex<HashMap<String, TargetForwarder>>,
    state: Mutex<ProducerState>,
}

impl EgressProducer {
    pub fn new(
        config: ProducerConfig,
        downstream_targets: Vec<String>,
        node: NodeIdentity,
        transport: Arc<dyn DownstreamTransport>,
    ) -> Self {
        Self {
            node,
            config,
            downstream_targets,
            transport,
            statistics: Arc::new(StatisticsSinks::default()),
            forwarders: Mutex::new(HashMap::new()),
            state: Mutex::new(ProducerState::Constructed),
        }
    }

    fn spawn_forwarders(&self) -> Result<HashMap<String, TargetForwarder>, ProducerError> {
        let mut forwarders: HashMap<String, TargetForwarder> = HashMap::new();
        for target in &self.downstream_targets {
            if forwarders.contains_key(target) {
                continue;
            }
            let forwarder = match TargetForwarder::spawn(
                self.node.as_str(),
                target,
                self.config.queue_size,
                self.transport.clone(),
                self.statistics.clone(),
            ) {
                Ok(forwarder) => forwarder,
                Err(err) => {
                    for started in forwarders.values() {
                        started.shutdown(true, self.config.drain_timeout());
                    }
                    return Err(err);
                }
            };
            forwarders.insert(target.clone(), forwarder);
        }
        Ok(forwarders)
    }
}

impl Producer for EgressProducer {
    fn register_statistics_listener(&self, sink: StatisticsSink) {
        self.statistics.register(sink);
    }

    fn start(&self) -> Result<(), ProducerError> {
        let mut state = self.state.lock();
        match *state {
            ProducerState::Closed => return Err(ProducerError::Closed),
            ProducerState::Running | ProducerState::Dormant => return Ok(()),
            ProducerState::Constructed => {}
        }

        if self.downstream_targets.is_empty() {
            info!(
                event = events::EGRESS_PRODUCER_DORMANT,
                component = COMPONENT,
                node = %self.node,
                "no downstream targets, producer stays dormant"
            );
            *state = ProducerState::Dormant;
            return Ok(());
        }

        let forwarders = self.spawn_forwarders()?;
        debug!(
            "{EGRESS_PRODUCER_TAG}:{EGRESS_PRODUCER_FN_START_TAG} started {} forwarder(s) for {}",
            forwarders.len(),
            self.node
        );
        *self.forwarders.lock() = forwarders;
        *state = ProducerState::Running;
        Ok(())
    }

    fn produce(&self, flow: &FlowDefinition, message: Message) -> Result<(), ProducerError> {
        let mut dropped = Vec::new();
        {
            // Held for the whole fan-out so a concurrent close cannot empty the pool mid-flow.
            let state = self.state.lock();
            match *state {
                ProducerState::Running => {}
                ProducerState::Dormant => return Ok(()),
                ProducerState::Constructed if self.downstream_targets.is_empty() => return Ok(()),
                ProducerState::Constructed => return Err(ProducerError::NotStarted),
                ProducerState::Closed => return Err(ProducerError::Closed),
            }

            let forwarders = self.forwarders.lock();
            for edge in flow.edges() {
                let envelope = Envelope::new(
                    &self.node,
                    flow.name(),
                    &edge.target,
                    edge.transform.as_deref(),
                    message.clone(),
                );

                match forwarders.get(&edge.target) {
                    Some(forwarder) => {
                        if let Err(statistics) = forwarder.enqueue(envelope) {
                            dropped.push(statistics);
                        }
                    }
                    None => {
                        warn!(
                            event = events::EGRESS_DROP_UNDECLARED_TARGET,
                            component = COMPONENT,
                            flow = flow.name(),
                            target = edge.target.as_str(),
                            "flow edge names a target that is not a declared downstream target"
                        );
                        dropped.push(SendStatistics::dropped(&envelope, "undeclared target"));
                    }
                }
            }
        }

        // Sinks may call back into the router, so they run with no lock held.
        for statistics in &dropped {
            self.statistics.report(statistics);
        }
        Ok(())
    }

    fn close(&self, force: bool) {
        {
            let mut state = self.state.lock();
            if *state == ProducerState::Closed {
                return;
            }
            *state = ProducerState::Closed;
        }

        let forwarders: Vec<TargetForwarder> =
            self.forwarders.lock().drain().map(|(_, f)| f).collect();
        debug!(
            "{EGRESS_PRODUCER_TAG}:{EGRESS_PRODUCER_FN_CLOSE_TAG} closing {} forwarder(s), force: {force}",
            forwarders.len()
        );
        for forwarder in &forwarders {
            forwarder.shutdown(force, self.config.drain_timeout());
        }
    }

    fn downstream_targets(&self) -> &[String] {
        &self.downstream_targets
    }
}

/// Builds [`EgressProducer`]s sharing one downstream transport.
pub struct EgressProducerFactory {
    transport: Arc<dyn DownstreamTransport>,
}

impl EgressProducerFactory {
    pub fn new(transport: Arc<dyn DownstreamTransport>) -> Self {
        Self { transport }
    }
}

impl ProducerFactory for EgressProducerFactory {
    fn create(
        &self,
        config: &ProducerConfig,
        downstream_targets: &[String],
        node: &NodeIdentity,
    ) -> Result<Arc<dyn Producer>, ProducerError> {
        Ok(Arc::new(EgressProducer::new(
            config.clone(),
            downstream_targets.to_vec(),
            node.clone(),
            self.transport.clone(),
        )))
    }
}
