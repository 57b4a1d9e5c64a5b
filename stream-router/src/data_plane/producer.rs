//! Outbound producer contract and send statistics.

use crate::api::config::ProducerConfig;
use crate::api::message::{Envelope, Message, NodeIdentity};
use crate::control_plane::flow_table::FlowDefinition;
use crate::error::{ProducerError, TransportError};
use crate::observability::{events, fields};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

const COMPONENT: &str = "producer";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    Failed(String),
    Dropped(String),
}

/// Metadata reported after every send attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct SendStatistics {
    pub envelope_id: Uuid,
    pub node: String,
    pub flow: String,
    pub target: String,
    pub status: DeliveryStatus,
    pub attempted_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl SendStatistics {
    pub(crate) fn for_envelope(
        envelope: &Envelope,
        status: DeliveryStatus,
        attempted_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        Self {
            envelope_id: envelope.id,
            node: envelope.origin_node.clone(),
            flow: envelope.flow.clone(),
            target: envelope.target.clone(),
            status,
            attempted_at,
            elapsed,
        }
    }

    pub(crate) fn dropped(envelope: &Envelope, reason: &str) -> Self {
        Self::for_envelope(
            envelope,
            DeliveryStatus::Dropped(reason.to_string()),
            Utc::now(),
            Duration::ZERO,
        )
    }
}

/// Receives [`SendStatistics`]. Must not block.
pub type StatisticsSink = Arc<dyn Fn(&SendStatistics) + Send + Sync>;

/// Registered sinks shared between a producer and its send threads.
#[derive(Default)]
pub(crate) struct StatisticsSinks {
    sinks: ArcSwap<Vec<StatisticsSink>>,
}

impl StatisticsSinks {
    pub(crate) fn register(&self, sink: StatisticsSink) {
        self.sinks.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(sink.clone());
            next
        });
    }

    /// Reports to every sink; a panicking sink is logged and skipped.
    pub(crate) fn report(&self, statistics: &SendStatistics) {
        for sink in self.sinks.load().iter() {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| sink(statistics))) {
                warn!(
                    event = events::EGRESS_STATISTICS_SINK_PANICKED,
                    component = COMPONENT,
                    target = statistics.target.as_str(),
                    reason = %fields::format_panic_payload(panic.as_ref()),
                    "statistics sink panicked"
                );
            }
        }
    }
}

/// Fans outbound messages to the downstream targets selected by a flow.
pub trait Producer: Send + Sync {
    fn register_statistics_listener(&self, sink: StatisticsSink);

    /// Starts the background send loop. Dormant when there are no targets.
    fn start(&self) -> Result<(), ProducerError>;

    /// Enqueues one send per flow edge; never waits on the network.
    fn produce(&self, flow: &FlowDefinition, message: Message) -> Result<(), ProducerError>;

    fn close(&self, force: bool);

    fn downstream_targets(&self) -> &[String];
}

pub trait ProducerFactory: Send + Sync {
    fn create(
        &self,
        config: &ProducerConfig,
        downstream_targets: &[String],
        node: &NodeIdentity,
    ) -> Result<Arc<dyn Producer>, ProducerError>;
}

/// Wire-level sender used by the egress producer.
#[async_trait]
pub trait DownstreamTransport: Send + Sync {
    async fn send(&self, envelope: Envelope) -> Result<(), TransportError>;
}
