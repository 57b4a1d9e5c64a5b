//! Per-target egress worker that forwards queued envelopes on the downstream transport.

use crate::api::message::Envelope;
use crate::data_plane::producer::{
    DeliveryStatus, DownstreamTransport, SendStatistics, StatisticsSinks,
};
use crate::error::ProducerError;
use crate::observability::{events, fields};
use crate::runtime::worker_runtime::spawn_message_forwarding_loop;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc as std_mpsc, Arc};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tracing::{debug, info, warn};

const COMPONENT: &str = "egress_worker";

pub(crate) struct TargetForwarder {
    target: String,
    sender: Mutex<Option<Sender<Envelope>>>,
    abort: Arc<AtomicBool>,
    finished: Mutex<std_mpsc::Receiver<()>>,
}

impl TargetForwarder {
    pub(crate) fn spawn(
        node: &str,
        target: &str,
        queue_size: usize,
        transport: Arc<dyn DownstreamTransport>,
        statistics: Arc<StatisticsSinks>,
    ) -> Result<Self, ProducerError> {
        let (tx, rx) = mpsc::channel(queue_size.max(1));
        let (finished_tx, finished_rx) = std_mpsc::channel();
        let abort = Arc::new(AtomicBool::new(false));

        let loop_target = target.to_string();
        let loop_abort = abort.clone();
        spawn_message_forwarding_loop(format!("egress-{node}-{target}"), move || async move {
            Self::message_forwarding_loop(
                loop_target,
                transport,
                rx,
                loop_abort,
                statistics,
            )
            .await;
            let _ = finished_tx.send(());
        })
        .map_err(|err| ProducerError::Start {
            target: target.to_string(),
            reason: err.to_string(),
        })?;

        Ok(Self {
            target: target.to_string(),
            sender: Mutex::new(Some(tx)),
            abort,
            finished: Mutex::new(finished_rx),
        })
    }

    /// Queues `envelope` without waiting. A full or closed queue drops it and
    /// hands back the `Dropped` statistic for the caller to report.
    pub(crate) fn enqueue(&self, envelope: Envelope) -> Result<(), SendStatistics> {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return Err(SendStatistics::dropped(&envelope, "forwarder closed"));
        };

        match sender.try_send(envelope) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(envelope)) => {
                warn!(
                    event = events::EGRESS_DROP_QUEUE_FULL,
                    component = COMPONENT,
                    target = self.target.as_str(),
                    msg_id = %fields::format_envelope_id(&envelope),
                    "outbound queue full, dropping message"
                );
                Err(SendStatistics::dropped(&envelope, "queue full"))
            }
            Err(TrySendError::Closed(envelope)) => {
                Err(SendStatistics::dropped(&envelope, "forwarder closed"))
            }
        }
    }

    /// Closes the queue. Graceful shutdown waits up to `drain_timeout` for
    /// queued envelopes to be sent; forced shutdown discards them.
    pub(crate) fn shutdown(&self, force: bool, drain_timeout: Duration) {
        if force {
            self.abort.store(true, Ordering::Release);
        }
        self.sender.lock().take();

        if force {
            return;
        }

        match self.finished.lock().recv_timeout(drain_timeout) {
            Ok(()) | Err(std_mpsc::RecvTimeoutError::Disconnected) => {
                debug!(
                    component = COMPONENT,
                    target = self.target.as_str(),
                    "forwarder drained"
                );
            }
            Err(std_mpsc::RecvTimeoutError::Timeout) => {
                warn!(
                    event = events::EGRESS_DRAIN_TIMEOUT,
                    component = COMPONENT,
                    target = self.target.as_str(),
                    drain_timeout_ms = drain_timeout.as_millis() as u64,
                    "forwarder did not drain in time, abandoning remaining messages"
                );
                self.abort.store(true, Ordering::Release);
            }
        }
    }

    pub(crate) async fn message_forwarding_loop(
        target: String,
        transport: Arc<dyn DownstreamTransport>,
        mut message_receiver: Receiver<Envelope>,
        abort: Arc<AtomicBool>,
        statistics: Arc<StatisticsSinks>,
    ) {
        info!(
            event = events::EGRESS_WORKER_START,
            component = COMPONENT,
            target = target.as_str(),
            "egress worker started"
        );

        while let Some(envelope) = message_receiver.recv().await {
            if abort.load(Ordering::Acquire) {
                break;
            }

            debug!(
                event = events::EGRESS_SEND_ATTEMPT,
                component = COMPONENT,
                target = target.as_str(),
                msg_id = %fields::format_envelope_id(&envelope),
                flow = envelope.flow.as_str(),
                "attempting send"
            );

            let attempted_at = Utc::now();
            let started = Instant::now();
            let send_res = transport.send(envelope.clone()).await;

            let status = match send_res {
                Ok(()) => {
                    debug!(
                        event = events::EGRESS_SEND_OK,
                        component = COMPONENT,
                        target = target.as_str(),
                        msg_id = %fields::format_envelope_id(&envelope),
                        "send succeeded"
                    );
                    DeliveryStatus::Delivered
                }
                Err(err) => {
                    warn!(
                        event = events::EGRESS_SEND_FAILED,
                        component = COMPONENT,
                        target = target.as_str(),
                        msg_id = %fields::format_envelope_id(&envelope),
                        err = %err,
                        "send failed"
                    );
                    DeliveryStatus::Failed(err.to_string())
                }
            };

            statistics.report(&SendStatistics::for_envelope(
                &envelope,
                status,
                attempted_at,
                started.elapsed(),
            ));
        }

        info!(
            event = events::EGRESS_WORKER_STOP,
            component = COMPONENT,
            target = target.as_str(),
            "egress worker stopped"
        );
    }
}
