//! Background poll thread driving every ingress listener of one router.

use crate::data_plane::ingress_registry::ListenerMap;
use crate::observability::events;
use arc_swap::ArcSwap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

const COMPONENT: &str = "poll_runtime";

/// Spawns the poll thread. It sweeps the current listener snapshot, calling
/// `fetch` once per listener, then sleeps `interval`; it exits once `running`
/// is cleared.
pub(crate) fn spawn_poll_loop(
    node: String,
    running: Arc<AtomicBool>,
    listeners: Arc<ArcSwap<ListenerMap>>,
    interval: Duration,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("poll-{node}"))
        .spawn(move || poll_loop(&node, &running, &listeners, interval))
}

fn poll_loop(
    node: &str,
    running: &AtomicBool,
    listeners: &ArcSwap<ListenerMap>,
    interval: Duration,
) {
    info!(
        event = events::POLL_LOOP_START,
        component = COMPONENT,
        node,
        interval_us = interval.as_micros() as u64,
        "poll loop started"
    );

    let mut sweeps: u64 = 0;
    while running.load(Ordering::Acquire) {
        let snapshot = listeners.load_full();
        for (key, listener) in snapshot.iter() {
            if !running.load(Ordering::Acquire) {
                break;
            }
            if let Err(err) = listener.fetch() {
                warn!(
                    event = events::POLL_FETCH_FAILED,
                    component = COMPONENT,
                    node,
                    listener = %key,
                    err = %err,
                    "listener fetch failed"
                );
            }
        }
        sweeps += 1;
        thread::sleep(interval);
    }

    info!(
        event = events::POLL_LOOP_EXIT,
        component = COMPONENT,
        node,
        sweeps,
        "poll loop exited"
    );
    debug!(component = COMPONENT, node, "poll thread returning");
}
