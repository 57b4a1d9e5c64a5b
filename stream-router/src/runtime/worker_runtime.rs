//! Runtime helper for spawning worker forwarding loops.

use std::future::Future;
use std::io;
use std::thread::{self, JoinHandle};
use tokio::runtime::Builder;
use tracing::error;

/// Runs `run_loop` on a dedicated thread owning a current-thread Tokio runtime.
pub(crate) fn spawn_message_forwarding_loop<F, Fut>(
    thread_name: String,
    run_loop: F,
) -> io::Result<JoinHandle<()>>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + 'static,
{
    thread::Builder::new().name(thread_name).spawn(move || {
        let runtime = match Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(err) => {
                error!(err = %err, "unable to create forwarding runtime");
                return;
            }
        };

        runtime.block_on(run_loop());
    })
}
