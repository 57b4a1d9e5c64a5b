//! Execution-context scoped flow tag.

use std::fmt;
use std::future::Future;

tokio::task_local! {
    static FLOW_CONTEXT: FlowContext;
}

/// Name of the flow that produced the message currently being handled.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FlowContext {
    flow_name: String,
}

impl FlowContext {
    pub fn new(flow_name: impl Into<String>) -> Self {
        Self {
            flow_name: flow_name.into(),
        }
    }

    pub fn flow_name(&self) -> &str {
        &self.flow_name
    }

    /// Context of the surrounding dispatch, if any.
    pub fn current() -> Option<FlowContext> {
        FLOW_CONTEXT.try_with(Clone::clone).ok()
    }

    /// Runs `f` with `self` as the current context. The previous context (if
    /// any) is restored when `f` returns or unwinds.
    pub fn enter<F, R>(self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        FLOW_CONTEXT.sync_scope(self, f)
    }

    /// Async counterpart of [`FlowContext::enter`]; the context follows the
    /// future across await points and worker threads.
    pub async fn enter_async<F>(self, future: F) -> F::Output
    where
        F: Future,
    {
        FLOW_CONTEXT.scope(self, future).await
    }
}

impl fmt::Display for FlowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flow_name)
    }
}
