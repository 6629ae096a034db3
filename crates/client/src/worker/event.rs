//! Event lifetime extension.
//!
//! An event is finished only when everything registered with `wait_until`
//! has settled. Dropping an unsettled event aborts its pending work, the same
//! way a host tears down a worker whose event did not extend its lifetime.

use std::future::Future;

use pwacache_core::RequestDescriptor;
use tokio::task::JoinSet;

/// Work attached to a single event.
#[derive(Default)]
pub struct ExtendableEvent {
    pending: JoinSet<()>,
}

impl ExtendableEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the event alive until `work` completes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn wait_until<F>(&mut self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.pending.spawn(work);
    }

    /// Number of registered tasks that have not been collected yet.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Wait for all registered work.
    pub async fn settled(&mut self) {
        while let Some(result) = self.pending.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "extended event work did not complete");
            }
        }
    }
}

/// An intercepted request together with its event lifetime.
pub struct FetchEvent {
    request: RequestDescriptor,
    pub(crate) lifetime: ExtendableEvent,
}

impl FetchEvent {
    pub fn new(request: RequestDescriptor) -> Self {
        Self { request, lifetime: ExtendableEvent::new() }
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    pub fn pending(&self) -> usize {
        self.lifetime.pending()
    }

    /// Wait for the work the handler left running (the runtime cache write).
    pub async fn settled(&mut self) {
        self.lifetime.settled().await;
    }
}
