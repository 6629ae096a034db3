//! Fetch interception: cache first, network on miss, opportunistic caching.

use pwacache_core::{CacheStore, Error, RequestDescriptor, ResponseSnapshot, WorkerState};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{FetchEvent, ServiceWorker};

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Cache,
    Network,
    /// Cached offline page served for a failed navigation.
    Fallback,
}

/// The response handed back to the page.
#[derive(Debug, Clone)]
pub struct InterceptedResponse {
    pub response: ResponseSnapshot,
    pub source: ResponseSource,
}

impl InterceptedResponse {
    fn new(response: ResponseSnapshot, source: ResponseSource) -> Self {
        Self { response, source }
    }
}

impl ServiceWorker {
    /// Answer an intercepted request.
    ///
    /// On a miss the response is returned as soon as the network answers; a
    /// copy is written to the cache by work attached to `event`, which the
    /// caller settles afterwards. Cache write failures are logged and
    /// dropped.
    ///
    /// # Errors
    ///
    /// Network errors propagate unless an offline fallback page is
    /// configured and the request is a navigation.
    pub async fn handle_fetch(&self, event: &mut FetchEvent) -> Result<InterceptedResponse, Error> {
        let request = event.request().clone();

        if self.state().await? != WorkerState::Active {
            tracing::debug!(url = %request.url(), "worker not active; request not controlled");
            let response = self.network.fetch(request).await?;
            return Ok(InterceptedResponse::new(response, ResponseSource::Network));
        }

        // A store deleted by a newer version's activation reads as a miss.
        let store = self.db.existing_store(self.version()).await?;
        if let Some(store) = &store
            && let Some(cached) = store.match_request(&request).await?
        {
            tracing::debug!(url = %request.url(), "cache hit");
            return Ok(InterceptedResponse::new(cached, ResponseSource::Cache));
        }

        tracing::debug!(url = %request.url(), "cache miss");
        let response = match self.network.fetch(request.clone()).await {
            Ok(response) => response,
            Err(err) => return self.offline_fallback(store.as_ref(), &request, err).await,
        };

        if !self.config.policy.is_cacheable(&response) {
            tracing::debug!(
                url = %request.url(),
                status = response.status(),
                response_type = %response.response_type(),
                "response not cacheable"
            );
            return Ok(InterceptedResponse::new(response, ResponseSource::Network));
        }

        if !request.is_get() || self.config.policy.is_excluded(request.url().as_str()) {
            tracing::debug!(url = %request.url(), "excluded from runtime caching");
            return Ok(InterceptedResponse::new(response, ResponseSource::Network));
        }

        let Some(store) = store else {
            tracing::debug!(url = %request.url(), store = %self.version(), "cache store missing; not caching");
            return Ok(InterceptedResponse::new(response, ResponseSource::Network));
        };

        let to_cache = response.clone();
        event.lifetime.wait_until(async move {
            if let Err(e) = store.put(&request, &to_cache).await {
                tracing::debug!(url = %request.url(), error = %e, "runtime cache write failed; ignored");
            }
        });

        Ok(InterceptedResponse::new(response, ResponseSource::Network))
    }

    async fn offline_fallback(
        &self, store: Option<&CacheStore>, request: &RequestDescriptor, err: Error,
    ) -> Result<InterceptedResponse, Error> {
        let (Some(store), Some(fallback)) = (store, self.config.offline_fallback.as_deref()) else {
            return Err(err);
        };
        if !request.is_navigation() {
            return Err(err);
        }

        let fallback_request = RequestDescriptor::get(self.resolve(fallback)?);
        match store.match_request(&fallback_request).await? {
            Some(page) => {
                tracing::info!(url = %request.url(), error = %err, "network failed; serving offline page");
                Ok(InterceptedResponse::new(page, ResponseSource::Fallback))
            }
            None => Err(err),
        }
    }
}
