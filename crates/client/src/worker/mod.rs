//! Offline cache worker.
//!
//! ### Lifecycle
//! - `install`: create the versioned cache store and seed the manifest,
//!   all-or-nothing.
//! - `activate`: delete every store except the current version and claim
//!   control from older versions.
//!
//! ### Fetch Interception
//! - Cache hit: serve the stored response, no network.
//! - Cache miss: fetch over the network; store a copy of 200/basic responses
//!   unless the URL matches an exclusion pattern. The write runs inside the
//!   event lifetime and its failure never reaches the caller.
//!
//! ### Other Events
//! - Background sync acknowledgement, push notification display,
//!   notification click.
//!
//! The worker keeps no lifecycle state in memory; it is reloaded from the
//! cache database on every event.

mod event;
mod host;
mod intercept;
mod lifecycle;
mod messaging;
#[cfg(test)]
pub(crate) mod testing;

pub use event::{ExtendableEvent, FetchEvent};
pub use host::{ClientHost, HostAction, Notification, RecordingHost};
pub use intercept::{InterceptedResponse, ResponseSource};
pub use lifecycle::{ActivateReport, InstallReport};
pub use messaging::SyncOutcome;

use std::sync::Arc;

use crate::fetch::{Network, resolve};
use pwacache_core::{AppConfig, CacheDb, CachePolicy, Error, WorkerState};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Worker settings derived from the application configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Version-tagged cache store name; also the worker version.
    pub cache_name: String,
    pub origin: Url,
    pub manifest: Vec<String>,
    pub policy: CachePolicy,
    pub sync_tag: String,
    pub notification_title: String,
    pub notification_icon: String,
    pub notification_badge: String,
    pub root_url: String,
    pub offline_fallback: Option<String>,
}

impl WorkerConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("origin: {e}")))?;
        Ok(Self {
            cache_name: config.cache_name.clone(),
            origin,
            manifest: config.manifest.clone(),
            policy: CachePolicy::new(config.exclude_patterns.clone()),
            sync_tag: config.sync_tag.clone(),
            notification_title: config.notification_title.clone(),
            notification_icon: config.notification_icon.clone(),
            notification_badge: config.notification_badge.clone(),
            root_url: config.root_url.clone(),
            offline_fallback: config.offline_fallback.clone(),
        })
    }
}

/// Snapshot of the worker and the cache storage it owns.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerStatus {
    pub cache_name: String,
    pub state: WorkerState,
    pub active_version: Option<String>,
    pub stores: Vec<String>,
}

/// The offline cache worker for one version tag.
pub struct ServiceWorker {
    db: CacheDb,
    network: Arc<dyn Network>,
    host: Arc<dyn ClientHost>,
    config: WorkerConfig,
}

impl ServiceWorker {
    pub fn new(db: CacheDb, network: Arc<dyn Network>, host: Arc<dyn ClientHost>, config: WorkerConfig) -> Self {
        Self { db, network, host, config }
    }

    /// Version tag of this worker (the cache store name).
    pub fn version(&self) -> &str {
        &self.config.cache_name
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    /// Persisted lifecycle state of this version.
    pub async fn state(&self) -> Result<WorkerState, Error> {
        self.db.worker_state(self.version()).await
    }

    pub async fn status(&self) -> Result<WorkerStatus, Error> {
        Ok(WorkerStatus {
            cache_name: self.config.cache_name.clone(),
            state: self.state().await?,
            active_version: self.db.active_version().await?,
            stores: self.db.store_names().await?,
        })
    }

    /// Resolve a page-relative or absolute URL against the application origin.
    pub fn resolve(&self, url: &str) -> Result<Url, Error> {
        resolve(url, &self.config.origin).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))
    }
}
