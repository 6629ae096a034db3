//! Install and activate.

use std::sync::Arc;

use pwacache_core::{Error, RequestDescriptor, ResponseSnapshot, WorkerState};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use super::ServiceWorker;

/// Result of a completed install.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallReport {
    pub cache_name: String,
    /// Number of manifest entries stored.
    pub seeded: usize,
    pub state: WorkerState,
}

/// Result of a completed activation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActivateReport {
    pub cache_name: String,
    /// Stale stores removed by this activation.
    pub deleted: Vec<String>,
    pub state: WorkerState,
}

impl ServiceWorker {
    /// Create the versioned store and seed it with every manifest entry.
    ///
    /// All-or-nothing: if any entry fails to fetch or answers non-2xx,
    /// nothing is stored and the registration is left where it was
    /// (`uninstalled` for a first install), so the host can simply retry.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidState` if this version was superseded
    /// - `Error::InstallFailed` naming the first failing manifest entry
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let previous = self.state().await?;
        if previous == WorkerState::Redundant {
            return Err(Error::InvalidState(format!("{} was superseded and cannot be reinstalled", self.version())));
        }

        // An installed or active version is re-seeded in place.
        let reinstall = matches!(previous, WorkerState::Installed | WorkerState::Active);
        if !reinstall {
            self.db.set_worker_state(self.version(), WorkerState::Installing).await?;
        }
        tracing::info!(cache_name = %self.version(), entries = self.config.manifest.len(), "installing");

        match self.seed_manifest().await {
            Ok(seeded) => {
                let state = if reinstall { previous } else { WorkerState::Installed };
                self.db.set_worker_state(self.version(), state).await?;
                tracing::info!(cache_name = %self.version(), seeded, "install complete");
                Ok(InstallReport { cache_name: self.version().to_string(), seeded, state })
            }
            Err(err) => {
                let restored = if reinstall { previous } else { WorkerState::Uninstalled };
                self.db.set_worker_state(self.version(), restored).await?;
                tracing::warn!(cache_name = %self.version(), error = %err, "install failed");
                Err(err)
            }
        }
    }

    async fn seed_manifest(&self) -> Result<usize, Error> {
        let requests = self
            .config
            .manifest
            .iter()
            .map(|entry| self.resolve(entry).map(RequestDescriptor::get))
            .collect::<Result<Vec<_>, _>>()?;

        let mut fetches = JoinSet::new();
        for (index, request) in requests.iter().enumerate() {
            let network = Arc::clone(&self.network);
            let request = request.clone();
            fetches.spawn(async move { (index, network.fetch(request).await) });
        }

        let mut responses: Vec<Option<ResponseSnapshot>> = vec![None; requests.len()];
        while let Some(joined) = fetches.join_next().await {
            let (index, result) = joined.map_err(|e| Error::InstallFailed {
                url: "manifest".to_string(),
                reason: format!("fetch task failed: {e}"),
            })?;
            let url = requests[index].url().to_string();
            let response = result.map_err(|e| Error::InstallFailed { url: url.clone(), reason: e.to_string() })?;
            if !response.is_ok() {
                return Err(Error::InstallFailed { url, reason: format!("status {}", response.status()) });
            }
            responses[index] = Some(response);
        }

        let entries: Vec<(RequestDescriptor, ResponseSnapshot)> = requests
            .into_iter()
            .zip(responses)
            .filter_map(|(request, response)| response.map(|response| (request, response)))
            .collect();

        let store = self.db.open_store(self.version()).await?;
        store.put_all(&entries).await?;
        Ok(entries.len())
    }

    /// Take over from previous versions.
    ///
    /// Deletes every cache store whose name is not this version and marks
    /// every other registration redundant. Running it again on an active
    /// worker repeats the cleanup and changes nothing else.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidState` unless this version is installed, activating
    ///   or active
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        let previous = self.state().await?;
        match previous {
            WorkerState::Installed => {
                self.db.set_worker_state(self.version(), WorkerState::Activating).await?;
            }
            // Resumes an activation that was interrupted after this write.
            WorkerState::Activating | WorkerState::Active => {}
            other => {
                return Err(Error::InvalidState(format!("cannot activate {} while {}", self.version(), other)));
            }
        }

        match self.delete_stale_stores().await {
            Ok(deleted) => {
                self.db.claim_active(self.version()).await?;
                tracing::info!(cache_name = %self.version(), deleted = ?deleted, "activated");
                Ok(ActivateReport { cache_name: self.version().to_string(), deleted, state: WorkerState::Active })
            }
            Err(err) => {
                self.db.set_worker_state(self.version(), previous).await?;
                tracing::warn!(cache_name = %self.version(), error = %err, "activation failed");
                Err(err)
            }
        }
    }

    async fn delete_stale_stores(&self) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::new();
        for name in self.db.store_names().await? {
            if name == self.version() {
                continue;
            }
            if self.db.delete_store(&name).await? {
                tracing::debug!(store = %name, "deleted stale cache store");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::testing::{Fixture, MANIFEST, absolute, config, get};
    use crate::worker::{FetchEvent, ResponseSource};

    #[tokio::test]
    async fn test_install_seeds_every_manifest_entry() {
        let fx = Fixture::new().await;
        fx.network.serve_manifest();
        let worker = fx.worker(config("app-cache-v1"));

        let report = worker.install().await.unwrap();
        assert_eq!(report.seeded, MANIFEST.len());
        assert_eq!(report.state, WorkerState::Installed);
        assert_eq!(worker.state().await.unwrap(), WorkerState::Installed);

        let store = fx.db.existing_store("app-cache-v1").await.unwrap().unwrap();
        for entry in MANIFEST {
            let cached = store.match_request(&get(entry)).await.unwrap();
            let cached = cached.unwrap_or_else(|| panic!("{entry} not cached"));
            assert_eq!(cached.status(), 200);
            assert_eq!(cached.body().as_ref(), format!("asset {entry}").as_bytes());
        }
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let fx = Fixture::new().await;
        fx.network.serve_manifest();
        fx.network.fail(&absolute(MANIFEST[1]), "connection reset");
        let worker = fx.worker(config("app-cache-v1"));

        let err = worker.install().await.unwrap_err();
        assert!(matches!(&err, Error::InstallFailed { url, .. } if url.ends_with("icon-192x192.png")));
        assert_eq!(worker.state().await.unwrap(), WorkerState::Uninstalled);

        let store = fx.db.existing_store("app-cache-v1").await.unwrap();
        if let Some(store) = store {
            assert!(store.is_empty().await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_install_fails_on_error_status() {
        let fx = Fixture::new().await;
        fx.network.serve_manifest();
        fx.network.respond(&absolute("/"), 500, "boom");
        let worker = fx.worker(config("app-cache-v1"));

        let err = worker.install().await.unwrap_err();
        assert!(matches!(err, Error::InstallFailed { reason, .. } if reason == "status 500"));
    }

    #[tokio::test]
    async fn test_install_retry_after_failure() {
        let fx = Fixture::new().await;
        fx.network.fail(&absolute("/"), "offline");
        let worker = fx.worker(config("app-cache-v1"));
        assert!(worker.install().await.is_err());

        fx.network.serve_manifest();
        let report = worker.install().await.unwrap();
        assert_eq!(report.seeded, MANIFEST.len());
    }

    #[tokio::test]
    async fn test_activate_before_install_is_invalid() {
        let fx = Fixture::new().await;
        let worker = fx.worker(config("app-cache-v1"));
        let err = worker.activate().await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_upgrade_deletes_previous_version() {
        let fx = Fixture::new().await;
        let v1 = fx.active_worker("app-cache-v1").await;
        assert_eq!(v1.state().await.unwrap(), WorkerState::Active);

        let v2 = fx.worker(config("app-cache-v2"));
        v2.install().await.unwrap();
        assert_eq!(fx.db.store_names().await.unwrap(), vec!["app-cache-v1", "app-cache-v2"]);

        let report = v2.activate().await.unwrap();
        assert_eq!(report.deleted, vec!["app-cache-v1"]);
        assert_eq!(fx.db.store_names().await.unwrap(), vec!["app-cache-v2"]);
        assert_eq!(v1.state().await.unwrap(), WorkerState::Redundant);
        assert_eq!(v2.state().await.unwrap(), WorkerState::Active);

        let store = fx.db.existing_store("app-cache-v2").await.unwrap().unwrap();
        assert_eq!(store.len().await.unwrap(), MANIFEST.len() as u64);

        let calls_before = fx.network.calls_to(&absolute("/"));
        let mut event = FetchEvent::new(get("/"));
        let result = v1.handle_fetch(&mut event).await.unwrap();
        event.settled().await;
        assert_eq!(result.source, ResponseSource::Network);
        assert_eq!(fx.network.calls_to(&absolute("/")), calls_before + 1);
        assert_eq!(fx.db.store_names().await.unwrap(), vec!["app-cache-v2"]);
    }

    #[tokio::test]
    async fn test_interrupted_activation_resumes() {
        let fx = Fixture::new().await;
        let v1 = fx.active_worker("app-cache-v1").await;

        let v2 = fx.worker(config("app-cache-v2"));
        v2.install().await.unwrap();
        fx.db.set_worker_state("app-cache-v2", WorkerState::Activating).await.unwrap();

        let resumed = fx.worker(config("app-cache-v2"));
        let report = resumed.activate().await.unwrap();
        assert_eq!(report.state, WorkerState::Active);
        assert_eq!(report.deleted, vec!["app-cache-v1"]);
        assert_eq!(v1.state().await.unwrap(), WorkerState::Redundant);
        assert_eq!(fx.db.active_version().await.unwrap().as_deref(), Some("app-cache-v2"));
    }

    #[tokio::test]
    async fn test_activate_removes_every_foreign_store() {
        let fx = Fixture::new().await;
        fx.db.open_store("app-cache-v0").await.unwrap();
        fx.db.open_store("unrelated-cache").await.unwrap();

        let worker = fx.active_worker("app-cache-v3").await;
        assert_eq!(fx.db.store_names().await.unwrap(), vec!["app-cache-v3"]);

        let again = worker.activate().await.unwrap();
        assert!(again.deleted.is_empty());
        assert_eq!(fx.db.store_names().await.unwrap(), vec!["app-cache-v3"]);
    }

    #[tokio::test]
    async fn test_reinstall_active_keeps_state() {
        let fx = Fixture::new().await;
        let worker = fx.active_worker("app-cache-v1").await;

        let report = worker.install().await.unwrap();
        assert_eq!(report.state, WorkerState::Active);
    }

    #[tokio::test]
    async fn test_superseded_version_cannot_reinstall() {
        let fx = Fixture::new().await;
        let v1 = fx.active_worker("app-cache-v1").await;
        fx.active_worker("app-cache-v2").await;

        assert!(matches!(v1.install().await, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_state_survives_worker_restart() {
        let fx = Fixture::new().await;
        fx.active_worker("app-cache-v1").await;

        let resumed = fx.worker(config("app-cache-v1"));
        assert_eq!(resumed.state().await.unwrap(), WorkerState::Active);
    }
}
