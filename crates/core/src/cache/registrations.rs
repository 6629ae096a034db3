//! Persisted worker lifecycle state.
//!
//! One row per version tag. The worker reloads its state from here on every
//! event, so a suspended and resumed worker continues where it left off.

use std::fmt;
use std::str::FromStr;

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{params, rusqlite};

/// Lifecycle state of a worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Uninstalled,
    Installing,
    Installed,
    Activating,
    Active,
    /// Superseded by a newer active version.
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Uninstalled => "uninstalled",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
            WorkerState::Redundant => "redundant",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkerState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uninstalled" => Ok(WorkerState::Uninstalled),
            "installing" => Ok(WorkerState::Installing),
            "installed" => Ok(WorkerState::Installed),
            "activating" => Ok(WorkerState::Activating),
            "active" => Ok(WorkerState::Active),
            "redundant" => Ok(WorkerState::Redundant),
            other => Err(format!("unknown worker state: {other}")),
        }
    }
}

impl CacheDb {
    /// State of the given version; `Uninstalled` if it was never registered.
    pub async fn worker_state(&self, version: &str) -> Result<WorkerState, Error> {
        let version = version.to_string();
        let state = self
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT state FROM worker_registrations WHERE version = ?1",
                    params![version],
                    |row| row.get(0),
                );
                match result {
                    Ok(state) => Ok(Some(state)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        match state {
            Some(state) => state.parse().map_err(Error::CorruptEntry),
            None => Ok(WorkerState::Uninstalled),
        }
    }

    pub async fn set_worker_state(&self, version: &str, state: WorkerState) -> Result<(), Error> {
        let version = version.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO worker_registrations (version, state, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(version) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at",
                    params![version, state.as_str(), now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Make `version` the active worker and mark every other registration
    /// redundant, in one transaction.
    pub async fn claim_active(&self, version: &str) -> Result<(), Error> {
        let version = version.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "UPDATE worker_registrations SET state = ?1, updated_at = ?2 WHERE version <> ?3",
                    params![WorkerState::Redundant.as_str(), now, version],
                )?;
                tx.execute(
                    "INSERT INTO worker_registrations (version, state, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(version) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at",
                    params![version, WorkerState::Active.as_str(), now],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Version tag of the active worker, if any.
    pub async fn active_version(&self) -> Result<Option<String>, Error> {
        self.conn
            .call(|conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT version FROM worker_registrations WHERE state = 'active'
                     ORDER BY updated_at DESC LIMIT 1",
                    [],
                    |row| row.get(0),
                );
                match result {
                    Ok(version) => Ok(Some(version)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip() {
        for state in [
            WorkerState::Uninstalled,
            WorkerState::Installing,
            WorkerState::Installed,
            WorkerState::Activating,
            WorkerState::Active,
            WorkerState::Redundant,
        ] {
            assert_eq!(state.as_str().parse::<WorkerState>().unwrap(), state);
        }
    }

    #[tokio::test]
    async fn test_unknown_version_is_uninstalled() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert_eq!(db.worker_state("app-cache-v1").await.unwrap(), WorkerState::Uninstalled);
        assert!(db.active_version().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_and_get_state() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.set_worker_state("app-cache-v1", WorkerState::Installed).await.unwrap();
        assert_eq!(db.worker_state("app-cache-v1").await.unwrap(), WorkerState::Installed);
    }

    #[tokio::test]
    async fn test_claim_active_supersedes_others() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.claim_active("app-cache-v1").await.unwrap();
        db.set_worker_state("app-cache-v2", WorkerState::Installed).await.unwrap();

        db.claim_active("app-cache-v2").await.unwrap();

        assert_eq!(db.worker_state("app-cache-v1").await.unwrap(), WorkerState::Redundant);
        assert_eq!(db.worker_state("app-cache-v2").await.unwrap(), WorkerState::Active);
        assert_eq!(db.active_version().await.unwrap().as_deref(), Some("app-cache-v2"));
    }
}
