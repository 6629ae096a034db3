//! Side effects the worker asks its host to perform.

use async_trait::async_trait;
use pwacache_core::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use url::Url;

/// A system notification as displayed to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Notification {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub icon: String,
    pub badge: String,
}

/// Host-side operations available to the worker.
#[async_trait]
pub trait ClientHost: Send + Sync {
    async fn show_notification(&self, notification: &Notification) -> Result<(), Error>;

    async fn close_notification(&self, id: &str) -> Result<(), Error>;

    /// Focus a window already showing `url`, or open a new one.
    async fn focus_or_open(&self, url: &Url) -> Result<(), Error>;
}

/// One effect requested by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HostAction {
    ShowNotification { notification: Notification },
    CloseNotification { id: String },
    FocusOrOpen { url: String },
}

/// Host that records requested effects for a remote client to carry out.
#[derive(Debug, Default)]
pub struct RecordingHost {
    actions: Mutex<Vec<HostAction>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded actions, oldest first.
    pub async fn take_actions(&self) -> Vec<HostAction> {
        std::mem::take(&mut *self.actions.lock().await)
    }
}

#[async_trait]
impl ClientHost for RecordingHost {
    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(id = %notification.id, title = %notification.title, "showing notification");
        self.actions
            .lock()
            .await
            .push(HostAction::ShowNotification { notification: notification.clone() });
        Ok(())
    }

    async fn close_notification(&self, id: &str) -> Result<(), Error> {
        self.actions.lock().await.push(HostAction::CloseNotification { id: id.to_string() });
        Ok(())
    }

    async fn focus_or_open(&self, url: &Url) -> Result<(), Error> {
        tracing::info!(%url, "focusing or opening client window");
        self.actions.lock().await.push(HostAction::FocusOrOpen { url: url.to_string() });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_host_drains_in_order() {
        let host = RecordingHost::new();
        host.close_notification("n-1").await.unwrap();
        host.focus_or_open(&Url::parse("http://localhost:5000/").unwrap())
            .await
            .unwrap();

        let actions = host.take_actions().await;
        assert_eq!(
            actions,
            vec![
                HostAction::CloseNotification { id: "n-1".into() },
                HostAction::FocusOrOpen { url: "http://localhost:5000/".into() },
            ]
        );
        assert!(host.take_actions().await.is_empty());
    }

    #[test]
    fn test_host_action_serialization() {
        let action = HostAction::CloseNotification { id: "n-1".into() };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "close_notification");
        assert_eq!(json["id"], "n-1");
    }
}
