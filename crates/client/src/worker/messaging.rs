//! Background sync, push and notification-click events.

use std::sync::atomic::{AtomicU64, Ordering};

use pwacache_core::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Notification, ServiceWorker};

/// Acknowledgement of a background sync trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SyncOutcome {
    pub tag: String,
    /// False when the tag is not the configured sync tag.
    pub handled: bool,
}

/// Disambiguates notifications created within the same millisecond.
static NOTIFICATION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Fields read from a push payload. Everything is optional.
#[derive(Debug, Default)]
struct PushPayload {
    title: Option<String>,
    body: Option<String>,
}

impl PushPayload {
    /// Non-JSON text becomes the body; JSON that is not an object is ignored.
    /// Each field is read on its own, so a mistyped one does not drop the other.
    fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(value @ Value::Object(_)) => {
                let field = |name: &str| {
                    let found = value.get(name)?;
                    let text = found.as_str();
                    if text.is_none() && !found.is_null() {
                        tracing::debug!(field = name, "push payload field is not a string; ignored");
                    }
                    text.map(str::to_string)
                };
                Self { title: field("title"), body: field("body") }
            }
            Ok(_) => Self::default(),
            Err(_) => Self { title: None, body: Some(raw.to_string()) },
        }
    }
}

impl ServiceWorker {
    /// Acknowledge a background sync trigger.
    ///
    /// Deferred data sync is not implemented yet; the configured tag is
    /// acknowledged and every other tag is ignored.
    pub async fn handle_sync(&self, tag: &str) -> Result<SyncOutcome, Error> {
        let handled = tag == self.config.sync_tag;
        if handled {
            tracing::info!(tag, "background sync");
        } else {
            tracing::debug!(tag, "ignoring unknown sync tag");
        }
        Ok(SyncOutcome { tag: tag.to_string(), handled })
    }

    /// Show a notification for a push message.
    ///
    /// Malformed payloads never fail the event: a missing title falls back
    /// to the configured default and a missing body yields none.
    pub async fn handle_push(&self, payload: Option<&str>) -> Result<Notification, Error> {
        let payload = PushPayload::parse(payload);
        let title = payload
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| self.config.notification_title.clone());

        let notification = Notification {
            id: format!(
                "push-{}-{}",
                chrono::Utc::now().timestamp_millis(),
                NOTIFICATION_SEQ.fetch_add(1, Ordering::Relaxed)
            ),
            title,
            body: payload.body.filter(|body| !body.is_empty()),
            icon: self.config.notification_icon.clone(),
            badge: self.config.notification_badge.clone(),
        };
        self.host.show_notification(&notification).await?;
        Ok(notification)
    }

    /// Close the clicked notification and bring the application to the front.
    pub async fn handle_notification_click(&self, id: &str) -> Result<(), Error> {
        let root = self.resolve(&self.config.root_url)?;
        self.host.close_notification(id).await?;
        self.host.focus_or_open(&root).await
    }
}
