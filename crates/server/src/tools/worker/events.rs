//! sw_sync, sw_push and sw_notification_click tool implementations.
//!
//! Host effects requested while handling the event are drained from the
//! recording host and returned to the caller, which plays the host.

use pwacache_client::{HostAction, Notification, RecordingHost, ServiceWorker};
use pwacache_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Input parameters for the sw_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncParams {
    /// Sync tag registered by the page (the worker handles `sync-data`).
    pub tag: String,
}

/// Input parameters for the sw_push tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwPushParams {
    /// Raw push message data, normally JSON `{"title": ..., "body": ...}`.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Input parameters for the sw_notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// Id of the clicked notification, as returned by sw_push.
    pub notification_id: String,
}

/// Output from the sw_push tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwPushOutput {
    pub notification: Notification,
    pub actions: Vec<HostAction>,
}

/// Output from the sw_notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickOutput {
    pub actions: Vec<HostAction>,
}

/// Implementation of the sw_sync tool.
pub async fn sync_impl(worker: &ServiceWorker, params: SwSyncParams) -> Result<CallToolResult, McpError> {
    if params.tag.trim().is_empty() {
        return Err(Error::InvalidInput("tag cannot be empty".into()).into());
    }
    json_result(&worker.handle_sync(&params.tag).await?)
}

/// Implementation of the sw_push tool.
pub async fn push_impl(
    worker: &ServiceWorker, host: &RecordingHost, params: SwPushParams,
) -> Result<CallToolResult, McpError> {
    let notification = worker.handle_push(params.payload.as_deref()).await?;
    let actions = host.take_actions().await;
    json_result(&SwPushOutput { notification, actions })
}

/// Implementation of the sw_notification_click tool.
pub async fn notification_click_impl(
    worker: &ServiceWorker, host: &RecordingHost, params: NotificationClickParams,
) -> Result<CallToolResult, McpError> {
    if params.notification_id.is_empty() {
        return Err(Error::InvalidInput("notification_id cannot be empty".into()).into());
    }
    worker.handle_notification_click(&params.notification_id).await?;
    let actions = host.take_actions().await;
    json_result(&NotificationClickOutput { actions })
}
