//! MCP server handler implementation.
//!
//! Each tool delivers one worker event (or one cache maintenance operation)
//! and returns only after all work the event registered has settled.

use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, CacheKeysParams, CachePurgeParams, get_impl, keys_impl, purge_impl};
use crate::tools::worker::{
    NotificationClickParams, SwFetchParams, SwPushParams, SwSyncParams, activate_impl, fetch_impl, install_impl,
    notification_click_impl, push_impl, status_impl, sync_impl,
};
use pwacache_client::{RecordingHost, ServiceWorker};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The MCP server handler for pwacache.
#[derive(Clone)]
pub struct PwaCacheServer {
    worker: Arc<ServiceWorker>,
    /// Collects host effects (notifications, windows) for the calling client.
    host: Arc<RecordingHost>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PwaCacheServer {
    pub fn new(worker: Arc<ServiceWorker>, host: Arc<RecordingHost>) -> Self {
        Self { worker, host, tool_router: Self::tool_router() }
    }

    #[tool(description = "Report the worker version tag, its lifecycle state, the active version and all cache store names.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.worker).await
    }

    /// Install: create the versioned cache store and pre-cache the manifest.
    #[tool(
        description = "Install the worker: fetch every manifest URL and store it in the versioned cache. All-or-nothing; safe to retry."
    )]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker).await
    }

    #[tool(description = "Activate the installed worker: delete every cache store of other versions and take control.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker).await
    }

    /// Intercept one request the way the page's fetch would be intercepted.
    #[tool(
        description = "Intercept a page request: serve from cache, otherwise fetch from the network and cache 200 same-origin responses outside /api/, /login and /logout."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a background sync trigger with the given tag.")]
    async fn sw_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.worker, params.0).await
    }

    #[tool(
        description = "Deliver a push message. The payload is JSON {title, body}; returns the notification the host should display."
    )]
    async fn sw_push(&self, params: Parameters<SwPushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.worker, &self.host, params.0).await
    }

    #[tool(description = "Deliver a notification click; returns the host actions (close notification, focus or open window).")]
    async fn sw_notification_click(&self, params: Parameters<NotificationClickParams>) -> Result<CallToolResult, McpError> {
        notification_click_impl(&self.worker, &self.host, params.0).await
    }

    #[tool(description = "List cache store names and the entries of one store (default: the current version's store).")]
    async fn cache_keys(&self, params: Parameters<CacheKeysParams>) -> Result<CallToolResult, McpError> {
        keys_impl(&self.worker, params.0).await
    }

    #[tool(description = "Look up the cached GET response for a URL without touching the network.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.worker, params.0).await
    }

    #[tool(
        description = "Purge entries of the current cache store by URL substring and/or keep only the newest max_entries."
    )]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.worker, params.0).await
    }
}

impl ServerHandler for PwaCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pwacache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(format!(
                "Offline cache worker for {} (version {}). Call sw_install then sw_activate before sw_fetch.",
                self.worker.config().origin,
                self.worker.version()
            )),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
