//! cache_keys tool implementation.
//!
//! Lists cache store names and the entries of one store.

use pwacache_client::ServiceWorker;
use pwacache_core::EntrySummary;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// Store to list (default: the current version's store).
    #[serde(default)]
    pub store: Option<String>,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysOutput {
    /// Every store in the cache storage, oldest first.
    pub stores: Vec<String>,
    /// The listed store.
    pub store: String,
    /// Entries of the listed store; empty if it does not exist.
    pub entries: Vec<EntrySummary>,
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(worker: &ServiceWorker, params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    let db = worker.db();
    let name = params.store.unwrap_or_else(|| worker.version().to_string());

    let entries = match db.existing_store(&name).await? {
        Some(store) => store.keys().await?,
        None => Vec::new(),
    };

    json_result(&CacheKeysOutput { stores: db.store_names().await?, store: name, entries })
}
