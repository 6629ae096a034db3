//! cache_purge tool implementation.
//!
//! Purges entries of the current store by URL pattern or count.

use pwacache_client::ServiceWorker;
use pwacache_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Purge entries whose URL contains this substring.
    #[serde(default)]
    pub pattern: Option<String>,

    /// Keep only the newest N entries (LRU purge).
    #[serde(default)]
    pub max_entries: Option<usize>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: u64,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(worker: &ServiceWorker, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if params.pattern.is_none() && params.max_entries.is_none() {
        return Err(Error::InvalidInput("At least one of pattern or max_entries must be specified".to_string()).into());
    }
    if params.pattern.as_deref().is_some_and(str::is_empty) {
        return Err(Error::InvalidInput("pattern cannot be empty".to_string()).into());
    }

    let Some(store) = worker.db().existing_store(worker.version()).await? else {
        return json_result(&CachePurgeOutput { deleted: 0 });
    };

    let mut deleted_total = 0u64;

    if let Some(pattern) = params.pattern {
        deleted_total += store.purge_matching(&pattern).await?;
    }

    if let Some(max_entries) = params.max_entries {
        deleted_total += store.purge_lru(max_entries).await?;
    }

    tracing::info!(store = %store.name(), deleted = deleted_total, "purged cache entries");
    json_result(&CachePurgeOutput { deleted: deleted_total })
}
