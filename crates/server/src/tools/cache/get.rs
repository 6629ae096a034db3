//! cache_get tool implementation.
//!
//! Retrieves the cached GET response for a URL.

use pwacache_client::ServiceWorker;
use pwacache_core::{Error, RequestDescriptor, ResponseType};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path relative to the application origin.
    pub url: String,

    /// Store to search (default: the current version's store).
    #[serde(default)]
    pub store: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub store: String,
    pub url: String,
    pub status: u16,
    pub response_type: ResponseType,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(worker: &ServiceWorker, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = worker.resolve(&params.url)?;
    let name = params.store.unwrap_or_else(|| worker.version().to_string());

    let store = worker
        .db()
        .existing_store(&name)
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("no cache store named {name}")))?;

    let response = store
        .match_request(&RequestDescriptor::get(url.clone()))
        .await?
        .ok_or_else(|| Error::CacheMiss(url.to_string()))?;

    let output = CacheGetOutput {
        store: name,
        url: response.url().to_string(),
        status: response.status(),
        response_type: response.response_type(),
        headers: response.headers().to_vec(),
        body: String::from_utf8_lossy(response.body()).into_owned(),
    };
    json_result(&output)
}
