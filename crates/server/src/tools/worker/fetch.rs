//! sw_fetch tool implementation.
//!
//! Delivers one intercepted request to the worker and waits for the event
//! to settle, so a cache write started by the request is visible to the
//! next call.

use std::collections::BTreeMap;

use pwacache_client::{FetchEvent, ResponseSource, ServiceWorker};
use pwacache_core::{Error, RequestDescriptor, ResponseType};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Input parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path relative to the application origin.
    pub url: String,

    /// HTTP method (default: GET). Only GET responses are cached.
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers; used for `Vary` matching against cached entries.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Whether this is a top-level page navigation.
    #[serde(default)]
    pub navigate: bool,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    pub url: String,
    pub status: u16,
    pub response_type: ResponseType,
    /// Where the response came from: cache, network or fallback.
    pub source: ResponseSource,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(worker: &ServiceWorker, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    let method = params.method.trim();
    if method.is_empty() || !method.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::InvalidInput(format!("invalid method: {:?}", params.method)).into());
    }

    let url = worker.resolve(&params.url)?;
    let mut request = RequestDescriptor::new(method, url);
    for (name, value) in params.headers {
        request = request.with_header(name, value);
    }
    if params.navigate {
        request = request.navigation();
    }

    let mut event = FetchEvent::new(request);
    let result = worker.handle_fetch(&mut event).await;
    event.settled().await;
    let intercepted = result?;

    let response = intercepted.response;
    let output = SwFetchOutput {
        url: response.url().to_string(),
        status: response.status(),
        response_type: response.response_type(),
        source: intercepted.source,
        headers: response.headers().to_vec(),
        body: String::from_utf8_lossy(response.body()).into_owned(),
        body_bytes: response.body().len(),
    };
    json_result(&output)
}
