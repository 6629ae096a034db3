//! MCP tool implementations.
//!
//! Worker event tools live in `worker`, cache maintenance tools in `cache`.
//! Every tool answers with pretty-printed JSON as text content.

pub mod cache;
pub mod worker;

use pwacache_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Serialize a tool output into a successful text result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
