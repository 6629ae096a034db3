//! Cache maintenance MCP tools.
//!
//! These inspect and trim the cache storage directly; they never fetch.

pub mod get;
pub mod keys;
pub mod purge;

pub use get::{CacheGetParams, get_impl};
pub use keys::{CacheKeysParams, keys_impl};
pub use purge::{CachePurgeParams, purge_impl};
