//! Core types and shared functionality for pwacache.
//!
//! This crate provides:
//! - Cache storage with SQLite backend (stores, entries, worker registrations)
//! - Request/response values and the runtime caching policy
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod message;

pub use cache::{CacheDb, CachePolicy, CacheStore, EntrySummary, WorkerState};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use message::{RequestDescriptor, ResponseSnapshot, ResponseType};
