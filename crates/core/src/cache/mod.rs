//! SQLite-backed cache storage for the offline cache manager.
//!
//! This module provides persistent, named cache stores using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Version-tagged stores created on demand and deleted as a whole
//! - Request -> response entries keyed by SHA-256 of method and URL
//! - `Vary`-aware matching
//! - Persisted worker lifecycle state per version tag
//! - Purge strategies for a store (URL pattern, LRU)

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod policy;
pub mod registrations;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::EntrySummary;
pub use policy::CachePolicy;
pub use registrations::WorkerState;
pub use stores::CacheStore;
