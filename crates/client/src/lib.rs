//! Client code for pwacache.
//!
//! This crate provides the network layer and the offline cache worker
//! (lifecycle, fetch interception, sync/push/notification events) shared by
//! the server.

pub mod fetch;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, Network};
pub use worker::{
    ActivateReport, ClientHost, ExtendableEvent, FetchEvent, HostAction, InstallReport, InterceptedResponse,
    Notification, RecordingHost, ResponseSource, ServiceWorker, SyncOutcome, WorkerConfig, WorkerStatus,
};
