//! pwacache server entry point.
//!
//! Boots the offline cache worker and exposes its events as MCP tools on
//! stdio. Logging goes to stderr to avoid interfering with the JSON-RPC
//! protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use pwacache_client::{FetchClient, FetchConfig, RecordingHost, ServiceWorker, WorkerConfig};
use pwacache_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(
        cache_name = %config.cache_name,
        origin = %config.origin,
        db_path = %config.db_path.display(),
        "starting pwacache server on stdio transport"
    );

    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache database {}", config.db_path.display()))?;
    let network = FetchClient::new(FetchConfig::from_app_config(&config)?)?;
    let host = Arc::new(RecordingHost::new());
    let worker = ServiceWorker::new(db, Arc::new(network), host.clone(), WorkerConfig::from_app_config(&config)?);

    let handler = handler::PwaCacheServer::new(Arc::new(worker), host);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
