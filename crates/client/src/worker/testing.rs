//! In-memory network and worker fixtures for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pwacache_core::{CacheDb, CachePolicy, Error, RequestDescriptor, ResponseSnapshot, ResponseType};
use url::Url;

use super::{RecordingHost, ServiceWorker, WorkerConfig};
use crate::fetch::Network;

pub(crate) const ORIGIN: &str = "http://localhost:5000";

pub(crate) const MANIFEST: &[&str] = &[
    "/",
    "/static/images/icons/icon-192x192.png",
    "https://cdn.jsdelivr.net/npm/bootstrap@5.1.3/dist/css/bootstrap.min.css",
];

enum Route {
    Respond(ResponseSnapshot),
    Fail(String),
}

/// Network double keyed by absolute URL. Unknown URLs answer 404.
#[derive(Default)]
pub(crate) struct StubNetwork {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
}

impl StubNetwork {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `url` with the given status and body, classified by origin.
    pub(crate) fn respond(&self, url: &str, status: u16, body: &str) {
        let parsed = Url::parse(url).unwrap();
        let response_type = if parsed.origin() == Url::parse(ORIGIN).unwrap().origin() {
            ResponseType::Basic
        } else {
            ResponseType::Cors
        };
        self.respond_with(url, ResponseSnapshot::new(parsed, status, response_type).with_body(body.to_string()));
    }

    pub(crate) fn respond_with(&self, url: &str, response: ResponseSnapshot) {
        self.routes.lock().unwrap().insert(url.to_string(), Route::Respond(response));
    }

    pub(crate) fn fail(&self, url: &str, reason: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), Route::Fail(reason.to_string()));
    }

    pub(crate) fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|called| called.as_str() == url).count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Serve every manifest entry with 200.
    pub(crate) fn serve_manifest(&self) {
        for entry in MANIFEST {
            let url = absolute(entry);
            self.respond(&url, 200, &format!("asset {entry}"));
        }
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: RequestDescriptor) -> Result<ResponseSnapshot, Error> {
        let url = request.url().to_string();
        self.calls.lock().unwrap().push(url.clone());
        match self.routes.lock().unwrap().get(&url) {
            Some(Route::Respond(response)) => Ok(response.clone()),
            Some(Route::Fail(reason)) => Err(Error::Network(reason.clone())),
            None => Ok(ResponseSnapshot::new(request.url().clone(), 404, ResponseType::Basic).with_body("not found")),
        }
    }
}

pub(crate) fn absolute(entry: &str) -> String {
    Url::parse(ORIGIN).unwrap().join(entry).unwrap().to_string()
}

pub(crate) fn get(entry: &str) -> RequestDescriptor {
    RequestDescriptor::get(Url::parse(&absolute(entry)).unwrap())
}

pub(crate) fn config(cache_name: &str) -> WorkerConfig {
    WorkerConfig {
        cache_name: cache_name.to_string(),
        origin: Url::parse(ORIGIN).unwrap(),
        manifest: MANIFEST.iter().map(|entry| entry.to_string()).collect(),
        policy: CachePolicy::default(),
        sync_tag: "sync-data".to_string(),
        notification_title: "Amigo do Povo".to_string(),
        notification_icon: "/static/images/icons/icon-192x192.png".to_string(),
        notification_badge: "/static/images/icons/icon-192x192.png".to_string(),
        root_url: "/".to_string(),
        offline_fallback: None,
    }
}

pub(crate) struct Fixture {
    pub(crate) db: CacheDb,
    pub(crate) network: Arc<StubNetwork>,
    pub(crate) host: Arc<RecordingHost>,
}

impl Fixture {
    pub(crate) async fn new() -> Self {
        Self {
            db: CacheDb::open_in_memory().await.unwrap(),
            network: StubNetwork::new(),
            host: Arc::new(RecordingHost::new()),
        }
    }

    pub(crate) fn worker(&self, config: WorkerConfig) -> ServiceWorker {
        ServiceWorker::new(self.db.clone(), self.network.clone(), self.host.clone(), config)
    }

    /// Worker for `cache_name` that has been installed and activated.
    pub(crate) async fn active_worker(&self, cache_name: &str) -> ServiceWorker {
        self.network.serve_manifest();
        let worker = self.worker(config(cache_name));
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        worker
    }
}
