//! Network layer used by the worker on cache misses and at install.
//!
//! ### Request Handling
//! - Requests arrive as resolved `RequestDescriptor`s and are sent as-is
//!   (method and headers preserved).
//! - Non-2xx statuses are responses, not errors: the caller decides what to
//!   do with them.
//! - Max redirects: 5. Max body bytes: 5MB (configurable).
//!
//! ### Response Classification
//! - Final URL on the application origin: `basic`
//! - Cross-origin with `Access-Control-Allow-Origin`: `cors`
//! - Any other cross-origin response: `opaque`

pub mod url;

use async_trait::async_trait;
use pwacache_core::{AppConfig, Error, RequestDescriptor, ResponseSnapshot, ResponseType};
use reqwest::Url;
use reqwest::{Client, Method, header};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, resolve, same_origin};

/// Something that can perform a network request.
///
/// The request is taken by value: callers that still need it for the cache
/// key clone it first.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: RequestDescriptor) -> Result<ResponseSnapshot, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Application origin used to classify responses.
    pub origin: Url,

    /// User agent string (default: "pwacache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl FetchConfig {
    /// Build from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("origin: {e}")))?;
        Ok(Self {
            origin,
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        })
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            origin: Url::parse("http://localhost:5000").expect("static origin parses"),
            user_agent: "pwacache/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

/// Classify a response by where it finally came from.
pub fn classify(origin: &Url, final_url: &Url, headers: &header::HeaderMap) -> ResponseType {
    if same_origin(origin, final_url) {
        ResponseType::Basic
    } else if headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN) {
        ResponseType::Cors
    } else {
        ResponseType::Opaque
    }
}

/// reqwest-backed network client.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

fn map_send_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::FetchTimeout(err.to_string()) } else { Error::Network(err.to_string()) }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: RequestDescriptor) -> Result<ResponseSnapshot, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method().as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {e}", request.method())))?;

        let mut builder = self.http.request(method, request.url().clone());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(map_send_error)?;

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let status = response.status();
        let final_url = response.url().clone();
        let response_type = classify(&self.config.origin, &final_url, response.headers());
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        let bytes = response.bytes().await.map_err(map_send_error)?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        tracing::debug!(
            method = request.method(),
            url = %request.url(),
            final_url = %final_url,
            status = status.as_u16(),
            response_type = %response_type,
            bytes = bytes.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "network fetch complete"
        );

        Ok(ResponseSnapshot::new(final_url, status.as_u16(), response_type)
            .with_headers(headers)
            .with_body(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("http://localhost:5000").unwrap()
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.origin.as_str(), "http://localhost:5000/");
        assert_eq!(config.user_agent, "pwacache/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { origin: "https://academia.example.com".into(), timeout_ms: 5000, ..Default::default() };
        let config = FetchConfig::from_app_config(&app).unwrap();
        assert_eq!(config.origin.host_str(), Some("academia.example.com"));
        assert_eq!(config.timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_classify_same_origin_is_basic() {
        let final_url = Url::parse("http://localhost:5000/dashboard").unwrap();
        assert_eq!(classify(&origin(), &final_url, &header::HeaderMap::new()), ResponseType::Basic);
    }

    #[test]
    fn test_classify_cross_origin() {
        let final_url = Url::parse("https://cdn.jsdelivr.net/npm/bootstrap.min.css").unwrap();
        assert_eq!(classify(&origin(), &final_url, &header::HeaderMap::new()), ResponseType::Opaque);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, header::HeaderValue::from_static("*"));
        assert_eq!(classify(&origin(), &final_url, &headers), ResponseType::Cors);
    }

    #[test]
    fn test_classify_redirect_off_origin() {
        let final_url = Url::parse("http://localhost:8080/login").unwrap();
        assert_eq!(classify(&origin(), &final_url, &header::HeaderMap::new()), ResponseType::Opaque);
    }

    #[tokio::test]
    async fn test_fetch_client_new() {
        let client = FetchClient::new(FetchConfig::default());
        assert!(client.is_ok());
    }
}
