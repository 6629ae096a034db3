use serde::{Deserialize, Serialize};
use url::Url;

use super::find_header;

/// An outgoing request as seen by the worker.
///
/// Used as the cache lookup key and, cloned, as the request handed to the
/// network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    method: String,
    url: Url,
    headers: Vec<(String, String)>,
    navigate: bool,
}

impl RequestDescriptor {
    /// Build a request with the given method. The method is upper-cased.
    pub fn new(method: &str, url: Url) -> Self {
        Self { method: method.to_ascii_uppercase(), url, headers: Vec::new(), navigate: false }
    }

    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    /// Add a request header, keeping insertion order.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Mark the request as a top-level navigation (page load).
    pub fn navigation(mut self) -> Self {
        self.navigate = true;
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn is_navigation(&self) -> bool {
        self.navigate
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_method_is_uppercased() {
        let request = RequestDescriptor::new("post", url("http://localhost:5000/api/alunos"));
        assert_eq!(request.method(), "POST");
        assert!(!request.is_get());
    }

    #[test]
    fn test_get_defaults() {
        let request = RequestDescriptor::get(url("http://localhost:5000/dashboard"));
        assert!(request.is_get());
        assert!(!request.is_navigation());
        assert!(request.headers().is_empty());
    }

    #[test]
    fn test_builder_headers_and_navigation() {
        let request = RequestDescriptor::get(url("http://localhost:5000/"))
            .with_header("Accept", "text/html")
            .navigation();
        assert_eq!(request.header("accept"), Some("text/html"));
        assert!(request.is_navigation());
    }

    #[test]
    fn test_clone_is_equal() {
        let request = RequestDescriptor::get(url("http://localhost:5000/")).with_header("Accept-Language", "pt-BR");
        let cloned = request.clone();
        assert_eq!(request, cloned);
    }
}
