//! Rules deciding which intercepted responses may be written to the cache.

use crate::message::{ResponseSnapshot, ResponseType};

/// Runtime caching rules.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    exclude_patterns: Vec<String>,
}

impl CachePolicy {
    pub fn new(exclude_patterns: Vec<String>) -> Self {
        Self { exclude_patterns }
    }

    /// True if the URL contains any exclusion pattern.
    ///
    /// Excluded requests are session-bound or dynamic and always go to the
    /// network, whatever the response looks like.
    pub fn is_excluded(&self, url: &str) -> bool {
        self.exclude_patterns.iter().any(|pattern| url.contains(pattern.as_str()))
    }

    /// True for exactly status 200 with a same-origin `basic` response.
    pub fn is_cacheable(&self, response: &ResponseSnapshot) -> bool {
        response.status() == 200 && response.response_type() == ResponseType::Basic
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(vec!["/api/".into(), "/login".into(), "/logout".into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn response(status: u16, response_type: ResponseType) -> ResponseSnapshot {
        ResponseSnapshot::new(Url::parse("http://localhost:5000/dashboard").unwrap(), status, response_type)
    }

    #[test]
    fn test_exclusions() {
        let policy = CachePolicy::default();
        assert!(policy.is_excluded("http://localhost:5000/api/students"));
        assert!(policy.is_excluded("http://localhost:5000/login"));
        assert!(policy.is_excluded("http://localhost:5000/login?next=/dashboard"));
        assert!(policy.is_excluded("http://localhost:5000/logout"));
        assert!(!policy.is_excluded("http://localhost:5000/dashboard"));
        assert!(!policy.is_excluded("http://localhost:5000/static/css/app.css"));
    }

    #[test]
    fn test_cacheable_requires_200_basic() {
        let policy = CachePolicy::default();
        assert!(policy.is_cacheable(&response(200, ResponseType::Basic)));
        assert!(!policy.is_cacheable(&response(204, ResponseType::Basic)));
        assert!(!policy.is_cacheable(&response(404, ResponseType::Basic)));
        assert!(!policy.is_cacheable(&response(500, ResponseType::Basic)));
        assert!(!policy.is_cacheable(&response(200, ResponseType::Cors)));
        assert!(!policy.is_cacheable(&response(200, ResponseType::Opaque)));
        assert!(!policy.is_cacheable(&response(200, ResponseType::Error)));
    }

    #[test]
    fn test_custom_patterns() {
        let policy = CachePolicy::new(vec!["/relatorios/".into()]);
        assert!(policy.is_excluded("http://localhost:5000/relatorios/mensal"));
        assert!(!policy.is_excluded("http://localhost:5000/api/students"));
    }
}
