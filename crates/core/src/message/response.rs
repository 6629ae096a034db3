use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use super::find_header;

/// Classification of a network response relative to the application origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same origin as the application.
    Basic,
    /// Cross-origin, served with CORS headers.
    Cors,
    /// Cross-origin without CORS headers; contents cannot be validated.
    Opaque,
    /// Synthetic network failure.
    Error,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Opaque => "opaque",
            ResponseType::Error => "error",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(ResponseType::Basic),
            "cors" => Ok(ResponseType::Cors),
            "opaque" => Ok(ResponseType::Opaque),
            "error" => Ok(ResponseType::Error),
            other => Err(format!("unknown response type: {other}")),
        }
    }
}

/// A network (or cached) response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSnapshot {
    url: Url,
    status: u16,
    response_type: ResponseType,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl ResponseSnapshot {
    pub fn new(url: Url, status: u16, response_type: ResponseType) -> Self {
        Self { url, status, response_type, headers: Vec::new(), body: Bytes::new() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Final URL of the response, after redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// True for 2xx statuses.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Request header names listed in `Vary`, lower-cased.
    pub fn vary(&self) -> Vec<String> {
        self.header("vary")
            .map(|value| {
                value
                    .split(',')
                    .map(|name| name.trim().to_ascii_lowercase())
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> ResponseSnapshot {
        ResponseSnapshot::new(Url::parse("http://localhost:5000/").unwrap(), status, ResponseType::Basic)
    }

    #[test]
    fn test_response_type_round_trip() {
        for ty in [ResponseType::Basic, ResponseType::Cors, ResponseType::Opaque, ResponseType::Error] {
            assert_eq!(ty.as_str().parse::<ResponseType>().unwrap(), ty);
        }
        assert!("weird".parse::<ResponseType>().is_err());
    }

    #[test]
    fn test_is_ok() {
        assert!(response(200).is_ok());
        assert!(response(204).is_ok());
        assert!(!response(304).is_ok());
        assert!(!response(404).is_ok());
        assert!(!response(500).is_ok());
    }

    #[test]
    fn test_vary_parsing() {
        let res = response(200).with_header("Vary", "Accept-Encoding, Accept-Language");
        assert_eq!(res.vary(), vec!["accept-encoding", "accept-language"]);
        assert!(response(200).vary().is_empty());
    }

    #[test]
    fn test_clone_shares_body() {
        let res = response(200).with_body(Bytes::from_static(b"<html></html>"));
        let cloned = res.clone();
        assert_eq!(res.body(), cloned.body());
        assert_eq!(cloned.status(), 200);
    }
}
