//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PWACACHE_*)
//! 2. TOML config file (if PWACACHE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! List values given through the environment use array syntax, e.g.
//! `PWACACHE_EXCLUDE_PATTERNS='["/api/", "/login"]'`.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Icon shown on push notifications (also used as the badge).
pub const DEFAULT_NOTIFICATION_ICON: &str = "/static/images/icons/icon-192x192.png";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PWACACHE_*)
/// 2. TOML config file (if PWACACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache storage database.
    ///
    /// Set via PWACACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Version-tagged name of the authoritative cache store.
    ///
    /// Bump on deploy to invalidate every previously cached asset.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Origin of the application. Relative URLs resolve against it and
    /// responses from it are classified as `basic`.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// URLs seeded into the cache store at install time.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// URL substrings that are never written to the cache.
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// User-Agent string for network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Background sync tag the worker responds to.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// Title used when a push payload carries none.
    #[serde(default = "default_notification_title")]
    pub notification_title: String,

    #[serde(default = "default_notification_icon")]
    pub notification_icon: String,

    #[serde(default = "default_notification_icon")]
    pub notification_badge: String,

    /// URL opened or focused when a notification is clicked.
    #[serde(default = "default_root_url")]
    pub root_url: String,

    /// Cached page served when a navigation fails with a network error.
    ///
    /// Unset by default: network errors reach the caller unchanged.
    #[serde(default)]
    pub offline_fallback: Option<String>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./pwacache.sqlite")
}

fn default_cache_name() -> String {
    "amigo-do-povo-v1".into()
}

fn default_origin() -> String {
    "http://localhost:5000".into()
}

fn default_manifest() -> Vec<String> {
    [
        "/",
        "/static/images/icons/icon-192x192.png",
        "/static/images/icons/icon-512x512.png",
        "/static/images/icons/maskable-icon.png",
        "https://cdn.jsdelivr.net/npm/bootstrap@5.1.3/dist/css/bootstrap.min.css",
        "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.0.0/css/all.min.css",
        "https://cdn.jsdelivr.net/npm/bootstrap@5.1.3/dist/js/bootstrap.bundle.min.js",
        "https://code.jquery.com/jquery-3.6.0.min.js",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_exclude_patterns() -> Vec<String> {
    vec!["/api/".into(), "/login".into(), "/logout".into()]
}

fn default_user_agent() -> String {
    "pwacache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_sync_tag() -> String {
    "sync-data".into()
}

fn default_notification_title() -> String {
    "Amigo do Povo".into()
}

fn default_notification_icon() -> String {
    DEFAULT_NOTIFICATION_ICON.into()
}

fn default_root_url() -> String {
    "/".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_name: default_cache_name(),
            origin: default_origin(),
            manifest: default_manifest(),
            exclude_patterns: default_exclude_patterns(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            sync_tag: default_sync_tag(),
            notification_title: default_notification_title(),
            notification_icon: default_notification_icon(),
            notification_badge: default_notification_icon(),
            root_url: default_root_url(),
            offline_fallback: None,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PWACACHE_`
    /// 2. TOML file from `PWACACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PWACACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PWACACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./pwacache.sqlite"));
        assert_eq!(config.cache_name, "amigo-do-povo-v1");
        assert_eq!(config.origin, "http://localhost:5000");
        assert_eq!(config.manifest.len(), 8);
        assert_eq!(config.manifest[0], "/");
        assert_eq!(config.exclude_patterns, vec!["/api/", "/login", "/logout"]);
        assert_eq!(config.user_agent, "pwacache/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.sync_tag, "sync-data");
        assert_eq!(config.notification_icon, DEFAULT_NOTIFICATION_ICON);
        assert_eq!(config.notification_badge, DEFAULT_NOTIFICATION_ICON);
        assert_eq!(config.root_url, "/");
        assert!(config.offline_fallback.is_none());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_load_layers_env_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "pwacache.toml",
                r#"
                cache_name = "app-cache-v2"
                origin = "https://gym.example.com"
                "#,
            )?;
            jail.set_env("PWACACHE_CONFIG_FILE", "pwacache.toml");
            jail.set_env("PWACACHE_ORIGIN", "https://academia.example.com");
            jail.set_env("PWACACHE_EXCLUDE_PATTERNS", r#"["/api/"]"#);

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.cache_name, "app-cache-v2");
            assert_eq!(config.origin, "https://academia.example.com");
            assert_eq!(config.exclude_patterns, vec!["/api/"]);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PWACACHE_TIMEOUT_MS", "5");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { .. })));
            Ok(())
        });
    }
}
