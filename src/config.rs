//! Configuration management for the command line tool

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MANIFEST_URL: &str = "https://references.taskcluster.net/manifest.json";
pub const DEFAULT_AUTH_URL: &str = "https://auth.taskcluster.net/v1";

/// Location of the endpoint cache, relative to the application cache directory
const PING_URLS_CACHE_FILE: [&str; 2] = ["status", "pingURLs.json"];

#[derive(Debug, Clone)]
pub struct Config {
    /// Manifest listing every service and its API reference
    pub manifest_url: String,

    /// Base URL of the authorization service
    pub auth_url: String,

    /// Per-application cache directory
    pub cache_dir: PathBuf,

    /// Age after which the cached ping URLs are scraped again
    pub max_cache_age: Duration,

    /// Request timeout; the HTTP client default applies when unset
    pub http_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            cache_dir: default_cache_dir(),
            max_cache_age: Duration::from_secs(24 * 60 * 60),
            http_timeout: None,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("cluster-cli")
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(manifest_url) = lookup("CLUSTER_MANIFEST_URL") {
            config.manifest_url = manifest_url;
        }

        if let Some(auth_url) = lookup("CLUSTER_AUTH_URL") {
            config.auth_url = auth_url.trim_end_matches('/').to_string();
        }

        if let Some(cache_dir) = lookup("CLUSTER_CACHE_DIR") {
            config.cache_dir = PathBuf::from(cache_dir);
        }

        if let Some(hours) = lookup("CLUSTER_CACHE_MAX_AGE_HOURS") {
            if let Some(seconds) = hours.parse::<u64>().ok().and_then(|h| h.checked_mul(60 * 60)) {
                config.max_cache_age = Duration::from_secs(seconds);
            }
        }

        if let Some(timeout) = lookup("CLUSTER_HTTP_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.http_timeout = Some(Duration::from_secs(seconds));
            }
        }

        config
    }

    /// Full path of the ping URL cache file
    pub fn cache_path(&self) -> PathBuf {
        PING_URLS_CACHE_FILE
            .iter()
            .fold(self.cache_dir.clone(), |path, part| path.join(part))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.manifest_url.is_empty() {
            return Err("manifest_url cannot be empty".to_string());
        }

        if url::Url::parse(&self.manifest_url).is_err() {
            return Err(format!("manifest_url is not a valid URL: {}", self.manifest_url));
        }

        if self.auth_url.is_empty() {
            return Err("auth_url cannot be empty".to_string());
        }

        if self.cache_dir.as_os_str().is_empty() {
            return Err("cache_dir cannot be empty".to_string());
        }

        if self.max_cache_age.is_zero() {
            return Err("max_cache_age must be greater than 0".to_string());
        }

        if self.http_timeout.is_some_and(|t| t.is_zero()) {
            return Err("http_timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}
