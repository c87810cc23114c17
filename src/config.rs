//! Process-wide client settings.
//! Fixed at startup: the client copies what it needs on construction and never re-reads them.

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_API_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_TOKEN_KEY: &str = "auth_token";

pub const ENV_API_BASE_URL: &str = "ALUMNAE_API_BASE_URL";
pub const ENV_API_TIMEOUT_MS: &str = "ALUMNAE_API_TIMEOUT_MS";
pub const ENV_TOKEN_KEY: &str = "ALUMNAE_TOKEN_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend root, including any path prefix such as `/api`.
    pub base_url: String,
    /// Upper bound on every request, connect through body.
    pub timeout: Duration,
    /// Storage key holding the bearer token.
    pub token_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_API_TIMEOUT_MS),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    /// Defaults overridden by `ALUMNAE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|s| !s.trim().is_empty()) {
            cfg.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_API_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => cfg.timeout = Duration::from_millis(ms),
                _ => warn!("ignoring {}='{}': expected a positive number of milliseconds", ENV_API_TIMEOUT_MS, raw),
            }
        }
        if let Some(key) = lookup(ENV_TOKEN_KEY).filter(|s| !s.trim().is_empty()) {
            cfg.token_key = key;
        }
        cfg
    }
}
