use std::path::PathBuf;
use std::time::Duration;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub api_base_url: String,
    /// Origin the dashboard is served from. Checked against the session
    /// allow-list.
    pub app_origin: String,
    /// JSON file holding the persisted access token.
    pub token_store_path: PathBuf,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            app_origin: "http://localhost:3000".into(),
            token_store_path: PathBuf::from(".bizdesk/storage.json"),
            request_timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `API_BASE_URL`         | `http://localhost:8000`    |
    /// | `APP_ORIGIN`           | `http://localhost:3000`    |
    /// | `TOKEN_STORE_PATH`     | `.bizdesk/storage.json`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base_url = lookup("API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let app_origin = lookup("APP_ORIGIN").unwrap_or(defaults.app_origin);

        let token_store_path = lookup("TOKEN_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.token_store_path);

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "REQUEST_TIMEOUT_SECS",
                expected: "u64",
                value,
            })?,
            None => defaults.request_timeout_secs,
        };

        Ok(Self {
            api_base_url,
            app_origin,
            token_store_path,
            request_timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
