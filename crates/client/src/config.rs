use std::str::FromStr;

/// Error raised for a malformed client configuration value.
#[derive(Debug, thiserror::Error)]
#[error("{key} is invalid: '{value}'")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the API server, without a trailing slash.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".into(),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                 |
    /// |-----------------------|-------------------------|
    /// | `ANNOTATOR_API_URL`   | `http://localhost:5000` |
    /// | `CLIENT_TIMEOUT_SECS` | `30`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = lookup("ANNOTATOR_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_url);

        let timeout_secs = match lookup("CLIENT_TIMEOUT_SECS") {
            Some(raw) => u64::from_str(raw.trim()).map_err(|_| ConfigError {
                key: "CLIENT_TIMEOUT_SECS",
                value: raw,
            })?,
            None => defaults.timeout_secs,
        };

        Ok(Self {
            api_url,
            timeout_secs,
        })
    }
}
