use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use annotator_core::probe::{DisabledProbe, DurationProbe, FfprobeDurationProbe};

/// Error raised for a malformed configuration value.
#[derive(Debug, thiserror::Error)]
#[error("{key} is invalid: '{value}' ({reason})")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Which duration lookup backs video submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// Run `ffprobe` against the submitted URL.
    Ffprobe,
    /// Never look durations up.
    Disabled,
}

impl FromStr for ProbeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ffprobe" => Ok(ProbeKind::Ffprobe),
            "none" | "disabled" | "off" => Ok(ProbeKind::Disabled),
            other => Err(format!("expected 'ffprobe' or 'none', got '{other}'")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Per-URL duration lookup timeout in seconds (default: `15`).
    pub probe_timeout_secs: u64,
    /// Duration lookup backend (default: `ffprobe`).
    pub duration_probe: ProbeKind,
    /// Maximum duration lookups in flight per submission (default: `8`).
    pub probe_concurrency: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            cors_origins: vec!["http://localhost:5173".into()],
            request_timeout_secs: 30,
            probe_timeout_secs: 15,
            duration_probe: ProbeKind::Ffprobe,
            probe_concurrency: 8,
        }
    }
}

fn parse_var<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            value,
            reason: e.to_string(),
        }),
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `PROBE_TIMEOUT_SECS`   | `15`                       |
    /// | `DURATION_PROBE`       | `ffprobe` (`none` disables)|
    /// | `PROBE_CONCURRENCY`    | `8` (must be at least 1)   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_var("PORT", lookup("PORT"), defaults.port)?;

        let cors_origins = match lookup("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        let request_timeout_secs = parse_var(
            "REQUEST_TIMEOUT_SECS",
            lookup("REQUEST_TIMEOUT_SECS"),
            defaults.request_timeout_secs,
        )?;
        let probe_timeout_secs = parse_var(
            "PROBE_TIMEOUT_SECS",
            lookup("PROBE_TIMEOUT_SECS"),
            defaults.probe_timeout_secs,
        )?;
        let duration_probe = parse_var(
            "DURATION_PROBE",
            lookup("DURATION_PROBE"),
            defaults.duration_probe,
        )?;

        let probe_concurrency = parse_var(
            "PROBE_CONCURRENCY",
            lookup("PROBE_CONCURRENCY"),
            defaults.probe_concurrency,
        )?;
        if probe_concurrency == 0 {
            return Err(ConfigError {
                key: "PROBE_CONCURRENCY",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            probe_timeout_secs,
            duration_probe,
            probe_concurrency,
        })
    }

    /// Instantiate the configured duration probe.
    pub fn build_probe(&self) -> Arc<dyn DurationProbe> {
        match self.duration_probe {
            ProbeKind::Ffprobe => Arc::new(FfprobeDurationProbe::new(Duration::from_secs(
                self.probe_timeout_secs,
            ))),
            ProbeKind::Disabled => Arc::new(DisabledProbe),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.duration_probe, ProbeKind::Ffprobe);
        assert_eq!(config.probe_concurrency, 8);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("CORS_ORIGINS", "http://a.test, ,http://b.test"),
            ("DURATION_PROBE", "none"),
            ("PROBE_TIMEOUT_SECS", "3"),
            ("PROBE_CONCURRENCY", "2"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.duration_probe, ProbeKind::Disabled);
        assert_eq!(config.probe_timeout_secs, 3);
        assert_eq!(config.probe_concurrency, 2);
    }

    #[test]
    fn zero_probe_concurrency_rejected() {
        let err =
            ServerConfig::from_lookup(lookup_from(&[("PROBE_CONCURRENCY", "0")])).unwrap_err();
        assert_eq!(err.key, "PROBE_CONCURRENCY");
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = ServerConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(err.key, "PORT");
        assert!(err.to_string().contains("eighty"));
    }

    #[test]
    fn unknown_probe_kind_rejected() {
        assert!(ServerConfig::from_lookup(lookup_from(&[("DURATION_PROBE", "youtube-dl")])).is_err());
    }
}
