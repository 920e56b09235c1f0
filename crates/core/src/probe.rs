//! Best-effort video duration lookup.
//!
//! Submissions without a `duration` ask a [`DurationProbe`] for one,
//! keyed by the video URL. A failed lookup is never fatal: callers log it
//! and store `NULL`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

/// Error type for duration lookups.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("ffprobe binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffprobe execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("duration lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("no duration reported for {0}")]
    Missing(String),

    #[error("only http and https URLs are probed, got '{0}'")]
    UnsupportedUrl(String),
}

/// Looks up the duration of a video, in whole seconds.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    async fn duration_secs(&self, url: &str) -> Result<i32, ProbeError>;
}

/// Probe that never finds a duration. Used when lookups are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledProbe;

#[async_trait]
impl DurationProbe for DisabledProbe {
    async fn duration_secs(&self, url: &str) -> Result<i32, ProbeError> {
        Err(ProbeError::Missing(url.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ffprobe
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Runs `ffprobe -show_format` against the URL.
///
/// Only `http` and `https` URLs are handed to ffprobe, as the `-i` input and
/// with ffprobe's protocol whitelist restricted to the network protocols
/// those need. Anything else is refused before a process is spawned.
#[derive(Debug, Clone)]
pub struct FfprobeDurationProbe {
    binary: String,
    timeout: Duration,
}

impl FfprobeDurationProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            binary: "ffprobe".to_string(),
            timeout,
        }
    }

    /// Use a non-default ffprobe binary path.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn duration_secs(&self, url: &str) -> Result<i32, ProbeError> {
        if !is_http_url(url) {
            return Err(ProbeError::UnsupportedUrl(url.to_string()));
        }

        let command = tokio::process::Command::new(&self.binary)
            .args(["-v", "quiet", "-protocol_whitelist", "http,https,tcp,tls"])
            .args(["-print_format", "json", "-show_format", "-i"])
            .arg(url)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, command)
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
            .map_err(ProbeError::NotFound)?;

        if !output.status.success() {
            return Err(ProbeError::ExecutionFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_ffprobe_duration(&stdout)?.ok_or_else(|| ProbeError::Missing(url.to_string()))
    }
}

/// Whether `url` has an `http://` or `https://` scheme and a host part.
fn is_http_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    ["http://", "https://"].iter().any(|scheme| {
        lower
            .strip_prefix(scheme)
            .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/'))
    })
}

/// Extract whole seconds from ffprobe's JSON output, rounding to nearest.
fn parse_ffprobe_duration(stdout: &str) -> Result<Option<i32>, ProbeError> {
    let parsed: FfprobeOutput = serde_json::from_str(stdout)
        .map_err(|e| ProbeError::ParseError(format!("{e}: {stdout}")))?;

    let Some(raw) = parsed.format.duration else {
        return Ok(None);
    };
    let secs: f64 = raw
        .parse()
        .map_err(|_| ProbeError::ParseError(format!("invalid duration '{raw}'")))?;
    if !secs.is_finite() || secs < 0.0 || secs > f64::from(i32::MAX) {
        return Err(ProbeError::ParseError(format!("invalid duration '{raw}'")));
    }
    Ok(Some(secs.round() as i32))
}

/// Resolve a duration, logging and swallowing any lookup failure.
pub async fn lookup_or_none(probe: &dyn DurationProbe, url: &str) -> Option<i32> {
    match probe.duration_secs(url).await {
        Ok(secs) => {
            tracing::debug!(url, duration = secs, "Resolved video duration");
            Some(secs)
        }
        Err(e) => {
            tracing::warn!(url, error = %e, "Duration lookup failed, storing no duration");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_and_rounds_duration() {
        let out = r#"{"format": {"duration": "119.6", "format_name": "mov,mp4"}}"#;
        assert_eq!(parse_ffprobe_duration(out).unwrap(), Some(120));
    }

    #[test]
    fn missing_duration_is_none() {
        let out = r#"{"format": {"format_name": "hls"}}"#;
        assert_eq!(parse_ffprobe_duration(out).unwrap(), None);
    }

    #[test]
    fn garbage_output_is_parse_error() {
        assert_matches!(parse_ffprobe_duration("nope"), Err(ProbeError::ParseError(_)));
        let out = r#"{"format": {"duration": "N/A"}}"#;
        assert_matches!(parse_ffprobe_duration(out), Err(ProbeError::ParseError(_)));
    }

    #[test]
    fn only_http_urls_are_probeable() {
        assert!(is_http_url("https://youtube.com/watch?v=abc123"));
        assert!(is_http_url("HTTP://cdn.test/v.mp4"));
        for url in ["-report", "file:///etc/passwd", "ftp://x/v.mp4", "https://", "http:///v", "x"] {
            assert!(!is_http_url(url), "{url}");
        }
    }

    #[tokio::test]
    async fn non_http_urls_never_reach_ffprobe() {
        // A missing binary would report NotFound if a process were spawned.
        let probe = FfprobeDurationProbe::new(Duration::from_secs(1))
            .with_binary("/nonexistent/ffprobe-binary");
        for url in ["-report", "file:///etc/passwd", "concat:a.mp4|b.mp4"] {
            assert_matches!(
                probe.duration_secs(url).await,
                Err(ProbeError::UnsupportedUrl(u)) if u == url
            );
            assert_eq!(lookup_or_none(&probe, url).await, None);
        }
    }

    #[tokio::test]
    async fn disabled_probe_yields_none() {
        assert_eq!(lookup_or_none(&DisabledProbe, "https://x/v.mp4").await, None);
    }

    #[tokio::test]
    async fn missing_binary_yields_none() {
        let probe = FfprobeDurationProbe::new(Duration::from_secs(1))
            .with_binary("/nonexistent/ffprobe-binary");
        assert_matches!(
            probe.duration_secs("https://x/v.mp4").await,
            Err(ProbeError::NotFound(_))
        );
        assert_eq!(lookup_or_none(&probe, "https://x/v.mp4").await, None);
    }
}
