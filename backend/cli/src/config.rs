use std::path::PathBuf;
use std::time::Duration;

/// ocrprobe runtime configuration, before CLI flags are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// OCR service address
    pub host: String,
    /// OCR service port
    pub port: u16,
    /// Bearer token sent with every request
    pub token: Option<String>,
    /// Upper bound on the WebSocket wait
    pub ws_timeout: Option<Duration>,
    /// Directory for the rolling NDJSON log
    pub log_dir: Option<PathBuf>,
    /// Emit console diagnostics as JSON
    pub log_json: bool,
    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "192.168.1.10".to_string(),
            port: 8080,
            token: None,
            ws_timeout: None,
            log_dir: None,
            log_json: false,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] over an arbitrary lookup (useful for testing).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("OCRPROBE_HOST")
                .filter(|h| !h.is_empty())
                .unwrap_or(defaults.host),
            port: lookup("OCRPROBE_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            token: lookup("OCRPROBE_TOKEN").filter(|t| !t.is_empty()),
            ws_timeout: lookup("OCRPROBE_WS_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
            log_dir: lookup("OCRPROBE_LOG_DIR")
                .filter(|d| !d.is_empty())
                .map(PathBuf::from),
            log_json: lookup("OCRPROBE_LOG_JSON")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }
}
