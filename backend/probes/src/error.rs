use thiserror::Error;

/// Failures inside a probe. All but `Output` are reported and absorbed at the
/// probe boundary; `Output` means the report itself cannot be written.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("WebSocket error on {url}: {source}")]
    WebSocket {
        url: String,
        #[source]
        source: Box<tokio_tungstenite::tungstenite::Error>,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

impl ProbeError {
    pub fn http(url: &str, source: reqwest::Error) -> Self {
        Self::Http { url: url.to_string(), source }
    }

    pub fn websocket(url: &str, source: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket { url: url.to_string(), source: Box::new(source) }
    }
}
