//! WebSocket protocol spoken with the OCR service on `/ws`.
//!
//! The client sends a single [`ClientMessage`]; the service answers with a
//! stream of [`WsEvent`]s of which exactly one (`result` or `error`) is terminal.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::fields;
use crate::types::{ImagePayload, OcrResult};

/// Client -> Server messages.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Recognize the embedded data-URI image.
    Ocr {
        image: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

impl ClientMessage {
    pub fn ocr(image: &ImagePayload, language: Option<&str>) -> Self {
        Self::Ocr {
            image: image.data_uri(),
            language: language.filter(|l| !l.is_empty()).map(str::to_string),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Server -> Client events, discriminated by their `type` field.
#[derive(Debug, Clone, PartialEq)]
pub enum WsEvent {
    /// Advisory status text (`connected`, `processing`, ...).
    Status {
        message: Option<String>,
        timestamp: Option<DateTime<Utc>>,
    },
    /// Advisory progress percentage. Out-of-range values are kept as sent.
    Progress {
        progress: Option<f64>,
        stage: Option<String>,
    },
    /// Terminal success.
    Result(OcrResult),
    /// Terminal failure reported by the service.
    Error { error: Option<String> },
    /// Any other or missing type, kept verbatim.
    Other { kind: String, raw: Value },
}

impl WsEvent {
    /// Parse one text frame.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Value>(text).map(Self::from_value)
    }

    pub fn from_value(value: Value) -> Self {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        match kind.as_str() {
            "status" => Self::Status {
                message: fields::text(&value, "message"),
                timestamp: value
                    .get("timestamp")
                    .and_then(Value::as_i64)
                    .and_then(DateTime::from_timestamp_millis),
            },
            "progress" => Self::Progress {
                progress: fields::float(&value, "progress"),
                stage: fields::text(&value, "status"),
            },
            "result" => Self::Result(OcrResult::from_value(&value)),
            "error" => Self::Error {
                error: fields::text(&value, "error"),
            },
            _ => Self::Other { kind, raw: value },
        }
    }

    /// The `type` tag as shown in the report.
    pub fn kind(&self) -> &str {
        match self {
            Self::Status { .. } => "status",
            Self::Progress { .. } => "progress",
            Self::Result(_) => "result",
            Self::Error { .. } => "error",
            Self::Other { kind, .. } => kind,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Result(_) | Self::Error { .. })
    }
}
