use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::PreconditionError;
use crate::fields;

/// MIME type the service expects for uploaded images.
pub const IMAGE_MIME: &str = "image/jpeg";

/// Parameters shared by every probe of one invocation.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub host: String,
    pub port: u16,
    pub image: Option<ImagePayload>,
    pub language: Option<String>,
    pub token: Option<String>,
}

impl ProbeRequest {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            image: None,
            language: None,
            token: None,
        }
    }

    pub fn with_image(mut self, image: ImagePayload) -> Self {
        self.image = Some(image);
        self
    }

    /// Empty hints are dropped so no `language` field is sent.
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.is_empty());
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// `http://{host}:{port}{path}`
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}:{}{}", self.host, self.port, path)
    }

    /// `ws://{host}:{port}/ws`
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}/ws", self.host, self.port)
    }
}

/// Image bytes read up front, before any network activity.
#[derive(Clone)]
pub struct ImagePayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read the whole file and release the handle.
    pub fn load(path: &Path) -> Result<Self, PreconditionError> {
        if !path.exists() {
            return Err(PreconditionError::ImageNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).map_err(|source| PreconditionError::ImageUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.jpg".to_string());
        Ok(Self::new(file_name, bytes))
    }

    /// `data:image/jpeg;base64,<data>` as embedded in WebSocket requests.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", IMAGE_MIME, STANDARD.encode(&self.bytes))
    }
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A recognition outcome, whichever transport produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrResult {
    pub success: Option<bool>,
    pub text: Option<String>,
    pub language: Option<String>,
    pub confidence: Option<f64>,
    /// As sent; fractional or negative values are shown unchanged.
    pub processing_time_ms: Option<f64>,
    pub blocks: Vec<TextBlock>,
}

impl OcrResult {
    pub fn from_value(body: &Value) -> Self {
        let blocks = body
            .get("blocks")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|b| serde_json::from_value::<TextBlock>(b.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            success: fields::boolean(body, "success"),
            text: fields::text(body, "text"),
            language: fields::text(body, "language"),
            confidence: fields::float(body, "confidence"),
            processing_time_ms: fields::float(body, "processingTimeMs"),
            blocks,
        }
    }
}

/// A recognized block of text, optionally located on the image.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextBlock {
    pub text: Option<String>,
    pub bounding_box: Option<BoundingBox>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BoundingBox {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

/// Snapshot returned by `GET /status`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusInfo {
    pub status: Option<String>,
    pub uptime_ms: Option<f64>,
    pub request_count: Option<f64>,
    pub port: Option<String>,
    pub ocr_engine: Option<String>,
}

impl StatusInfo {
    pub fn from_value(body: &Value) -> Self {
        Self {
            status: fields::text(body, "status"),
            uptime_ms: fields::float(body, "uptime"),
            request_count: fields::float(body, "requestCount"),
            port: fields::text(body, "port"),
            ocr_engine: fields::text(body, "ocrEngine"),
        }
    }

    /// Uptime in seconds, rounded to one decimal for display.
    pub fn uptime_display(&self) -> Option<String> {
        self.uptime_ms.map(|ms| format!("{:.1}", ms / 1000.0))
    }
}

/// Snapshot returned by `GET /health`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthInfo {
    pub status: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl HealthInfo {
    pub fn from_value(body: &Value) -> Self {
        Self {
            status: fields::text(body, "status"),
            timestamp: body
                .get("timestamp")
                .and_then(Value::as_i64)
                .and_then(DateTime::from_timestamp_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn urls_follow_host_and_port() {
        let req = ProbeRequest::new("10.0.0.2", 9000);
        assert_eq!(req.http_url("/status"), "http://10.0.0.2:9000/status");
        assert_eq!(req.ws_url(), "ws://10.0.0.2:9000/ws");
    }

    #[test]
    fn empty_language_and_token_are_dropped() {
        let req = ProbeRequest::new("h", 1)
            .with_language(Some(String::new()))
            .with_token(Some(String::new()));
        assert_eq!(req.language(), None);
        assert_eq!(req.token(), None);

        let req = req.with_language(Some("eng".into()));
        assert_eq!(req.language(), Some("eng"));
    }

    #[test]
    fn data_uri_is_base64_jpeg() {
        let image = ImagePayload::new("a.jpg", b"hello".to_vec());
        assert_eq!(image.data_uri(), "data:image/jpeg;base64,aGVsbG8=");
    }

    #[test]
    fn load_rejects_missing_file() {
        let path = std::env::temp_dir().join("ocrprobe-core-does-not-exist.jpg");
        let err = ImagePayload::load(&path).unwrap_err();
        assert!(matches!(err, PreconditionError::ImageNotFound(_)));
    }

    #[test]
    fn load_reads_bytes_and_name() {
        let path = std::env::temp_dir().join(format!("ocrprobe-core-{}.jpg", std::process::id()));
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();
        let image = ImagePayload::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(image.bytes, vec![0xFF, 0xD8, 0xFF]);
        assert!(image.file_name.starts_with("ocrprobe-core-"));
    }

    #[test]
    fn ocr_result_decodes_full_body() {
        let body = json!({
            "success": true,
            "text": "HELLO",
            "language": "eng",
            "confidence": 0.97,
            "processingTimeMs": 120,
            "blocks": [
                { "text": "HELLO", "boundingBox": { "left": 1, "top": 2, "right": 30, "bottom": 12 } },
                { "text": "no box" },
                "garbage"
            ]
        });
        let result = OcrResult::from_value(&body);
        assert_eq!(result.text.as_deref(), Some("HELLO"));
        assert_eq!(result.confidence, Some(0.97));
        assert_eq!(result.processing_time_ms, Some(120.0));
        assert_eq!(result.blocks.len(), 2);
        assert_eq!(
            result.blocks[0].bounding_box,
            Some(BoundingBox { left: 1, top: 2, right: 30, bottom: 12 })
        );
        assert_eq!(result.blocks[1].bounding_box, None);
    }

    #[test]
    fn ocr_result_tolerates_missing_fields() {
        let result = OcrResult::from_value(&json!({ "text": "x" }));
        assert_eq!(result.text.as_deref(), Some("x"));
        assert_eq!(result.language, None);
        assert_eq!(result.confidence, None);
        assert!(result.blocks.is_empty());
    }

    #[test]
    fn numbers_are_kept_as_sent() {
        let result = OcrResult::from_value(&json!({ "processingTimeMs": 120.7 }));
        assert_eq!(result.processing_time_ms, Some(120.7));

        let info = StatusInfo::from_value(&json!({ "requestCount": -3 }));
        assert_eq!(info.request_count, Some(-3.0));
    }

    #[test]
    fn status_uptime_is_seconds_with_one_decimal() {
        let info = StatusInfo::from_value(&json!({ "uptime": 12340 }));
        assert_eq!(info.uptime_display().as_deref(), Some("12.3"));

        let info = StatusInfo::from_value(&json!({ "uptime": 999 }));
        assert_eq!(info.uptime_display().as_deref(), Some("1.0"));

        let info = StatusInfo::from_value(&json!({}));
        assert_eq!(info.uptime_display(), None);
    }

    #[test]
    fn health_timestamp_is_epoch_millis() {
        let info = HealthInfo::from_value(&json!({ "status": "healthy", "timestamp": 0 }));
        assert_eq!(info.status.as_deref(), Some("healthy"));
        assert_eq!(info.timestamp.map(|t| t.timestamp()), Some(0));
    }
}
