//! Probes that exercise a remote OCR service.
//!
//! Each probe owns one connection, runs one exchange, writes its findings to a
//! [`Reporter`], and returns a [`ProbeOutcome`](ocrprobe_core::ProbeOutcome).

pub mod error;
pub mod health;
mod http;
pub mod http_ocr;
pub mod render;
pub mod status;
pub mod terminal_output;
pub mod traits;
pub mod ws_ocr;

pub use error::ProbeError;
pub use http::bearer_header;
pub use health::HealthProbe;
pub use http_ocr::HttpOcrProbe;
pub use status::StatusProbe;
pub use terminal_output::Reporter;
pub use traits::Probe;
pub use ws_ocr::{SessionEnd, SessionState, WebSocketOcrProbe, WsSession};
