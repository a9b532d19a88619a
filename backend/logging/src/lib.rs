//! Structured logging components for ocrprobe.
//!
//! Handles log redaction, JSON output generation, file rotation, and the probe event transcript.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, ProbeEvent};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
