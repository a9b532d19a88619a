//! Probe Event Logger
//!
//! Every frame and response a probe exchanges with the service, written as a
//! structured `tracing` event under the `probe_events` target. With a log
//! directory configured this yields an NDJSON transcript of the session.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProbeEvent {
    /// A request leaving the client.
    Outbound { target: String, payload: String },
    /// A response body or WebSocket frame from the service.
    Inbound { kind: String, payload: String },
    /// The connection state changed.
    Transition { from: String, to: String },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub probe: String,
    pub timestamp: DateTime<Utc>,
    pub event: ProbeEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Logs a probe event with payloads redacted.
    pub fn log_event(probe: &str, mut event: ProbeEvent) {
        match &mut event {
            ProbeEvent::Outbound { payload, .. } | ProbeEvent::Inbound { payload, .. } => {
                *payload = redact_sensitive_data(payload);
            }
            ProbeEvent::Transition { .. } => {}
        }

        let entry = EventLogEntry {
            probe: probe.into(),
            timestamp: Utc::now(),
            event,
        };

        match serde_json::to_string(&entry) {
            Ok(json) => debug!(target: "probe_events", probe = %entry.probe, event = %json, "Probe event"),
            Err(e) => debug!(target: "probe_events", error = %e, "Unserializable probe event"),
        }
    }

    pub fn outbound(probe: &str, target: &str, payload: &str) {
        Self::log_event(
            probe,
            ProbeEvent::Outbound { target: target.into(), payload: payload.into() },
        );
    }

    pub fn inbound(probe: &str, kind: &str, payload: &str) {
        Self::log_event(
            probe,
            ProbeEvent::Inbound { kind: kind.into(), payload: payload.into() },
        );
    }

    pub fn transition(probe: &str, from: impl std::fmt::Debug, to: impl std::fmt::Debug) {
        Self::log_event(
            probe,
            ProbeEvent::Transition { from: format!("{from:?}"), to: format!("{to:?}") },
        );
    }
}
