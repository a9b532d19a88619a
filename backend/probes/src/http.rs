//! Request plumbing shared by the HTTP probes.

use logging::EventLogger;
use ocrprobe_core::{fields, PreconditionError};
use reqwest::header::HeaderValue;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ProbeError;
use crate::terminal_output::Reporter;

const USER_AGENT: &str = concat!("ocrprobe/", env!("CARGO_PKG_VERSION"));

/// A fully read HTTP response.
#[derive(Debug)]
pub(crate) struct HttpReply {
    pub status: StatusCode,
    pub body: String,
}

impl HttpReply {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Decode the body, falling back to `null` so every field reads as absent.
    pub fn json(&self) -> Value {
        match serde_json::from_str(&self.body) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Response body is not JSON; fields will show as N/A");
                Value::Null
            }
        }
    }

    /// `error` field of a JSON error body, if there is one.
    pub fn error_message(&self) -> Option<String> {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|v| fields::text(&v, "error"))
    }

    /// Report a non-200 reply: status code and the raw body, verbatim.
    pub fn report_failure(&self, report: &mut Reporter<'_>) -> std::io::Result<String> {
        if let Some(message) = self.error_message() {
            warn!(status = self.status.as_u16(), error = %message, "Service returned an error");
        }
        let detail = format!("HTTP {}", self.status.as_u16());
        report.note_error(&format!("{} - {}", self.status.as_u16(), self.body))?;
        Ok(detail)
    }
}

/// Build the client used for one probe. Timeouts stay at reqwest's defaults.
pub(crate) fn client() -> Result<Client, ProbeError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(ProbeError::Client)
}

/// `Bearer <token>` as a header value, checked before any request is built.
pub fn bearer_header(token: &str) -> Result<HeaderValue, PreconditionError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| PreconditionError::InvalidToken { reason: e.to_string() })?;
    value.set_sensitive(true);
    Ok(value)
}

pub(crate) fn authorize(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

/// Send one request and read the whole body. No retries.
pub(crate) async fn send(
    probe: &str,
    builder: RequestBuilder,
    url: &str,
) -> Result<HttpReply, ProbeError> {
    debug!(probe, url, "Sending request");
    let response = builder.send().await.map_err(|e| ProbeError::http(url, e))?;
    let status = response.status();
    let body = response.text().await.map_err(|e| ProbeError::http(url, e))?;

    debug!(probe, status = status.as_u16(), bytes = body.len(), "Received response");
    EventLogger::inbound(probe, &format!("http {}", status.as_u16()), &body);

    Ok(HttpReply { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16, body: &str) -> HttpReply {
        HttpReply {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn bearer_header_rejects_control_characters() {
        assert_eq!(bearer_header("s3cret").unwrap(), "Bearer s3cret");
        assert!(bearer_header("s3cret").unwrap().is_sensitive());

        let err = bearer_header("a\nb").unwrap_err();
        assert!(matches!(err, PreconditionError::InvalidToken { .. }));
    }

    #[test]
    fn only_200_is_ok() {
        assert!(reply(200, "{}").is_ok());
        assert!(!reply(201, "{}").is_ok());
        assert!(!reply(500, "boom").is_ok());
    }

    #[test]
    fn invalid_json_reads_as_null() {
        assert_eq!(reply(200, "<html>").json(), Value::Null);
    }

    #[test]
    fn error_message_from_json_body() {
        let r = reply(401, r#"{"success":false,"error":"Unauthorized"}"#);
        assert_eq!(r.error_message().as_deref(), Some("Unauthorized"));
        assert_eq!(reply(500, "boom").error_message(), None);
    }

    #[test]
    fn failure_report_keeps_body_verbatim() {
        let mut buf = Vec::new();
        let detail = {
            let mut report = Reporter::plain(&mut buf);
            reply(500, "boom").report_failure(&mut report).unwrap()
        };
        assert_eq!(detail, "HTTP 500");
        assert_eq!(String::from_utf8(buf).unwrap(), "ERROR: 500 - boom\n");
    }
}
