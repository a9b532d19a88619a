//! Log Redaction Layer
//!
//! Scrubs bearer tokens and inline base64 image payloads from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());
static DATA_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(data:[a-z]+/[a-zA-Z0-9.+\-]+;base64,)[A-Za-z0-9+/]+=*").unwrap());

/// Redacts sensitive or oversized patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = BEARER_RE.replace_all(input, "Bearer [REDACTED_TOKEN]");

    // Images can be megabytes of base64; keep the MIME prefix only
    DATA_URI_RE
        .replace_all(&redacted, "${1}[REDACTED_IMAGE]")
        .into_owned()
}
