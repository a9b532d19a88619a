use std::fmt;

/// How a single probe ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The service answered with a usable result.
    Success,
    /// The service answered, but with an error (non-200, `error` event).
    ServiceError(String),
    /// The service could not be reached or the transport failed.
    Connectivity(String),
    /// The exchange ended early: peer closed, timeout, or Ctrl-C.
    Interrupted(String),
}

/// The reportable result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub probe: String,
    pub kind: OutcomeKind,
}

impl ProbeOutcome {
    pub fn success(probe: impl Into<String>) -> Self {
        Self { probe: probe.into(), kind: OutcomeKind::Success }
    }

    pub fn service_error(probe: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { probe: probe.into(), kind: OutcomeKind::ServiceError(detail.into()) }
    }

    pub fn connectivity(probe: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { probe: probe.into(), kind: OutcomeKind::Connectivity(detail.into()) }
    }

    pub fn interrupted(probe: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { probe: probe.into(), kind: OutcomeKind::Interrupted(detail.into()) }
    }

    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Success
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OutcomeKind::Success => write!(f, "{}: ok", self.probe),
            OutcomeKind::ServiceError(d) => write!(f, "{}: service error ({d})", self.probe),
            OutcomeKind::Connectivity(d) => write!(f, "{}: unreachable ({d})", self.probe),
            OutcomeKind::Interrupted(d) => write!(f, "{}: interrupted ({d})", self.probe),
        }
    }
}
