//! Mode selection and sequential probe execution.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use ocrprobe_core::{ImagePayload, PreconditionError, ProbeOutcome, ProbeRequest};
use ocrprobe_probes::{
    bearer_header, HealthProbe, HttpOcrProbe, Probe, Reporter, StatusProbe, WebSocketOcrProbe,
};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// OCR over HTTP multipart
    Http,
    /// OCR over WebSocket
    Ws,
    /// HTTP then WebSocket
    Both,
    /// GET /status
    Status,
    /// GET /health
    Health,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Ws => "ws",
            Self::Both => "both",
            Self::Status => "status",
            Self::Health => "health",
        }
    }

    pub fn needs_image(self) -> bool {
        matches!(self, Self::Http | Self::Ws | Self::Both)
    }

    /// Probes to run, in order.
    pub fn probes(self, ws_timeout: Option<Duration>) -> Vec<Box<dyn Probe>> {
        let ws = || Box::new(WebSocketOcrProbe::new().with_timeout(ws_timeout)) as Box<dyn Probe>;
        match self {
            Self::Http => vec![Box::new(HttpOcrProbe)],
            Self::Ws => vec![ws()],
            Self::Both => vec![Box::new(HttpOcrProbe), ws()],
            Self::Status => vec![Box::new(StatusProbe)],
            Self::Health => vec![Box::new(HealthProbe)],
        }
    }
}

/// Everything one invocation needs, after env and flags are merged.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub mode: Mode,
    pub host: String,
    pub port: u16,
    pub image: Option<PathBuf>,
    pub language: Option<String>,
    pub token: Option<String>,
    pub ws_timeout: Option<Duration>,
}

/// Validate inputs and load the image. Nothing here touches the network.
pub fn prepare(settings: &RunSettings) -> Result<ProbeRequest, PreconditionError> {
    if let Some(token) = settings.token.as_deref().filter(|t| !t.is_empty()) {
        bearer_header(token)?;
    }

    let mut request = ProbeRequest::new(settings.host.clone(), settings.port)
        .with_language(settings.language.clone())
        .with_token(settings.token.clone());

    if settings.mode.needs_image() {
        let path = settings.image.as_deref().ok_or_else(|| PreconditionError::MissingImage {
            mode: settings.mode.as_str().to_string(),
        })?;
        let image = ImagePayload::load(path)?;
        debug!(file = %image.file_name, bytes = image.bytes.len(), "Image loaded");
        request = request.with_image(image);
    }
    Ok(request)
}

/// Run each probe to completion, one after another. A failing probe never
/// stops the next one.
pub async fn run(
    request: &ProbeRequest,
    probes: &[Box<dyn Probe>],
    out: &mut (dyn Write + Send),
    color: bool,
) -> io::Result<Vec<ProbeOutcome>> {
    let mut report = Reporter::new(out, color);
    let mut outcomes = Vec::with_capacity(probes.len());

    for probe in probes {
        info!(probe = probe.name(), host = %request.host, port = request.port, "Running probe");
        let outcome = probe.run(request, &mut report).await?;
        info!(%outcome, "Probe finished");
        outcomes.push(outcome);
    }

    if outcomes.len() > 1 {
        report.heading("Summary:")?;
        for outcome in &outcomes {
            report.line(&format!("  {outcome}"))?;
        }
    }
    Ok(outcomes)
}
