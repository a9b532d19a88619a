//! Status probe: `GET /status`.

use std::io;

use async_trait::async_trait;
use ocrprobe_core::{ProbeOutcome, ProbeRequest, StatusInfo};
use tracing::info;

use crate::error::ProbeError;
use crate::http;
use crate::render::render_status;
use crate::terminal_output::Reporter;
use crate::traits::{settle, Probe};

pub struct StatusProbe;

impl StatusProbe {
    pub const NAME: &'static str = "status";

    async fn execute(
        &self,
        request: &ProbeRequest,
        report: &mut Reporter<'_>,
    ) -> Result<ProbeOutcome, ProbeError> {
        let url = request.http_url("/status");
        report.heading(&format!("Checking server status: {url}"))?;

        let client = http::client()?;
        let builder = http::authorize(client.get(&url), request.token());
        let reply = http::send(Self::NAME, builder, &url).await?;

        if !reply.is_ok() {
            let detail = reply.report_failure(report)?;
            return Ok(ProbeOutcome::service_error(Self::NAME, detail));
        }

        let info = StatusInfo::from_value(&reply.json());
        info!(status = ?info.status, "Status received");
        render_status(report, &info)?;
        Ok(ProbeOutcome::success(Self::NAME))
    }
}

#[async_trait]
impl Probe for StatusProbe {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(
        &self,
        request: &ProbeRequest,
        report: &mut Reporter<'_>,
    ) -> io::Result<ProbeOutcome> {
        let result = self.execute(request, report).await;
        settle(Self::NAME, result, report, "Could not connect to the server")
    }
}
