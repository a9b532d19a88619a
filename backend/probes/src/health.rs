//! Liveness probe: `GET /health`.

use std::io;

use async_trait::async_trait;
use ocrprobe_core::{HealthInfo, ProbeOutcome, ProbeRequest};

use crate::error::ProbeError;
use crate::http;
use crate::render::render_health;
use crate::terminal_output::Reporter;
use crate::traits::{settle, Probe};

pub struct HealthProbe;

impl HealthProbe {
    pub const NAME: &'static str = "health";

    async fn execute(
        &self,
        request: &ProbeRequest,
        report: &mut Reporter<'_>,
    ) -> Result<ProbeOutcome, ProbeError> {
        let url = request.http_url("/health");
        report.heading(&format!("Checking server health: {url}"))?;

        let client = http::client()?;
        let builder = http::authorize(client.get(&url), request.token());
        let reply = http::send(Self::NAME, builder, &url).await?;

        if !reply.is_ok() {
            let detail = reply.report_failure(report)?;
            return Ok(ProbeOutcome::service_error(Self::NAME, detail));
        }

        render_health(report, &HealthInfo::from_value(&reply.json()))?;
        Ok(ProbeOutcome::success(Self::NAME))
    }
}

#[async_trait]
impl Probe for HealthProbe {
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
