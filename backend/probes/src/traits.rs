use std::io;

use async_trait::async_trait;
use ocrprobe_core::{ProbeOutcome, ProbeRequest};
use tracing::warn;

use crate::error::ProbeError;
use crate::terminal_output::Reporter;

/// One self-contained exchange with the OCR service over a single transport.
///
/// Probes never fail the run: transport and protocol problems are written to
/// the report and folded into the returned [`ProbeOutcome`]. Only a failure to
/// write the report itself comes back as `Err`.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Short name used in summaries and logs ("status", "http", "ws").
    fn name(&self) -> &str;

    /// Run the probe to completion.
    async fn run(&self, request: &ProbeRequest, report: &mut Reporter<'_>)
        -> io::Result<ProbeOutcome>;
}

/// Fold a probe's internal result into an outcome at the probe boundary.
pub(crate) fn settle(
    probe: &str,
    result: Result<ProbeOutcome, ProbeError>,
    report: &mut Reporter<'_>,
    label: &str,
) -> io::Result<ProbeOutcome> {
    match result {
        Ok(outcome) => Ok(outcome),
        Err(ProbeError::Output(e)) => Err(e),
        Err(err) => {
            warn!(probe, error = %err, "Probe failed");
            report.note_error(&format!("{label}: {err}"))?;
            Ok(ProbeOutcome::connectivity(probe, err.to_string()))
        }
    }
}
