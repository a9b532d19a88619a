//! HTTP OCR probe: one multipart `POST /ocr`, synchronous and single-shot.

use std::io;

use async_trait::async_trait;
use logging::EventLogger;
use ocrprobe_core::{OcrResult, ProbeOutcome, ProbeRequest, IMAGE_MIME};
use reqwest::multipart::{Form, Part};
use tracing::info;

use crate::error::ProbeError;
use crate::http;
use crate::render::render_ocr_result;
use crate::terminal_output::Reporter;
use crate::traits::{settle, Probe};

pub struct HttpOcrProbe;

impl HttpOcrProbe {
    pub const NAME: &'static str = "http";

    /// `image` part with the raw bytes, `language` part only when a hint is set.
    fn form(request: &ProbeRequest, url: &str) -> Result<Form, ProbeError> {
        let image = request
            .image
            .as_ref()
            .ok_or_else(|| ProbeError::InvalidRequest("the HTTP probe needs an image".into()))?;

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(IMAGE_MIME)
            .map_err(|e| ProbeError::http(url, e))?;

        let mut form = Form::new().part("image", part);
        if let Some(language) = request.language() {
            form = form.text("language", language.to_string());
        }
        Ok(form)
    }

    async fn execute(
        &self,
        request: &ProbeRequest,
        report: &mut Reporter<'_>,
    ) -> Result<ProbeOutcome, ProbeError> {
        let url = request.http_url("/ocr");
        report.heading(&format!("Testing HTTP API: {url}"))?;
        if let Some(language) = request.language() {
            report.line(&format!("Language: {language}"))?;
        }

        let form = Self::form(request, &url)?;
        let client = http::client()?;
        let builder = http::authorize(client.post(&url), request.token()).multipart(form);

        let size = request.image.as_ref().map_or(0, |i| i.bytes.len());
        EventLogger::outbound(
            Self::NAME,
            &url,
            &format!("multipart image ({size} bytes), language={:?}", request.language()),
        );
        let reply = http::send(Self::NAME, builder, &url).await?;

        report.line(&format!("Status code: {}", reply.status.as_u16()))?;
        if !reply.is_ok() {
            let detail = reply.report_failure(report)?;
            return Ok(ProbeOutcome::service_error(Self::NAME, detail));
        }

        let result = OcrResult::from_value(&reply.json());
        info!(
            success = ?result.success,
            confidence = ?result.confidence,
            processing_time_ms = ?result.processing_time_ms,
            "OCR result received over HTTP"
        );
        report.note_success("Recognized text:")?;
        render_ocr_result(report, &result)?;
        Ok(ProbeOutcome::success(Self::NAME))
    }
}

#[async_trait]
impl Probe for HttpOcrProbe {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(
        &self,
        request: &ProbeRequest,
        report: &mut Reporter<'_>,
    ) -> io::Result<ProbeOutcome> {
        let result = self.execute(request, report).await;
        settle(Self::NAME, result, report, "HTTP request failed")
    }
}
