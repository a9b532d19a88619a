//! Rendering of decoded service payloads, shared by the HTTP and WebSocket probes.

use std::io;

use ocrprobe_core::{or_na, HealthInfo, OcrResult, StatusInfo};

use crate::terminal_output::Reporter;

/// Text, language, confidence and latency, then any located blocks.
pub fn render_ocr_result(report: &mut Reporter<'_>, result: &OcrResult) -> io::Result<()> {
    report.field("Text", &or_na(result.text.as_deref()))?;
    report.field("Language", &or_na(result.language.as_deref()))?;
    report.field("Confidence", &or_na(result.confidence))?;
    report.field(
        "Processing time",
        &or_na(result.processing_time_ms.map(|ms| format!("{ms}ms"))),
    )?;

    if !result.blocks.is_empty() {
        report.field("Blocks", &result.blocks.len().to_string())?;
        for (i, block) in result.blocks.iter().enumerate() {
            let text = or_na(block.text.as_deref());
            match block.bounding_box {
                Some(b) => report.line(&format!(
                    "    #{i}: {text} [{},{},{},{}]",
                    b.left, b.top, b.right, b.bottom
                ))?,
                None => report.line(&format!("    #{i}: {text}"))?,
            }
        }
    }
    Ok(())
}

pub fn render_status(report: &mut Reporter<'_>, info: &StatusInfo) -> io::Result<()> {
    report.line("Server status:")?;
    report.field("State", &or_na(info.status.as_deref()))?;
    report.field(
        "Uptime",
        &or_na(info.uptime_display().map(|s| format!("{s} seconds"))),
    )?;
    report.field("Request count", &or_na(info.request_count))?;
    report.field("Port", &or_na(info.port.as_deref()))?;
    report.field("OCR engine", &or_na(info.ocr_engine.as_deref()))
}

pub fn render_health(report: &mut Reporter<'_>, info: &HealthInfo) -> io::Result<()> {
    report.line("Server health:")?;
    report.field("State", &or_na(info.status.as_deref()))?;
    report.field("Server time", &or_na(info.timestamp.map(|t| t.to_rfc3339())))
}
