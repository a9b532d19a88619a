//! Terminal output: the operator-facing probe report.
//!
//! Everything a probe has to say goes through a [`Reporter`] so the same code
//! prints to stdout in the binary and into a buffer under test.

use std::io::{self, Write};

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

// ---------------------------------------------------------------------------
// Reporter
// ---------------------------------------------------------------------------

/// Line-oriented writer for probe output, flushed after every line.
pub struct Reporter<'a> {
    out: &'a mut (dyn Write + Send),
    color: bool,
}

impl<'a> Reporter<'a> {
    pub fn new(out: &'a mut (dyn Write + Send), color: bool) -> Self {
        Self { out, color }
    }

    /// No ANSI codes; used for tests and piped output.
    pub fn plain(out: &'a mut (dyn Write + Send)) -> Self {
        Self::new(out, false)
    }

    pub fn line(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.out, "{msg}")?;
        self.out.flush()
    }

    /// Blank line, then a bold title.
    pub fn heading(&mut self, msg: &str) -> io::Result<()> {
        if self.color {
            self.line(&format!("\n{BOLD}{msg}{RESET}"))
        } else {
            self.line(&format!("\n{msg}"))
        }
    }

    /// Indented `label: value` line.
    pub fn field(&mut self, label: &str, value: &str) -> io::Result<()> {
        if self.color {
            self.line(&format!("  {DIM}{label}:{RESET} {value}"))
        } else {
            self.line(&format!("  {label}: {value}"))
        }
    }

    /// `[tag] msg` line used for WebSocket events.
    pub fn tagged(&mut self, tag: &str, msg: &str) -> io::Result<()> {
        if self.color {
            self.line(&format!("{CYAN}[{tag}]{RESET} {msg}"))
        } else {
            self.line(&format!("[{tag}] {msg}"))
        }
    }

    pub fn note_success(&mut self, msg: &str) -> io::Result<()> {
        if self.color {
            self.line(&format!("{GREEN}{BOLD}✓{RESET} {msg}"))
        } else {
            self.line(&format!("OK: {msg}"))
        }
    }

    pub fn note_warn(&mut self, msg: &str) -> io::Result<()> {
        if self.color {
            self.line(&format!("{YELLOW}{BOLD}⚠{RESET} {msg}"))
        } else {
            self.line(&format!("WARN: {msg}"))
        }
    }

    /// Errors go to the report too, not stderr, so they stay in order with the events.
    pub fn note_error(&mut self, msg: &str) -> io::Result<()> {
        if self.color {
            self.line(&format!("{RED}{BOLD}✗{RESET} {msg}"))
        } else {
            self.line(&format!("ERROR: {msg}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_reporter_has_no_escapes() {
        let mut buf = Vec::new();
        let mut report = Reporter::plain(&mut buf);
        report.heading("Title").unwrap();
        report.field("Text", "HELLO").unwrap();
        report.tagged("status", "queued").unwrap();
        report.note_error("boom").unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "\nTitle\n  Text: HELLO\n[status] queued\nERROR: boom\n");
    }

    #[test]
    fn colored_reporter_wraps_the_tag() {
        let mut buf = Vec::new();
        let mut report = Reporter::new(&mut buf, true);
        report.tagged("progress", "Progress: 50%").unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, format!("{CYAN}[progress]{RESET} Progress: 50%\n"));
    }
}
