//! WebSocket OCR probe: one connection to `/ws`, one request, events until terminal.
//!
//! The session is an explicit state machine:
//!
//! ```text
//! Connecting ──open──▶ Open { terminal_received: false } ──result|error──▶ Open { terminal_received: true }
//!                                   │                                               │
//!                                   └──────── peer close / transport error ─────────┴──▶ Closed
//! ```
//!
//! Exactly one request is ever handed out, and nothing is dispatched once a
//! terminal event has been seen.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use futures::{sink::SinkExt, stream::StreamExt};
use logging::EventLogger;
use ocrprobe_core::{or_na, ClientMessage, ProbeOutcome, ProbeRequest, WsEvent};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

use crate::error::ProbeError;
use crate::render::render_ocr_result;
use crate::terminal_output::Reporter;
use crate::traits::{settle, Probe};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long to wait for the peer to answer our close frame.
const CLOSE_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Open { terminal_received: bool },
    Closed,
}

/// What the session made of one inbound text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Event(WsEvent),
    /// Not JSON; carries the parse error.
    Invalid(String),
    /// Arrived outside `Open { terminal_received: false }`.
    Ignored,
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Completed,
    Failed(String),
    PeerClosed,
    TransportError(String),
    Cancelled,
    TimedOut(Duration),
}

impl SessionEnd {
    fn from_terminal(event: &WsEvent) -> Self {
        match event {
            WsEvent::Error { error } => Self::Failed(or_na(error.as_deref())),
            _ => Self::Completed,
        }
    }

    pub fn into_outcome(self, probe: &str) -> ProbeOutcome {
        match self {
            Self::Completed => ProbeOutcome::success(probe),
            Self::Failed(error) => ProbeOutcome::service_error(probe, error),
            Self::PeerClosed => {
                ProbeOutcome::interrupted(probe, "connection closed before a result arrived")
            }
            Self::TransportError(e) => ProbeOutcome::connectivity(probe, e),
            Self::Cancelled => ProbeOutcome::interrupted(probe, "cancelled"),
            Self::TimedOut(after) => {
                ProbeOutcome::interrupted(probe, format!("timed out after {}s", after.as_secs_f64()))
            }
        }
    }
}

/// Client-side session bookkeeping, independent of the socket.
#[derive(Debug)]
pub struct WsSession {
    state: SessionState,
    request: Option<String>,
    requests_sent: usize,
}

impl WsSession {
    pub fn new(request: String) -> Self {
        Self {
            state: SessionState::Connecting,
            request: Some(request),
            requests_sent: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn requests_sent(&self) -> usize {
        self.requests_sent
    }

    pub fn terminal_received(&self) -> bool {
        matches!(self.state, SessionState::Open { terminal_received: true })
    }

    /// The connection is up. Returns the request to send, exactly once.
    pub fn open(&mut self) -> Option<String> {
        if self.state != SessionState::Connecting {
            return None;
        }
        self.transition(SessionState::Open { terminal_received: false });
        let request = self.request.take();
        if request.is_some() {
            self.requests_sent += 1;
        }
        request
    }

    pub fn receive(&mut self, text: &str) -> Dispatch {
        if self.state != (SessionState::Open { terminal_received: false }) {
            return Dispatch::Ignored;
        }
        match WsEvent::parse(text) {
            Ok(event) => {
                if event.is_terminal() {
                    self.transition(SessionState::Open { terminal_received: true });
                }
                Dispatch::Event(event)
            }
            Err(e) => Dispatch::Invalid(e.to_string()),
        }
    }

    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            self.transition(SessionState::Closed);
        }
    }

    fn transition(&mut self, to: SessionState) {
        EventLogger::transition(WebSocketOcrProbe::NAME, self.state, to);
        self.state = to;
    }
}

/// Print one event as `[type] ...`.
pub fn render_event(report: &mut Reporter<'_>, event: &WsEvent) -> io::Result<()> {
    match event {
        WsEvent::Status { message, .. } => report.tagged("status", &or_na(message.as_deref())),
        WsEvent::Progress { progress, .. } => {
            report.tagged("progress", &format!("Progress: {}%", progress.unwrap_or(0.0)))
        }
        WsEvent::Result(result) => {
            report.tagged("result", "Result received!")?;
            render_ocr_result(report, result)
        }
        WsEvent::Error { error } => {
            report.tagged("error", &format!("Error: {}", or_na(error.as_deref())))
        }
        WsEvent::Other { kind, raw } => report.tagged(kind, &raw.to_string()),
    }
}

/// What woke the event loop.
enum Wake {
    Frame(Option<Result<Message, tokio_tungstenite::tungstenite::Error>>),
    Cancelled,
    Deadline,
}

#[derive(Default)]
pub struct WebSocketOcrProbe {
    timeout: Option<Duration>,
}

impl WebSocketOcrProbe {
    pub const NAME: &'static str = "ws";

    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the wait for a terminal event. `None` waits until the peer closes.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn handshake(url: &str, token: Option<&str>) -> Result<Request, ProbeError> {
        let mut request = url
            .into_client_request()
            .map_err(|e| ProbeError::websocket(url, e))?;
        if let Some(token) = token {
            let value = crate::http::bearer_header(token)
                .map_err(|e| ProbeError::InvalidRequest(e.to_string()))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Ok(request)
    }

    async fn execute(
        &self,
        request: &ProbeRequest,
        report: &mut Reporter<'_>,
    ) -> Result<ProbeOutcome, ProbeError> {
        let url = request.ws_url();
        report.heading(&format!("Testing WebSocket API: {url}"))?;
        if let Some(language) = request.language() {
            report.line(&format!("Language: {language}"))?;
        }

        let image = request
            .image
            .as_ref()
            .ok_or_else(|| ProbeError::InvalidRequest("the WebSocket probe needs an image".into()))?;
        let payload = ClientMessage::ocr(image, request.language()).to_json()?;
        let mut session = WsSession::new(payload);

        let handshake = Self::handshake(&url, request.token())?;
        let (mut stream, response) = connect_async(handshake)
            .await
            .map_err(|e| ProbeError::websocket(&url, e))?;
        debug!(status = response.status().as_u16(), "WebSocket handshake complete");
        report.note_success("WebSocket connection established")?;

        let end = match session.open() {
            Some(payload) => {
                EventLogger::outbound(Self::NAME, &url, &payload);
                match stream.send(Message::Text(payload)).await {
                    Ok(()) => self.await_events(&mut stream, &mut session, report).await?,
                    Err(e) => {
                        report.note_error(&format!("WebSocket error: {e}"))?;
                        SessionEnd::TransportError(e.to_string())
                    }
                }
            }
            None => SessionEnd::TransportError("session was not connecting".into()),
        };

        session.close();
        info!(end = ?end, requests_sent = session.requests_sent(), "WebSocket session ended");
        report.line("WebSocket connection closed")?;
        Ok(end.into_outcome(Self::NAME))
    }

    /// Dispatch inbound frames until a terminal event, a close, an error,
    /// Ctrl-C, or the optional deadline.
    async fn await_events(
        &self,
        stream: &mut WsStream,
        session: &mut WsSession,
        report: &mut Reporter<'_>,
    ) -> Result<SessionEnd, ProbeError> {
        let timeout = self.timeout;
        let deadline = async move {
            match timeout {
                Some(after) => tokio::time::sleep(after).await,
                None => std::future::pending::<()>().await,
            }
        };
        let cancelled = async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(cancelled);

        loop {
            let wake = tokio::select! {
                frame = stream.next() => Wake::Frame(frame),
                _ = &mut cancelled => Wake::Cancelled,
                _ = &mut deadline => Wake::Deadline,
            };

            match wake {
                Wake::Cancelled => {
                    report.note_warn("Interrupted, closing the connection")?;
                    close_gracefully(stream).await;
                    return Ok(SessionEnd::Cancelled);
                }
                Wake::Deadline => {
                    let after = timeout.unwrap_or_default();
                    report.note_warn(&format!(
                        "No result within {}s, closing the connection",
                        after.as_secs_f64()
                    ))?;
                    close_gracefully(stream).await;
                    return Ok(SessionEnd::TimedOut(after));
                }
                Wake::Frame(None) => return Ok(SessionEnd::PeerClosed),
                Wake::Frame(Some(Err(e))) => {
                    warn!(error = %e, "WebSocket transport error");
                    report.note_error(&format!("WebSocket error: {e}"))?;
                    return Ok(SessionEnd::TransportError(e.to_string()));
                }
                Wake::Frame(Some(Ok(Message::Text(text)))) => {
                    EventLogger::inbound(Self::NAME, "text", &text);
                    match session.receive(&text) {
                        Dispatch::Event(event) => {
                            debug!(kind = event.kind(), terminal = event.is_terminal(), "Event received");
                            render_event(report, &event)?;
                            if event.is_terminal() {
                                close_gracefully(stream).await;
                                return Ok(SessionEnd::from_terminal(&event));
                            }
                        }
                        Dispatch::Invalid(error) => {
                            warn!(%error, "Ignoring non-JSON text frame");
                            report.tagged("invalid", &text)?;
                        }
                        Dispatch::Ignored => trace!("Frame after terminal event"),
                    }
                }
                Wake::Frame(Some(Ok(Message::Close(frame)))) => {
                    debug!(?frame, "Peer closed the connection");
                    return Ok(SessionEnd::PeerClosed);
                }
                Wake::Frame(Some(Ok(other))) => trace!(?other, "Ignoring non-text frame"),
            }
        }
    }
}

/// Send our close frame and wait briefly for the peer's answer.
async fn close_gracefully(stream: &mut WsStream) {
    if let Err(e) = stream.close(None).await {
        debug!(error = %e, "Close frame not sent");
        return;
    }
    let drain = async {
        while let Some(Ok(frame)) = stream.next().await {
            trace!(?frame, "Frame while closing");
        }
    };
    if tokio::time::timeout(CLOSE_GRACE, drain).await.is_err() {
        debug!("Peer did not complete the close handshake");
    }
}

#[async_trait]
impl Probe for WebSocketOcrProbe {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(
        &self,
        request: &ProbeRequest,
        report: &mut Reporter<'_>,
    ) -> io::Result<ProbeOutcome> {
        let result = self.execute(request, report).await;
        settle(Self::NAME, result, report, "WebSocket connection failed")
    }
}
