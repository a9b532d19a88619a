//! In-process mock of the OCR service, built on axum.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Multipart, State,
    },
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use ocrprobe_core::{ImagePayload, ProbeOutcome, ProbeRequest};
use ocrprobe_probes::{Probe, Reporter};
use tokio::net::TcpListener;

/// One step of the scripted WebSocket conversation.
#[derive(Clone)]
pub enum Step {
    Send(String),
    Pause(Duration),
    /// Close from the server side and stop.
    Close,
    /// Drop the connection with no close frame.
    Drop,
}

#[derive(Debug, Default, Clone)]
pub struct UploadedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub ws_texts: Vec<String>,
    pub ws_client_closed: bool,
    pub fields: Vec<UploadedField>,
    pub auth_headers: Vec<Option<String>>,
    pub status_hits: usize,
}

pub struct MockService {
    status: (StatusCode, String),
    health: (StatusCode, String),
    ocr: (StatusCode, String),
    script: Vec<Step>,
    recorded: Mutex<Recorded>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            status: (StatusCode::OK, "{}".into()),
            health: (StatusCode::OK, "{}".into()),
            ocr: (StatusCode::OK, "{}".into()),
            script: Vec::new(),
            recorded: Mutex::new(Recorded::default()),
        }
    }

    pub fn status(mut self, code: u16, body: &str) -> Self {
        self.status = (StatusCode::from_u16(code).unwrap(), body.into());
        self
    }

    pub fn health(mut self, code: u16, body: &str) -> Self {
        self.health = (StatusCode::from_u16(code).unwrap(), body.into());
        self
    }

    pub fn ocr(mut self, code: u16, body: &str) -> Self {
        self.ocr = (StatusCode::from_u16(code).unwrap(), body.into());
        self
    }

    pub fn script(mut self, steps: Vec<Step>) -> Self {
        self.script = steps;
        self
    }

    pub fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }

    /// Serve on an ephemeral port.
    pub async fn start(self) -> (Arc<Self>, SocketAddr) {
        let mock = Arc::new(self);
        let app = Router::new()
            .route("/status", get(status_handler))
            .route("/health", get(health_handler))
            .route("/ocr", post(ocr_handler))
            .route("/ws", get(ws_handler))
            .with_state(Arc::clone(&mock));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (mock, addr)
    }

    fn record_auth(&self, headers: &HeaderMap) {
        let value = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.recorded().auth_headers.push(value);
    }
}

async fn status_handler(
    State(mock): State<Arc<MockService>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    mock.record_auth(&headers);
    mock.recorded().status_hits += 1;
    mock.status.clone()
}

async fn health_handler(State(mock): State<Arc<MockService>>) -> impl IntoResponse {
    mock.health.clone()
}

async fn ocr_handler(
    State(mock): State<Arc<MockService>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    mock.record_auth(&headers);
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        mock.recorded().fields.push(UploadedField { name, file_name, content_type, data });
    }
    mock.ocr.clone()
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(mock): State<Arc<MockService>>,
) -> impl IntoResponse {
    mock.record_auth(&headers);
    ws.on_upgrade(move |socket| run_script(socket, mock))
}

/// Wait for the client's request, play the script, then record until close.
async fn run_script(mut socket: WebSocket, mock: Arc<MockService>) {
    match socket.recv().await {
        Some(Ok(Message::Text(text))) => mock.recorded().ws_texts.push(text),
        _ => return,
    }

    for step in mock.script.clone() {
        match step {
            Step::Send(frame) => {
                if socket.send(Message::Text(frame)).await.is_err() {
                    return;
                }
            }
            Step::Pause(d) => tokio::time::sleep(d).await,
            Step::Close => {
                let _ = socket.send(Message::Close(None)).await;
                return;
            }
            Step::Drop => {
                drop(socket);
                return;
            }
        }
    }

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => mock.recorded().ws_texts.push(text),
            Message::Close(_) => mock.recorded().ws_client_closed = true,
            _ => {}
        }
    }
}

pub fn request_for(addr: SocketAddr) -> ProbeRequest {
    ProbeRequest::new(addr.ip().to_string(), addr.port())
}

pub fn image() -> ImagePayload {
    ImagePayload::new("sample.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
}

/// A port nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Run a probe against a plain in-memory report.
pub async fn run_probe(probe: &dyn Probe, request: &ProbeRequest) -> (ProbeOutcome, String) {
    let mut buf = Vec::new();
    let outcome = {
        let mut report = Reporter::plain(&mut buf);
        probe.run(request, &mut report).await.unwrap()
    };
    (outcome, String::from_utf8(buf).unwrap())
}

/// Poll until `check` holds, for state the server records asynchronously.
pub async fn eventually(mock: &MockService, check: impl Fn(&Recorded) -> bool) -> bool {
    for _ in 0..100 {
        if check(&mock.recorded()) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
