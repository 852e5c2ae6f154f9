#![allow(dead_code)]

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tfidf_core::screens::CandidateFile;
use tfidf_core::{ApiClient, ClientConfig, Notice, UiEvent};
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Notify;
use tracing::subscriber::DefaultGuard;

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    /// Sent verbatim, so key order survives.
    pub body: String,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self::raw(&body.to_string())
    }

    pub fn raw(body: &str) -> Self {
        Self { status: StatusCode::OK, body: body.to_string() }
    }

    pub fn fail(status: u16) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: json!({ "detail": "mock failure" }).to_string(),
        }
    }
}

type JsonReply = (StatusCode, [(header::HeaderName, &'static str); 1], String);

#[derive(Debug, Default)]
struct Endpoint {
    reply: Mutex<Option<Reply>>,
    hits: AtomicUsize,
    bodies: Mutex<Vec<Value>>,
}

impl Endpoint {
    fn record(&self, body: Option<Value>) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        if let Some(body) = body {
            self.bodies.lock().push(body);
        }
    }

    fn reply(&self, fallback: Value) -> JsonReply {
        let reply = self.reply.lock().clone().unwrap_or_else(|| Reply::ok(fallback));
        (reply.status, [(header::CONTENT_TYPE, "application/json")], reply.body)
    }
}

#[derive(Debug, Default)]
struct Inner {
    index: Endpoint,
    view: Endpoint,
    search: Endpoint,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl Inner {
    async fn wait_for_release(&self) {
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

/// In-process stand-in for the indexing/search service.
pub struct MockService {
    pub base_url: String,
    inner: Arc<Inner>,
}

impl MockService {
    pub async fn start() -> Self {
        let inner = Arc::new(Inner::default());
        let app = Router::new()
            .route("/", get(|| async { Json(json!({ "message": "ok" })) }))
            .route("/index/", post(index_handler))
            .route("/view-index/", get(view_handler))
            .route("/search/", post(search_handler))
            .with_state(inner.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { base_url: format!("http://{addr}"), inner }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(ClientConfig::new(&self.base_url).unwrap()).unwrap()
    }

    pub fn set_index(&self, reply: Reply) {
        *self.inner.index.reply.lock() = Some(reply);
    }

    pub fn set_view(&self, reply: Reply) {
        *self.inner.view.reply.lock() = Some(reply);
    }

    pub fn set_search(&self, reply: Reply) {
        *self.inner.search.reply.lock() = Some(reply);
    }

    /// Holds every later request until `notify_one` is called on the result.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.inner.gate.lock() = Some(gate.clone());
        gate
    }

    pub fn index_hits(&self) -> usize {
        self.inner.index.hits.load(Ordering::SeqCst)
    }

    pub fn view_hits(&self) -> usize {
        self.inner.view.hits.load(Ordering::SeqCst)
    }

    pub fn search_hits(&self) -> usize {
        self.inner.search.hits.load(Ordering::SeqCst)
    }

    pub fn index_bodies(&self) -> Vec<Value> {
        self.inner.index.bodies.lock().clone()
    }

    pub fn search_bodies(&self) -> Vec<Value> {
        self.inner.search.bodies.lock().clone()
    }
}

async fn index_handler(State(inner): State<Arc<Inner>>, Json(body): Json<Value>) -> JsonReply {
    inner.index.record(Some(body));
    inner.wait_for_release().await;
    inner.index.reply(json!({ "index": {}, "tfidf": {} }))
}

async fn view_handler(State(inner): State<Arc<Inner>>) -> JsonReply {
    inner.view.record(None);
    inner.wait_for_release().await;
    inner.view.reply(sample_snapshot())
}

async fn search_handler(State(inner): State<Arc<Inner>>, Json(body): Json<Value>) -> JsonReply {
    inner.search.record(Some(body));
    inner.wait_for_release().await;
    inner.search.reply(json!({ "results": [] }))
}

pub fn sample_snapshot() -> Value {
    json!({
        "documents": [0, 1],
        "tf": {"0": {"cat": 2}, "1": {}},
        "idf": {"cat": 0.301},
        "tfidf": {"cat": [0.602, 0]}
    })
}

/// A base URL nothing listens on.
pub async fn closed_port_client() -> ApiClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    ApiClient::new(ClientConfig::new(&format!("http://{addr}")).unwrap()).unwrap()
}

pub fn drain(rx: &mut UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn notices(events: &[UiEvent]) -> Vec<Notice> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::Notice(n) => Some(n.clone()),
            _ => None,
        })
        .collect()
}

pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> CandidateFile {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    CandidateFile::from_path(path)
}

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes this thread's tracing output into a buffer while the guard lives.
pub fn capture_logs() -> (DefaultGuard, LogBuffer) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    (tracing::subscriber::set_default(subscriber), buffer)
}
