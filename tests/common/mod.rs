//! Common test utilities
//!
//! Notifier test doubles, a fake chat webhook server, and helpers for driving the
//! router in-process.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    routing,
    Json, Router,
};
use kube_guard::config::{ConfigSnapshot, DispatchMode, SharedSnapshot};
use kube_guard::notifier::{AlertPayload, DispatchError, Notifier, WebhookTarget};
use kube_guard::server::create_router;
use kube_guard::AlertService;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests (matches main application)
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Records every payload it is asked to send
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(WebhookTarget, AlertPayload)>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, payload)| payload.text.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, target: &WebhookTarget, payload: &AlertPayload) -> Result<(), DispatchError> {
        self.sent
            .lock()
            .unwrap()
            .push((target.clone(), payload.clone()));
        Ok(())
    }
}

/// Fails every send, deterministically
#[derive(Debug, Default)]
pub struct FailingNotifier {
    pub attempts: Mutex<usize>,
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _target: &WebhookTarget, _payload: &AlertPayload) -> Result<(), DispatchError> {
        *self.attempts.lock().unwrap() += 1;
        Err(DispatchError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

/// Panics inside the pipeline, to exercise the 500 path
#[derive(Debug)]
pub struct PanickingNotifier;

#[async_trait]
impl Notifier for PanickingNotifier {
    async fn send(&self, _target: &WebhookTarget, _payload: &AlertPayload) -> Result<(), DispatchError> {
        panic!("notifier exploded");
    }
}

/// Default snapshot with a webhook URL set so dispatch is attempted
pub fn enabled_snapshot() -> ConfigSnapshot {
    let mut snapshot = ConfigSnapshot::default();
    snapshot.mattermost.webhook_url = "http://chat.invalid/hooks/test".to_string();
    snapshot
}

pub fn service(
    snapshot: ConfigSnapshot,
    notifier: Arc<dyn Notifier>,
    mode: DispatchMode,
) -> Arc<AlertService> {
    Arc::new(AlertService::new(SharedSnapshot::new(snapshot), notifier, mode))
}

pub fn app(snapshot: ConfigSnapshot, notifier: Arc<dyn Notifier>, mode: DispatchMode) -> Router {
    create_router(service(snapshot, notifier, mode))
}

/// AdmissionReview for a pod sub-resource request
pub fn review(uid: &str, kind: &str, namespace: &str, pod: &str, user: &str) -> Value {
    json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": uid,
            "kind": {"group": "", "version": "v1", "kind": kind},
            "resource": {"group": "", "version": "v1", "resource": "pods"},
            "namespace": namespace,
            "name": pod,
            "operation": "CONNECT",
            "userInfo": {"username": user, "groups": ["system:authenticated"]}
        }
    })
}

/// POST a raw body and return status plus decoded JSON body
pub async fn post(app: &Router, path: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, path: &str, body: &Value) -> (StatusCode, Value) {
    post(app, path, body.to_string()).await
}

pub async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    send(app, request).await
}

/// GET and return the body as text
pub async fn get_text(app: &Router, path: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    let (status, bytes) = send_raw(app, request).await;
    (status, String::from_utf8(bytes).unwrap())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(app, request).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

/// Poll until `condition` holds or two seconds pass
pub async fn wait_until(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// In-memory chat webhook receiver
#[derive(Clone)]
struct ChatState {
    received: Arc<Mutex<Vec<Value>>>,
    status: StatusCode,
    delay: Duration,
}

/// A running fake chat server
pub struct ChatServer {
    pub url: String,
    pub received: Arc<Mutex<Vec<Value>>>,
}

impl ChatServer {
    pub fn payloads(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

/// Start a chat webhook on 127.0.0.1 that answers `status` after `delay`
pub async fn spawn_chat_server(status: StatusCode, delay: Duration) -> ChatServer {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = ChatState {
        received: Arc::clone(&received),
        status,
        delay,
    };

    let app = Router::new()
        .route("/hooks/test", routing::post(chat_handler))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ChatServer {
        url: format!("http://{addr}/hooks/test"),
        received,
    }
}

async fn chat_handler(State(state): State<ChatState>, Json(payload): Json<Value>) -> StatusCode {
    state.received.lock().unwrap().push(payload);
    tokio::time::sleep(state.delay).await;
    state.status
}
