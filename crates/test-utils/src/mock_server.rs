//! Local HTTP server that stands in for the open-data API.
//!
//! Each path answers with a configured status, body and optional delay.
//! Unknown paths answer 404. Every request is recorded with its raw query
//! string so tests can check escaping and which endpoints were hit.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request the server received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
}

#[derive(Debug, Clone)]
struct Route {
    status: u16,
    body: String,
    delay: Duration,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Running mock server. Stops when dropped.
pub struct MockOpenDataServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockOpenDataServer {
    /// Bind to an ephemeral localhost port and start serving.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new().fallback(answer).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Answer `path` with `status` and `body`.
    pub fn respond(&self, path: &str, status: u16, body: &str) {
        self.respond_with_delay(path, status, body, Duration::ZERO);
    }

    /// Answer `path` after waiting `delay`.
    pub fn respond_with_delay(&self, path: &str, status: u16, body: &str, delay: Duration) {
        let route = Route {
            status,
            body: body.to_string(),
            delay,
        };
        self.state
            .routes
            .lock()
            .expect("routes lock")
            .insert(path.to_string(), route);
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    /// Number of requests received for `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

impl Drop for MockOpenDataServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn answer(State(state): State<Arc<MockState>>, uri: Uri) -> Response {
    state
        .requests
        .lock()
        .expect("requests lock")
        .push(RecordedRequest {
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
        });

    let route = state
        .routes
        .lock()
        .expect("routes lock")
        .get(uri.path())
        .cloned();

    let Some(route) = route else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if !route.delay.is_zero() {
        tokio::time::sleep(route.delay).await;
    }

    let status = StatusCode::from_u16(route.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, route.body).into_response()
}

/// A URL on localhost where nothing is listening.
pub async fn closed_port_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{}{}", addr, path)
}
