//! Mock CRM for the integration tests.
//!
//! Serves canned replies per path on a random local port and records every
//! request it receives, so tests can assert on auth headers, query strings
//! and request bodies.

#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use fitgate::crm::CrmClient;
use serde_json::Value;
use tokio::{net::TcpListener, sync::Mutex};

pub const API_KEY: &str = "secret";
pub const BASE_PATH: &str = "/api/public/";

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn json(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "application/json",
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn html(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8",
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// One request as the mock CRM saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Seen {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone)]
struct MockState {
    replies: Arc<HashMap<String, Reply>>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

pub struct MockCrm {
    pub base_url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockCrm {
    /// Starts the mock. Endpoints are given relative to the API base, e.g.
    /// `branch/list`.
    pub async fn start(replies: Vec<(&str, Reply)>) -> Self {
        let replies = replies
            .into_iter()
            .map(|(endpoint, reply)| (format!("{BASE_PATH}{endpoint}"), reply))
            .collect();
        let state = MockState {
            replies: Arc::new(replies),
            seen: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}{BASE_PATH}"),
            seen: state.seen,
        }
    }

    pub fn client(&self) -> CrmClient {
        CrmClient::new(&self.base_url, API_KEY).unwrap()
    }

    pub async fn requests(&self) -> Vec<Seen> {
        self.seen.lock().await.clone()
    }

    pub async fn last_request(&self) -> Seen {
        self.requests()
            .await
            .pop()
            .expect("mock CRM received no request")
    }
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    state.seen.lock().await.push(Seen {
        method,
        path: path.clone(),
        query: uri.query().map(str::to_string),
        headers,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    match state.replies.get(&path) {
        Some(reply) => {
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
            (
                reply.status,
                [(CONTENT_TYPE, reply.content_type)],
                reply.body.clone(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "no such mock route").into_response(),
    }
}

/// Address nothing listens on.
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}{BASE_PATH}")
}
