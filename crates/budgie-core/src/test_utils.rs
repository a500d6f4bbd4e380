//! Test utilities for budgie-core
//!
//! This module provides a mock model server that answers both Gemini
//! `generateContent` and OpenAI-style `/v1/chat/completions` with a
//! configurable reply, and records what it was sent.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::ai::MockBackend;
use crate::models::BudgetAdvice;

/// What the mock answers to a generation request
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A normal response whose text is the advice as JSON
    Advice(BudgetAdvice),
    /// A normal response whose text is this string
    Text(String),
    /// An HTTP error with this status and body
    Status(u16, String),
    /// HTTP 200 with an empty body
    EmptyBody,
    /// No usable text: Gemini gets no candidates (blocked by safety
    /// filters), chat completions get a refusal with `content: null`
    NoCandidates,
}

/// One request the mock received
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Path segment after `/v1beta/models/`, e.g. `gemini-3-flash-preview:generateContent`,
    /// or `chat/completions`
    pub call: String,
    /// `x-goog-api-key`, or the bearer token for chat completions
    pub api_key: Option<String>,
    pub body: Value,
}

struct MockState {
    reply: MockReply,
    delay: Option<Duration>,
    requests: AtomicUsize,
    last: Mutex<Option<CapturedRequest>>,
}

/// Mock model server for testing
pub struct MockModelServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockModelServer {
    /// Start the mock server answering with `MockBackend::sample_advice()`
    pub async fn start() -> Self {
        Self::start_with(MockReply::Advice(MockBackend::sample_advice())).await
    }

    /// Start the mock server with a specific reply
    pub async fn start_with(reply: MockReply) -> Self {
        Self::spawn(reply, None).await
    }

    /// Start the mock server with a reply that arrives after `delay`
    pub async fn start_with_delay(reply: MockReply, delay: Duration) -> Self {
        Self::spawn(reply, Some(delay)).await
    }

    async fn spawn(reply: MockReply, delay: Option<Duration>) -> Self {
        let state = Arc::new(MockState {
            reply,
            delay,
            requests: AtomicUsize::new(0),
            last: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v1beta/models/:call", get(handle_model).post(handle_generate))
            .route("/v1/models", get(handle_list_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of generation requests received
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// The most recent generation request
    pub fn last_request(&self) -> Option<CapturedRequest> {
        self.state.last.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockModelServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Model metadata endpoint (health check)
async fn handle_model(Path(call): Path<String>) -> Json<Value> {
    Json(json!({
        "name": format!("models/{}", call),
        "displayName": call,
        "supportedGenerationMethods": ["generateContent"],
    }))
}

/// Gemini generateContent endpoint
async fn handle_generate(
    State(state): State<Arc<MockState>>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    record(&state, call, api_key, body).await;

    match &state.reply {
        MockReply::Advice(advice) => {
            candidate_response(&serde_json::to_string(advice).unwrap()).into_response()
        }
        MockReply::Text(text) => candidate_response(text).into_response(),
        MockReply::Status(status, body) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body.clone(),
        )
            .into_response(),
        MockReply::EmptyBody => StatusCode::OK.into_response(),
        MockReply::NoCandidates => Json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .into_response(),
    }
}

fn candidate_response(text: &str) -> Json<Value> {
    Json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 250, "candidatesTokenCount": 120 }
    }))
}

/// Model listing endpoint (chat-completions health check)
async fn handle_list_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [{ "id": "mock-chat", "object": "model" }]
    }))
}

/// OpenAI-style chat completions endpoint
async fn handle_chat(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let api_key = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    record(&state, "chat/completions".to_string(), api_key, body).await;

    match &state.reply {
        MockReply::Advice(advice) => {
            choice_response(json!(serde_json::to_string(advice).unwrap())).into_response()
        }
        MockReply::Text(text) => choice_response(json!(text)).into_response(),
        MockReply::Status(status, body) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body.clone(),
        )
            .into_response(),
        MockReply::EmptyBody => StatusCode::OK.into_response(),
        MockReply::NoCandidates => Json(json!({
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": null, "refusal": "I can't help with that." },
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
    }
}

/// Count and capture a generation request, then apply the configured delay
async fn record(state: &MockState, call: String, api_key: Option<String>, body: Value) {
    state.requests.fetch_add(1, Ordering::SeqCst);
    *state.last.lock().unwrap() = Some(CapturedRequest {
        call,
        api_key,
        body,
    });

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }
}

fn choice_response(content: Value) -> Json<Value> {
    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 250, "completion_tokens": 120 }
    }))
}
