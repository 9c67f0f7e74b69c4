//! Local stand-in for the Messages API, served on an ephemeral port.
//!
//! Replies are handed out in order; once they run out every call gets a 500.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use super::LlmClient;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct MockState {
    replies: Mutex<VecDeque<(StatusCode, String)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockLlm {
    base_url: String,
    state: Arc<MockState>,
}

impl MockLlm {
    pub async fn start(replies: Vec<(StatusCode, String)>) -> Self {
        let state = Arc::new(MockState {
            replies: Mutex::new(replies.into()),
            requests: Mutex::default(),
        });
        let app = Router::new()
            .route("/v1/messages", post(messages))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// A successful Messages API reply whose single text block is `text`.
    pub fn text_reply(text: &str) -> (StatusCode, String) {
        let body = json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{ "type": "text", "text": text }],
            "usage": { "input_tokens": 12, "output_tokens": 34 }
        });
        (StatusCode::OK, body.to_string())
    }

    /// Client aimed at this server with millisecond retry delays.
    pub fn client(&self) -> LlmClient {
        LlmClient::new("test-key".to_string())
            .unwrap()
            .with_base_url(&self.base_url)
            .with_retry_base(Duration::from_millis(5))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn messages(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    state.requests.lock().unwrap().push(RecordedRequest {
        api_key: headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    let (status, reply) = state
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, "no reply queued".to_string()));
    (status, [(header::CONTENT_TYPE, "application/json")], reply)
}
