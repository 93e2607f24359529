//! In-memory transport that answers from a script of canned responses.
//!
//! Used to drive the client offline (demos, tests). Every request is
//! recorded so callers can inspect exactly what would have gone over the
//! wire.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use attendance_core::error::AppError;
use attendance_core::result::AppResult;

use super::transport::{HttpMethod, HttpTransport, OutboundRequest, RawResponse};

#[derive(Debug)]
enum Reply {
    Response(RawResponse),
    Unreachable,
}

#[derive(Debug)]
struct ScriptedReply {
    method: HttpMethod,
    path: String,
    reply: Reply,
}

#[derive(Debug, Default)]
struct ScriptState {
    replies: VecDeque<ScriptedReply>,
    requests: Vec<OutboundRequest>,
}

/// Scripted, recording [`HttpTransport`].
///
/// Replies are consumed in order: a request takes the first queued reply
/// whose method matches and whose path is a suffix of the request URL.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedTransport {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a response with a JSON body.
    pub fn respond(
        &self,
        method: HttpMethod,
        path: &str,
        status: u16,
        body: serde_json::Value,
    ) -> &Self {
        self.respond_raw(method, path, status, &body.to_string())
    }

    /// Queue a response with a raw text body.
    pub fn respond_raw(&self, method: HttpMethod, path: &str, status: u16, body: &str) -> &Self {
        self.lock().replies.push_back(ScriptedReply {
            method,
            path: path.to_string(),
            reply: Reply::Response(RawResponse {
                status,
                body: body.to_string(),
            }),
        });
        self
    }

    /// Queue a transport failure (no response reaches the client).
    pub fn unreachable(&self, method: HttpMethod, path: &str) -> &Self {
        self.lock().replies.push_back(ScriptedReply {
            method,
            path: path.to_string(),
            reply: Reply::Unreachable,
        });
        self
    }

    /// All requests sent so far.
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<OutboundRequest> {
        self.lock().requests.last().cloned()
    }

    /// Number of replies not consumed yet.
    pub fn pending(&self) -> usize {
        self.lock().replies.len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: OutboundRequest) -> AppResult<RawResponse> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        let position = state
            .replies
            .iter()
            .position(|r| r.method == request.method && request.url.ends_with(&r.path));

        match position.and_then(|index| state.replies.remove(index)) {
            Some(ScriptedReply {
                reply: Reply::Response(response),
                ..
            }) => Ok(response),
            Some(ScriptedReply {
                reply: Reply::Unreachable,
                ..
            }) => Err(AppError::transport(format!(
                "{} {}: connection refused",
                request.method, request.url
            ))),
            None => Err(AppError::transport(format!(
                "{} {}: no scripted response",
                request.method, request.url
            ))),
        }
    }
}
