//! Outbound calls to the attendance service.
//!
//! [`RequestGateway`] is the only component that talks to the network. It
//! injects the bearer token, serializes bodies, and normalizes every
//! non-success outcome into an [`AppError`]:
//!
//! - no response → [`ErrorKind::Transport`]
//! - non-2xx → [`ErrorKind::Remote`] with the service message, or `HTTP <status>`
//! - 2xx with an unusable body → [`ErrorKind::InvalidResponse`]
//!
//! There are no retries and no caching.

pub mod endpoints;
pub mod scripted;
pub mod transport;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use attendance_core::error::{AppError, ErrorKind};
use attendance_core::result::AppResult;
use attendance_core::types::ApiErrorPayload;

use crate::session::Session;

pub use scripted::ScriptedTransport;
pub use transport::{HttpMethod, HttpTransport, OutboundRequest, RawResponse, ReqwestTransport};

/// Query parameters of one call, in order.
pub type QueryPairs = Vec<(&'static str, String)>;

/// Bearer-authenticated JSON gateway to the attendance service.
#[derive(Debug, Clone)]
pub struct RequestGateway {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
    token: Option<String>,
}

impl RequestGateway {
    /// Create an unauthenticated gateway for the given API base URL.
    pub fn new(transport: Arc<dyn HttpTransport>, api_base: &str) -> Self {
        Self {
            transport,
            api_base: normalize_base(api_base),
            token: None,
        }
    }

    /// Current API base URL (no trailing slash).
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Point the gateway at another API base URL.
    pub fn set_api_base(&mut self, api_base: &str) {
        self.api_base = normalize_base(api_base);
    }

    /// Use the session's API base and token for subsequent calls.
    pub fn authorize(&mut self, session: &Session) {
        self.api_base = normalize_base(&session.api_base);
        self.token = Some(session.token.clone());
    }

    /// Stop sending a token.
    pub fn revoke(&mut self) {
        self.token = None;
    }

    /// `GET` a JSON resource.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: QueryPairs) -> AppResult<T> {
        self.call(HttpMethod::Get, path, query, None).await
    }

    /// Send a JSON body with the given method.
    pub async fn send<T, B>(
        &self,
        method: HttpMethod,
        path: &str,
        query: QueryPairs,
        body: &B,
    ) -> AppResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.call(method, path, query, Some(body)).await
    }

    /// Perform one call and decode the success body into `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        query: QueryPairs,
        body: Option<serde_json::Value>,
    ) -> AppResult<T> {
        let mut headers = Vec::with_capacity(2);
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let request = OutboundRequest {
            method,
            url: format!("{}{}", self.api_base, path),
            query: query
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
            headers,
            body,
        };

        let response = self.transport.send(request).await?;
        debug!(%method, path, status = response.status, "attendance service call");

        decode_response(method, path, response)
    }
}

fn normalize_base(api_base: &str) -> String {
    api_base.trim().trim_end_matches('/').to_string()
}

fn decode_response<T: DeserializeOwned>(
    method: HttpMethod,
    path: &str,
    response: RawResponse,
) -> AppResult<T> {
    if !response.is_success() {
        let message = serde_json::from_str::<ApiErrorPayload>(&response.body)
            .ok()
            .and_then(ApiErrorPayload::into_message)
            .unwrap_or_else(|| format!("HTTP {}", response.status));
        return Err(AppError::remote(response.status, message));
    }

    let body = if response.body.trim().is_empty() {
        "{}"
    } else {
        response.body.as_str()
    };

    serde_json::from_str(body).map_err(|e| {
        AppError::with_source(
            ErrorKind::InvalidResponse,
            format!("Unexpected response from {method} {path}: {e}"),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::types::{Ack, Class, Role, UserId};
    use serde_json::json;

    fn gateway(transport: &ScriptedTransport) -> RequestGateway {
        RequestGateway::new(Arc::new(transport.clone()), "http://school.test/api/v1/")
    }

    fn session() -> Session {
        Session {
            api_base: "http://school.test/api/v1".into(),
            token: "tok-123".into(),
            role: Role::Teacher,
            user_id: UserId(7),
        }
    }

    #[tokio::test]
    async fn test_bearer_header_only_when_authorized() {
        let transport = ScriptedTransport::new();
        transport
            .respond(HttpMethod::Get, "/classes", 200, json!([]))
            .respond(HttpMethod::Get, "/classes", 200, json!([]));
        let mut gw = gateway(&transport);

        let _: Vec<Class> = gw.get("/classes", vec![]).await.unwrap();
        assert_eq!(transport.last_request().unwrap().header("authorization"), None);

        gw.authorize(&session());
        let _: Vec<Class> = gw.get("/classes", vec![]).await.unwrap();
        let request = transport.last_request().unwrap();
        assert_eq!(request.header("Authorization"), Some("Bearer tok-123"));
        assert_eq!(request.url, "http://school.test/api/v1/classes");
    }

    #[tokio::test]
    async fn test_body_is_serialized_as_json() {
        let transport = ScriptedTransport::new();
        transport.respond(HttpMethod::Post, "/classes", 201, json!({"message": "Class created"}));
        let gw = gateway(&transport);

        let ack: Ack = gw
            .send(
                HttpMethod::Post,
                "/classes",
                vec![],
                &json!({"name": "7A", "teacherId": 2}),
            )
            .await
            .unwrap();
        assert_eq!(ack.message.as_deref(), Some("Class created"));

        let request = transport.last_request().unwrap();
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body, Some(json!({"name": "7A", "teacherId": 2})));
    }

    #[tokio::test]
    async fn test_remote_error_uses_payload_message() {
        let transport = ScriptedTransport::new();
        transport.respond(HttpMethod::Get, "/users", 403, json!({"detail": "Forbidden"}));
        let gw = gateway(&transport);

        let err = gw.get::<Ack>("/users", vec![]).await.unwrap_err();
        assert!(err.is_remote_status(403));
        assert_eq!(err.message, "Forbidden");
    }

    #[tokio::test]
    async fn test_remote_error_falls_back_to_status() {
        let transport = ScriptedTransport::new();
        transport.respond_raw(HttpMethod::Get, "/users", 502, "<html>Bad Gateway</html>");
        let gw = gateway(&transport);

        let err = gw.get::<Ack>("/users", vec![]).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Remote);
        assert_eq!(err.message, "HTTP 502");
    }

    #[tokio::test]
    async fn test_unreachable_is_transport_error() {
        let transport = ScriptedTransport::new();
        transport.unreachable(HttpMethod::Get, "/classes");
        let gw = gateway(&transport);

        let err = gw.get::<Vec<Class>>("/classes", vec![]).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_undecodable_success_is_invalid_response() {
        let transport = ScriptedTransport::new();
        transport.respond(HttpMethod::Get, "/classes", 200, json!({"unexpected": true}));
        let gw = gateway(&transport);

        let err = gw.get::<Vec<Class>>("/classes", vec![]).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_empty_success_body_is_an_ack() {
        let transport = ScriptedTransport::new();
        transport.respond_raw(HttpMethod::Patch, "/students/4", 204, "");
        let gw = gateway(&transport);

        let ack: Ack = gw
            .send(HttpMethod::Patch, "/students/4", vec![], &json!({"isActive": false}))
            .await
            .unwrap();
        assert!(ack.message.is_none());
    }
}
