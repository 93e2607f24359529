//! Wire transport trait and the `reqwest` implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use attendance_core::config::api::ApiConfig;
use attendance_core::error::{AppError, ErrorKind};
use attendance_core::result::AppResult;

/// HTTP methods used by the attendance service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Patch => write!(f, "PATCH"),
        }
    }
}

/// A fully prepared outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    /// Method.
    pub method: HttpMethod,
    /// Absolute URL without query string.
    pub url: String,
    /// Query parameters in order.
    pub query: Vec<(String, String)>,
    /// Headers in order.
    pub headers: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
}

impl OutboundRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Look up a query parameter by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Status and body of a response that reached the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text (may be empty).
    pub body: String,
}

impl RawResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends prepared requests over the wire.
///
/// Implementations return `Err` only when no response reached the client;
/// every HTTP status, including errors, is an `Ok(RawResponse)`.
#[async_trait]
pub trait HttpTransport: Send + Sync + fmt::Debug + 'static {
    /// Send one request and return the raw response.
    async fn send(&self, request: OutboundRequest) -> AppResult<RawResponse>;
}

/// Production transport backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport from the API configuration.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> AppResult<RawResponse> {
        let mut url = reqwest::Url::parse(&request.url).map_err(|e| {
            AppError::with_source(
                ErrorKind::Transport,
                format!("Invalid URL '{}': {e}", request.url),
                e,
            )
        })?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Transport,
                format!("{} {} failed: {e}", request.method, request.url),
                e,
            )
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Transport,
                format!("Failed to read response body: {e}"),
                e,
            )
        })?;

        Ok(RawResponse { status, body })
    }
}
