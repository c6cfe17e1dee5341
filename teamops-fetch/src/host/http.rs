//! Single-shot HTTP transport.
//!
//! One request in, one decoded response out. The transport never retries;
//! bounded retry loops live with the callers that need them.
//!
//! Every request carries:
//! - `Accept: application/json`
//! - `Content-Type: application/json` (form bodies use form encoding)
//! - a static `User-Agent`
//! - an optional bearer `Authorization` header

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::codec;
use crate::error::HttpError;

pub use reqwest::Method;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// User agent string for teamops.
const USER_AGENT: &str = concat!("teamops/", env!("CARGO_PKG_VERSION"));

/// Synthesized header entry carrying the numeric status.
pub const HTTP_CODE_HEADER: &str = "http_code";

// ============================================================================
// Request
// ============================================================================

/// Request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON body.
    Json(Value),
    /// URL-encoded form body.
    Form(Vec<(String, String)>),
}

/// A request to send through [`HttpTransport`].
#[derive(Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Fully-qualified URL.
    pub url: String,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Query parameters appended to the URL.
    pub query: Vec<(String, String)>,
    /// Bearer token for the `Authorization` header.
    pub bearer: Option<String>,
    /// Request body.
    pub body: RequestBody,
}

impl HttpRequest {
    /// Creates a request without headers or body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            bearer: None,
            body: RequestBody::Empty,
        }
    }

    /// Creates a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Creates a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets the bearer token.
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Sets a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Sets a form body.
    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = RequestBody::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Builds the final URL including query parameters.
    fn full_url(&self) -> Result<Url, HttpError> {
        let mut url = Url::parse(&self.url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bodies and bearer tokens can carry credentials.
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("query", &self.query.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Response
// ============================================================================

/// A response with parsed headers and a leniently decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Lower-cased header names to values, plus a synthesized `http_code`.
    pub headers: BTreeMap<String, String>,
    /// Decoded JSON body; `None` when empty or malformed.
    pub body: Option<Value>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Looks up a header by (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

// ============================================================================
// Transport
// ============================================================================

/// HTTP transport with tracing, a fixed timeout and JSON decoding.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport with the default 60 second timeout.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a transport with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner: client,
            timeout,
        })
    }

    /// The configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends a request and decodes the response.
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = request.full_url()?;
        debug!("Sending request");

        let mut builder = self
            .inner
            .request(request.method.clone(), url)
            .header(header::ACCEPT, "application/json");

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder.header(header::CONTENT_TYPE, "application/json"),
            RequestBody::Json(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(codec::encode(value)?),
            RequestBody::Form(pairs) => builder.form(pairs),
        };

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();

        let mut headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        headers.insert(HTTP_CODE_HEADER.to_string(), status.to_string());

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        let body = codec::decode_body(&bytes);

        debug!(status, has_body = body.is_some(), "Response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn classify(&self, err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(self.timeout.as_secs())
        } else {
            HttpError::Request(err)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport() -> HttpTransport {
        HttpTransport::new().unwrap()
    }

    #[tokio::test]
    async fn test_get_with_bearer_and_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/sites"))
            .and(query_param("page", "2"))
            .and(header("authorization", "Bearer tok"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let response = transport()
            .send(
                HttpRequest::get(format!("{}/v1/sites", server.uri()))
                    .query("page", "2")
                    .bearer("tok"),
            )
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.body, Some(json!({"data": []})));
    }

    #[tokio::test]
    async fn test_post_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/collaborators/batch_create"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"email": "bots@example.com"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let response = transport()
            .send(
                HttpRequest::post(format!("{}/v1/collaborators/batch_create", server.uri()))
                    .json(json!({"email": "bots@example.com"})),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn test_post_form_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .and(body_string_contains("grant_type=password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "a"})))
            .expect(1)
            .mount(&server)
            .await;

        let response = transport()
            .send(
                HttpRequest::post(format!("{}/auth/token", server.uri()))
                    .form([("grant_type", "password")]),
            )
            .await
            .unwrap();

        assert_eq!(response.body.unwrap()["access_token"], "a");
    }

    #[tokio::test]
    async fn test_headers_include_http_code() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("X-Request-Id", "abc")
                    .set_body_json(json!({"message": "Not found"})),
            )
            .mount(&server)
            .await;

        let response = transport()
            .send(HttpRequest::get(server.uri()))
            .await
            .unwrap();

        assert!(!response.is_success());
        assert_eq!(response.header("http_code"), Some("404"));
        assert_eq!(response.header("X-Request-Id"), Some("abc"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>502</html>"))
            .mount(&server)
            .await;

        let response = transport()
            .send(HttpRequest::get(server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, 502);
        assert!(response.body.is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_classified() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let transport = HttpTransport::with_timeout(Duration::from_millis(50)).unwrap();
        let err = transport
            .send(HttpRequest::get(server.uri()))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let err = transport()
            .send(HttpRequest::get("not a url"))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::InvalidUrl(_)));
    }

    #[test]
    fn test_request_debug_redacts_bearer() {
        let request = HttpRequest::get("https://example.com").bearer("secret-token");
        let debug = format!("{request:?}");
        assert!(!debug.contains("secret-token"));
    }
}
