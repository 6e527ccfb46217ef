//! The request wrapper every backend call goes through.
//!
//! Responsibilities: join the configured gateway base URL with a relative
//! path, attach the bearer token from the session store (unless a request
//! opts out), serialize JSON bodies, classify responses, and clear the
//! session when the backend answers 401 so the auth guard sends the user
//! back to the login view.
//!
//! The actual network call sits behind the `Transport` trait so tests can
//! substitute a recording fake for `reqwest`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::SessionStore;

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow gateway responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Join a base URL and a relative path.
/// An empty base means the path is used as-is (external proxy mode).
pub fn join_url(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

// ============================================================================
// Transport
// ============================================================================

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// Per-request override of the client-wide timeout (health probes).
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    /// Response body text; None when the body could not be read.
    pub body: Option<String>,
}

/// The network seam. Production uses `ReqwestTransport`; tests inject a fake.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ApiError>;
}

/// Transport backed by `reqwest::Client`.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ApiError> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        // Best-effort body read: an unreadable body must not mask the status.
        let body = response.text().await.ok();

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}

// ============================================================================
// Request description
// ============================================================================

/// Description of one API request: method, optional body, auth opt-out,
/// and header overrides.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    body: Option<Vec<u8>>,
    is_json: bool,
    auth: bool,
    headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            is_json: false,
            auth: true,
            headers: Vec::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Attach a JSON body. Mutually exclusive with `raw_body`.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_vec(body)?);
        self.is_json = true;
        Ok(self)
    }

    /// Attach a raw body without a Content-Type.
    pub fn raw_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self.is_json = false;
        self
    }

    /// Send this request without the Authorization header, even when a token
    /// is present (login).
    pub fn no_auth(mut self) -> Self {
        self.auth = false;
        self
    }

    /// Add a header override.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

// ============================================================================
// Response payload
// ============================================================================

/// Normalized response body: parsed JSON when the server says JSON, raw text
/// as a best-effort fallback, and Empty for 204.
#[derive(Debug)]
pub enum Payload {
    Json(Value),
    Text(String),
    Empty,
}

impl Payload {
    /// Decode into a typed value. Text payloads are parsed as JSON on the
    /// off chance the server omitted the content type.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            Payload::Json(value) => Ok(serde_json::from_value(value)?),
            Payload::Text(text) => Ok(serde_json::from_str(&text)?),
            Payload::Empty => Err(ApiError::InvalidResponse(
                "expected a response body".to_string(),
            )),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Replace-or-insert with case-insensitive header names.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    if let Some(existing) = headers
        .iter_mut()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
    {
        existing.1 = value.to_string();
    } else {
        headers.push((name.to_string(), value.to_string()));
    }
}

#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        Ok(Self::with_transport(
            Arc::new(ReqwestTransport::new()?),
            base_url,
            session,
        ))
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            session,
        }
    }

    /// The underlying transport, shared with the health prober.
    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// Issue one request against the gateway and classify the response.
    pub async fn request(&self, path: &str, request: ApiRequest) -> Result<Payload, ApiError> {
        let url = join_url(&self.base_url, path);

        let mut headers = request.headers;
        set_header(&mut headers, "Accept", "application/json");
        if request.is_json && request.body.is_some() {
            set_header(&mut headers, "Content-Type", "application/json");
        }
        if request.auth {
            if let Some(token) = self.session.token() {
                set_header(&mut headers, "Authorization", &format!("Bearer {}", token));
            }
        }

        debug!(method = %request.method, %url, "Sending API request");

        let response = self
            .transport
            .send(TransportRequest {
                method: request.method,
                url,
                headers,
                body: request.body,
                timeout: None,
            })
            .await?;

        if response.status == 401 {
            // Token invalid/expired: drop the local session so the auth guard
            // routes to login on the next navigation.
            if let Err(e) = self.session.clear() {
                warn!(error = %e, "Failed to clear session after 401");
            }
        }

        if !(200..300).contains(&response.status) {
            return Err(ApiError::from_status(response.status, response.body.as_deref()));
        }

        if response.status == 204 {
            return Ok(Payload::Empty);
        }

        let is_json = response
            .content_type
            .as_deref()
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);
        let body = response.body.unwrap_or_default();

        if is_json {
            Ok(Payload::Json(serde_json::from_str(&body)?))
        } else {
            Ok(Payload::Text(body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeTransport;

    fn client_with(
        transport: Arc<FakeTransport>,
    ) -> (HttpClient, Arc<SessionStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = Arc::new(SessionStore::new(dir.path().to_path_buf()));
        let client = HttpClient::with_transport(transport, "http://gateway.test", session.clone());
        (client, session, dir)
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://gw:4004", "/api/patients"),
            "http://gw:4004/api/patients"
        );
        assert_eq!(
            join_url("http://gw:4004/", "/api/patients"),
            "http://gw:4004/api/patients"
        );
        assert_eq!(
            join_url("http://gw:4004", "api/patients"),
            "http://gw:4004/api/patients"
        );
        // Empty base: relative path used as-is (proxy mode)
        assert_eq!(join_url("", "/api/patients"), "/api/patients");
    }

    #[tokio::test]
    async fn test_bearer_token_attached_when_present() {
        let transport = FakeTransport::new();
        transport.push_json(200, "[]");
        let (client, session, _dir) = client_with(transport.clone());
        session.set_token("tok".to_string()).expect("set");

        client
            .request("/api/patients", ApiRequest::get())
            .await
            .expect("request");

        let sent = transport.single_request();
        assert_eq!(sent.header("Authorization"), Some("Bearer tok"));
        assert_eq!(sent.header("Accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_no_authorization_header_without_token() {
        let transport = FakeTransport::new();
        transport.push_json(200, "[]");
        let (client, _session, _dir) = client_with(transport.clone());

        client
            .request("/api/patients", ApiRequest::get())
            .await
            .expect("request");

        assert_eq!(transport.single_request().header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_auth_false_never_attaches_token() {
        let transport = FakeTransport::new();
        transport.push_json(200, r#"{"token":"abc"}"#);
        let (client, session, _dir) = client_with(transport.clone());
        session.set_token("tok".to_string()).expect("set");

        client
            .request("/auth/login", ApiRequest::post().no_auth())
            .await
            .expect("request");

        assert_eq!(transport.single_request().header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_json_body_sets_content_type() {
        let transport = FakeTransport::new();
        transport.push_json(200, "{}");
        let (client, _session, _dir) = client_with(transport.clone());

        let request = ApiRequest::post()
            .json(&serde_json::json!({"name": "x"}))
            .expect("encode");
        client.request("/api/patients", request).await.expect("request");

        let sent = transport.single_request();
        assert_eq!(sent.header("Content-Type"), Some("application/json"));
        assert_eq!(sent.body.as_deref(), Some(br#"{"name":"x"}"#.as_ref()));
    }

    #[tokio::test]
    async fn test_get_without_body_has_no_content_type() {
        let transport = FakeTransport::new();
        transport.push_json(200, "[]");
        let (client, _session, _dir) = client_with(transport.clone());

        client
            .request("/api/patients", ApiRequest::get())
            .await
            .expect("request");

        assert_eq!(transport.single_request().header("Content-Type"), None);
    }

    #[tokio::test]
    async fn test_401_clears_session() {
        let transport = FakeTransport::new();
        transport.push_response(401, Some("application/json"), Some(r#"{"error":"expired"}"#));
        let (client, session, _dir) = client_with(transport.clone());
        session.set_token("stale".to_string()).expect("set");

        let err = client
            .request("/api/patients", ApiRequest::get())
            .await
            .expect_err("401 must fail");

        assert_eq!(err.status(), Some(401));
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn test_non_2xx_produces_typed_error_with_status_and_body() {
        let transport = FakeTransport::new();
        transport.push_response(500, Some("text/plain"), Some("boom"));
        let (client, session, _dir) = client_with(transport.clone());
        session.set_token("tok".to_string()).expect("set");

        let err = client
            .request("/api/patients", ApiRequest::get())
            .await
            .expect_err("500 must fail");

        assert_eq!(err.status(), Some(500));
        assert_eq!(err.body(), Some("boom"));
        // Only 401 clears the session
        assert_eq!(session.token().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_error_with_unreadable_body_keeps_status() {
        let transport = FakeTransport::new();
        transport.push_response(502, None, None);
        let (client, _session, _dir) = client_with(transport.clone());

        let err = client
            .request("/api/patients", ApiRequest::get())
            .await
            .expect_err("502 must fail");

        assert_eq!(err.status(), Some(502));
        assert_eq!(err.body(), None);
    }

    #[tokio::test]
    async fn test_204_yields_empty_payload() {
        let transport = FakeTransport::new();
        transport.push_response(204, None, None);
        let (client, _session, _dir) = client_with(transport.clone());

        let payload = client
            .request("/api/patients/p1", ApiRequest::delete())
            .await
            .expect("request");

        assert!(matches!(payload, Payload::Empty));
    }

    #[tokio::test]
    async fn test_non_json_content_type_returns_raw_text() {
        let transport = FakeTransport::new();
        transport.push_response(200, Some("text/plain; charset=utf-8"), Some("pong"));
        let (client, _session, _dir) = client_with(transport.clone());

        let payload = client
            .request("/ping", ApiRequest::get())
            .await
            .expect("request");

        match payload {
            Payload::Text(text) => assert_eq!(text, "pong"),
            other => panic!("expected text payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_raw_body_passes_through_without_content_type() {
        let transport = FakeTransport::new();
        transport.push_response(200, Some("text/plain"), Some("ok"));
        let (client, _session, _dir) = client_with(transport.clone());

        client
            .request("/import", ApiRequest::post().raw_body(b"a,b,c".to_vec()))
            .await
            .expect("request");

        let sent = transport.single_request();
        assert_eq!(sent.header("Content-Type"), None);
        assert_eq!(sent.body.as_deref(), Some(b"a,b,c".as_ref()));
    }

    #[tokio::test]
    async fn test_header_override_replaces_default() {
        let transport = FakeTransport::new();
        transport.push_response(200, Some("text/csv"), Some("a,b"));
        let (client, _session, _dir) = client_with(transport.clone());

        client
            .request("/export", ApiRequest::get().header("Accept", "text/csv"))
            .await
            .expect("request");

        // Accept set exactly once, then overwritten by the standard policy:
        // defaults win, matching the web client's header handling.
        let sent = transport.single_request();
        let accepts: Vec<&str> = sent
            .headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("accept"))
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(accepts, vec!["application/json"]);
    }
}
