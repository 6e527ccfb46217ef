//! Typed API surface for the patient management gateway.
//!
//! One function per backend operation. Every call goes through the shared
//! `HttpClient`, which owns the bearer-token and error-classification
//! policy; this layer only knows paths, methods, and payload types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::SessionStore;
use crate::models::{
    AnalyticsEvent, AnalyticsSummary, CreatePaymentRequest, Patient, PatientRequest,
    PaymentIntentResponse, PaymentResponse,
};

use super::http::{ApiRequest, HttpClient, Transport};
use super::ApiError;

/// Default page size for the recent-events feed.
pub const DEFAULT_EVENT_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// API client for the patient management gateway.
/// Clone is cheap - the transport is shared behind an Arc.
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(base_url, session)?,
        })
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            http: HttpClient::with_transport(transport, base_url, session),
        }
    }

    /// The underlying transport, shared with the health prober.
    pub fn transport(&self) -> Arc<dyn Transport> {
        self.http.transport()
    }

    // ===== Auth =====

    /// Exchange credentials for a bearer token. Sent without an Authorization
    /// header regardless of session state; storing the returned token is the
    /// caller's decision.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.http
            .request("/auth/login", ApiRequest::post().json(request)?.no_auth())
            .await?
            .decode()
    }

    /// Verify the current token with the auth service.
    pub async fn validate_token(&self) -> Result<(), ApiError> {
        self.http.request("/auth/validate", ApiRequest::get()).await?;
        Ok(())
    }

    // ===== Patients =====

    pub async fn patients(&self) -> Result<Vec<Patient>, ApiError> {
        self.http
            .request("/api/patients", ApiRequest::get())
            .await?
            .decode()
    }

    pub async fn patient(&self, id: &str) -> Result<Patient, ApiError> {
        let path = format!("/api/patients/{}", urlencoding::encode(id));
        self.http.request(&path, ApiRequest::get()).await?.decode()
    }

    pub async fn create_patient(&self, request: &PatientRequest) -> Result<Patient, ApiError> {
        self.http
            .request("/api/patients", ApiRequest::post().json(request)?)
            .await?
            .decode()
    }

    pub async fn update_patient(
        &self,
        id: &str,
        request: &PatientRequest,
    ) -> Result<Patient, ApiError> {
        let path = format!("/api/patients/{}", urlencoding::encode(id));
        self.http
            .request(&path, ApiRequest::put().json(request)?)
            .await?
            .decode()
    }

    /// Delete a patient. The service answers 204 on success.
    pub async fn delete_patient(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/api/patients/{}", urlencoding::encode(id));
        self.http.request(&path, ApiRequest::delete()).await?;
        Ok(())
    }

    // ===== Billing =====

    pub async fn create_payment_intent(
        &self,
        request: &CreatePaymentRequest,
    ) -> Result<PaymentIntentResponse, ApiError> {
        self.http
            .request(
                "/api/billing/payments/create-intent",
                ApiRequest::post().json(request)?,
            )
            .await?
            .decode()
    }

    pub async fn payment_status(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentResponse, ApiError> {
        let path = format!(
            "/api/billing/payments/{}",
            urlencoding::encode(payment_intent_id)
        );
        self.http.request(&path, ApiRequest::get()).await?.decode()
    }

    pub async fn cancel_payment(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentResponse, ApiError> {
        let path = format!(
            "/api/billing/payments/{}/cancel",
            urlencoding::encode(payment_intent_id)
        );
        self.http.request(&path, ApiRequest::post()).await?.decode()
    }

    // ===== Analytics =====

    pub async fn analytics_summary(&self) -> Result<AnalyticsSummary, ApiError> {
        self.http
            .request("/api/analytics/summary", ApiRequest::get())
            .await?
            .decode()
    }

    pub async fn analytics_events(&self, limit: usize) -> Result<Vec<AnalyticsEvent>, ApiError> {
        let path = format!("/api/analytics/events?limit={}", limit);
        self.http.request(&path, ApiRequest::get()).await?.decode()
    }

    pub async fn events_by_patient(
        &self,
        patient_id: &str,
    ) -> Result<Vec<AnalyticsEvent>, ApiError> {
        let path = format!(
            "/api/analytics/events/patient/{}",
            urlencoding::encode(patient_id)
        );
        self.http.request(&path, ApiRequest::get()).await?.decode()
    }

    pub async fn events_by_type(&self, event_type: &str) -> Result<Vec<AnalyticsEvent>, ApiError> {
        let path = format!(
            "/api/analytics/events/type/{}",
            urlencoding::encode(event_type)
        );
        self.http.request(&path, ApiRequest::get()).await?.decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeTransport;

    fn client_with(
        transport: Arc<FakeTransport>,
    ) -> (ApiClient, Arc<SessionStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = Arc::new(SessionStore::new(dir.path().to_path_buf()));
        let client =
            ApiClient::with_transport(transport, "http://gateway.test", session.clone());
        (client, session, dir)
    }

    #[tokio::test]
    async fn test_login_sends_no_authorization_header() {
        let transport = FakeTransport::new();
        transport.push_json(200, r#"{"token":"abc"}"#);
        let (client, session, _dir) = client_with(transport.clone());
        // Even a lingering token must not leak into the login request
        session.set_token("stale".to_string()).expect("set");

        let response = client
            .login(&LoginRequest {
                email: "a@b.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .expect("login");

        assert_eq!(response.token, "abc");
        let sent = transport.single_request();
        assert_eq!(sent.url, "http://gateway.test/auth/login");
        assert_eq!(sent.header("Authorization"), None);

        // The caller stores the token; the store then reflects it
        session.set_token(response.token).expect("set");
        assert_eq!(session.token().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_patients_carries_bearer_token() {
        let transport = FakeTransport::new();
        transport.push_json(200, "[]");
        let (client, session, _dir) = client_with(transport.clone());
        session.set_token("tok".to_string()).expect("set");

        let patients = client.patients().await.expect("patients");
        assert!(patients.is_empty());

        let sent = transport.single_request();
        assert_eq!(sent.url, "http://gateway.test/api/patients");
        assert_eq!(sent.header("Authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn test_401_on_any_call_clears_session() {
        let transport = FakeTransport::new();
        transport.push_response(401, Some("application/json"), Some(r#"{"error":"expired"}"#));
        let (client, session, _dir) = client_with(transport.clone());
        session.set_token("tok".to_string()).expect("set");

        let err = client.analytics_summary().await.expect_err("401 must fail");
        assert_eq!(err.status(), Some(401));
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn test_delete_patient_accepts_204() {
        let transport = FakeTransport::new();
        transport.push_response(204, None, None);
        let (client, session, _dir) = client_with(transport.clone());
        session.set_token("tok".to_string()).expect("set");

        client.delete_patient("p-1").await.expect("delete");

        let sent = transport.single_request();
        assert_eq!(sent.method, reqwest::Method::DELETE);
        assert_eq!(sent.url, "http://gateway.test/api/patients/p-1");
    }

    #[tokio::test]
    async fn test_path_segments_are_percent_encoded() {
        let transport = FakeTransport::new();
        transport.push_json(200, "[]");
        let (client, session, _dir) = client_with(transport.clone());
        session.set_token("tok".to_string()).expect("set");

        client
            .events_by_type("PATIENT CREATED/ODD")
            .await
            .expect("events");

        let sent = transport.single_request();
        assert_eq!(
            sent.url,
            "http://gateway.test/api/analytics/events/type/PATIENT%20CREATED%2FODD"
        );
    }

    #[tokio::test]
    async fn test_create_patient_round_trip() {
        let transport = FakeTransport::new();
        transport.push_json(
            201,
            r#"{"id":"p-9","name":"Jane","email":"jane@example.com","address":"456 Oak Ave","dateOfBirth":"1990-01-02"}"#,
        );
        let (client, session, _dir) = client_with(transport.clone());
        session.set_token("tok".to_string()).expect("set");

        let request = PatientRequest {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            address: "456 Oak Ave".to_string(),
            date_of_birth: "1990-01-02".to_string(),
            registered_date: None,
        };
        let created = client.create_patient(&request).await.expect("create");
        assert_eq!(created.id, "p-9");

        let sent = transport.single_request();
        assert_eq!(sent.header("Content-Type"), Some("application/json"));
        let body: serde_json::Value =
            serde_json::from_slice(sent.body.as_deref().expect("body")).expect("json body");
        assert_eq!(body["dateOfBirth"], "1990-01-02");
    }

    #[tokio::test]
    async fn test_validate_token_hits_auth_service() {
        let transport = FakeTransport::new();
        transport.push_json(200, "{}");
        let (client, session, _dir) = client_with(transport.clone());
        session.set_token("tok".to_string()).expect("set");

        client.validate_token().await.expect("validate");

        let sent = transport.single_request();
        assert_eq!(sent.url, "http://gateway.test/auth/validate");
        assert_eq!(sent.header("Authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn test_fetch_one_patient() {
        let transport = FakeTransport::new();
        transport.push_json(
            200,
            r#"{"id":"p-1","name":"Alice","email":"alice@example.com","address":"1 Elm St","dateOfBirth":"1970-05-20"}"#,
        );
        let (client, session, _dir) = client_with(transport.clone());
        session.set_token("tok".to_string()).expect("set");

        let patient = client.patient("p-1").await.expect("patient");
        assert_eq!(patient.name, "Alice");
        assert_eq!(
            transport.single_request().url,
            "http://gateway.test/api/patients/p-1"
        );
    }

    #[tokio::test]
    async fn test_analytics_events_sets_limit_query() {
        let transport = FakeTransport::new();
        transport.push_json(200, "[]");
        let (client, session, _dir) = client_with(transport.clone());
        session.set_token("tok".to_string()).expect("set");

        client
            .analytics_events(DEFAULT_EVENT_LIMIT)
            .await
            .expect("events");

        assert_eq!(
            transport.single_request().url,
            "http://gateway.test/api/analytics/events?limit=50"
        );
    }
}
