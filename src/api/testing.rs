//! Test doubles for the transport seam.
//!
//! `FakeTransport` records every request it is handed and answers from a
//! queue of canned responses, so HTTP-layer behavior (headers, bodies,
//! classification) can be asserted without a live backend.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::http::{Transport, TransportRequest, TransportResponse};
use super::ApiError;

#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, ApiError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a JSON response.
    pub fn push_json(&self, status: u16, body: &str) {
        self.push_response(status, Some("application/json"), Some(body));
    }

    /// Queue an arbitrary response.
    pub fn push_response(&self, status: u16, content_type: Option<&str>, body: Option<&str>) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Ok(TransportResponse {
                status,
                content_type: content_type.map(|s| s.to_string()),
                body: body.map(|s| s.to_string()),
            }));
    }

    /// Queue a transport-level failure.
    pub fn push_error(&self, error: ApiError) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Err(error));
    }

    /// All requests sent so far.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// The one and only request sent; panics if zero or several were sent.
    pub fn single_request(&self) -> TransportRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().expect("one request")
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ApiError> {
        self.requests.lock().expect("requests lock").push(request);
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .expect("no canned response queued for request")
    }
}
