//! REST API client module for the patient management platform.
//!
//! This module provides the `ApiClient` for talking to the backend gateway
//! (auth, patients, billing, analytics) plus direct service health probes.
//!
//! The gateway uses JWT bearer token authentication; the token comes from
//! the shared `SessionStore` and is cleared whenever a request answers 401.

pub mod client;
pub mod error;
pub mod health;
pub mod http;

#[cfg(test)]
pub mod testing;

pub use client::{ApiClient, LoginRequest, LoginResponse, DEFAULT_EVENT_LIMIT};
pub use error::ApiError;
