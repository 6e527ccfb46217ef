//! Data models for the patient management platform.
//!
//! This module contains the data structures used to represent backend
//! responses and request payloads:
//!
//! - `Patient`, `PatientRequest`: patient records and CRUD payloads
//! - Billing types: `CreatePaymentRequest`, `PaymentIntentResponse`, `PaymentResponse`
//! - Analytics types: `AnalyticsEvent`, `AnalyticsSummary`
//! - Health types: `ServiceHealth`, `ServiceStatus`, `ServiceKind`
//!
//! Field names carry explicit serde renames to match the backend's camelCase
//! wire format.

pub mod analytics;
pub mod billing;
pub mod health;
pub mod patient;

pub use analytics::{AnalyticsEvent, AnalyticsSummary, EventFilter};
pub use billing::{CreatePaymentRequest, PaymentIntentResponse, PaymentResponse};
pub use health::{ServiceHealth, ServiceKind, ServiceStatus};
pub use patient::{Patient, PatientRequest};
