//! Direct health probes of the platform's services.
//!
//! Probes bypass the gateway and hit each service's actuator endpoint on
//! localhost, unauthenticated, with a short timeout. Used by the dashboard.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::Method;
use tracing::debug;

use crate::models::{ServiceHealth, ServiceKind, ServiceStatus};

use super::http::{Transport, TransportRequest};

/// Per-probe timeout in seconds. A down service must not hold up the dashboard.
const HEALTH_CHECK_TIMEOUT_SECS: u64 = 3;

/// The platform's services with their local ports.
const SERVICES: &[(&str, u16, ServiceKind)] = &[
    ("API Gateway", 4004, ServiceKind::Rest),
    ("Auth Service", 4005, ServiceKind::Rest),
    ("Patient Service", 4000, ServiceKind::Rest),
    ("Billing Service (HTTP)", 4001, ServiceKind::Rest),
    ("Billing Service (gRPC)", 9001, ServiceKind::Grpc),
    ("Analytics Service", 4002, ServiceKind::Kafka),
];

/// The service table with every status Unknown, for display before the
/// first probe completes.
pub fn placeholder() -> Vec<ServiceHealth> {
    SERVICES
        .iter()
        .map(|(name, port, kind)| ServiceHealth {
            name: name.to_string(),
            status: ServiceStatus::Unknown,
            port: *port,
            kind: *kind,
        })
        .collect()
}

/// Probe one service. Any 2xx from the actuator endpoint counts as Up;
/// an error response, a connection failure, and a timeout all count as Down.
pub async fn check_service(
    transport: &dyn Transport,
    name: &str,
    port: u16,
    kind: ServiceKind,
) -> ServiceHealth {
    let url = format!("http://localhost:{}/actuator/health", port);
    let request = TransportRequest {
        method: Method::GET,
        url,
        headers: Vec::new(),
        body: None,
        timeout: Some(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS)),
    };

    let status = match transport.send(request).await {
        Ok(response) if (200..300).contains(&response.status) => ServiceStatus::Up,
        Ok(response) => {
            debug!(service = name, status = response.status, "Health probe got failure status");
            ServiceStatus::Down
        }
        Err(e) => {
            debug!(service = name, error = %e, "Health probe failed");
            ServiceStatus::Down
        }
    };

    ServiceHealth {
        name: name.to_string(),
        status,
        port,
        kind,
    }
}

/// Probe all services concurrently; one slow service only delays itself.
pub async fn check_all(transport: Arc<dyn Transport>) -> Vec<ServiceHealth> {
    let probes = SERVICES.iter().map(|(name, port, kind)| {
        let transport = transport.clone();
        async move { check_service(transport.as_ref(), name, *port, *kind).await }
    });
    join_all(probes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeTransport;
    use crate::api::ApiError;

    #[tokio::test]
    async fn test_2xx_classifies_up() {
        let transport = FakeTransport::new();
        transport.push_json(200, r#"{"status":"UP"}"#);

        let health =
            check_service(transport.as_ref(), "Auth Service", 4005, ServiceKind::Rest).await;

        assert_eq!(health.status, ServiceStatus::Up);
        assert_eq!(
            transport.single_request().url,
            "http://localhost:4005/actuator/health"
        );
    }

    #[tokio::test]
    async fn test_error_status_classifies_down() {
        let transport = FakeTransport::new();
        transport.push_response(503, Some("application/json"), Some(r#"{"status":"DOWN"}"#));

        let health =
            check_service(transport.as_ref(), "Patient Service", 4000, ServiceKind::Rest).await;

        assert_eq!(health.status, ServiceStatus::Down);
    }

    #[tokio::test]
    async fn test_transport_failure_classifies_down() {
        let transport = FakeTransport::new();
        transport.push_error(ApiError::InvalidResponse("connection refused".to_string()));

        let health =
            check_service(transport.as_ref(), "API Gateway", 4004, ServiceKind::Rest).await;

        assert_eq!(health.status, ServiceStatus::Down);
    }

    #[tokio::test]
    async fn test_probe_carries_no_authorization_header() {
        let transport = FakeTransport::new();
        transport.push_json(200, r#"{"status":"UP"}"#);

        check_service(transport.as_ref(), "Auth Service", 4005, ServiceKind::Rest).await;

        assert_eq!(transport.single_request().header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_check_all_probes_every_service() {
        let transport = FakeTransport::new();
        for _ in 0..SERVICES.len() {
            transport.push_json(200, r#"{"status":"UP"}"#);
        }

        let results = check_all(transport.clone()).await;

        assert_eq!(results.len(), SERVICES.len());
        assert!(results.iter().all(|h| h.status == ServiceStatus::Up));
        assert_eq!(transport.requests().len(), SERVICES.len());
    }

    #[test]
    fn test_placeholder_is_all_unknown() {
        let services = placeholder();
        assert_eq!(services.len(), SERVICES.len());
        assert!(services.iter().all(|h| h.status == ServiceStatus::Unknown));
    }
}
