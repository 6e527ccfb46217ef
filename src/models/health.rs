use serde::{Deserialize, Serialize};

/// Probe outcome for a single backend service.
/// `Unknown` means the service has not been probed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    Up,
    Down,
    Unknown,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStatus::Up => write!(f, "UP"),
            ServiceStatus::Down => write!(f, "DOWN"),
            ServiceStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Transport a service speaks; probes only reach the REST health endpoint,
/// but the dashboard labels gRPC/Kafka services for context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceKind {
    Rest,
    Grpc,
    Kafka,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceKind::Rest => write!(f, "REST"),
            ServiceKind::Grpc => write!(f, "gRPC"),
            ServiceKind::Kafka => write!(f, "Kafka"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub name: String,
    pub status: ServiceStatus,
    pub port: u16,
    pub kind: ServiceKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(ServiceStatus::Up.to_string(), "UP");
        assert_eq!(ServiceStatus::Down.to_string(), "DOWN");
        assert_eq!(ServiceStatus::Unknown.to_string(), "UNKNOWN");
    }
}
