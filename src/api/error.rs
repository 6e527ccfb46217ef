use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token may be expired")]
    Unauthorized { body: Option<String> },

    #[error("Request failed with status {status}")]
    Status { status: u16, body: Option<String> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies kept in error values
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data around
    fn truncate_body(body: &str) -> String {
        if body.chars().count() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let truncated: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total bytes)", truncated, body.len())
        }
    }

    /// Build the error for a non-2xx response. `body` is whatever text could
    /// be read from the response, if any.
    pub fn from_status(status: u16, body: Option<&str>) -> Self {
        let body = body.map(Self::truncate_body);
        match status {
            401 => ApiError::Unauthorized { body },
            _ => ApiError::Status { status, body },
        }
    }

    /// The HTTP status for response errors; None for transport/decode errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The captured response body text, if any was retrievable.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { body } | ApiError::Status { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}
