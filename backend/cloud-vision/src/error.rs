//! Error types for the Vision client
use std::time::Duration;

/// Vision client error types
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Failed to decode Vision API response: {message}")]
    Decode {
        message: String,
        /// Raw response body, kept for diagnosis
        body: String,
    },

    #[error("Vision API error {code}: {message}")]
    Api { code: i32, message: String },

    #[error("Vision API request timed out after {0:?}")]
    Timeout(Duration),
}

/// Transport-level failures talking to the Vision endpoint
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl VisionError {
    pub(crate) fn decode(message: impl Into<String>, body: impl Into<String>) -> Self {
        VisionError::Decode {
            message: message.into(),
            body: body.into(),
        }
    }

    /// HTTP status code, when the failure came from a non-2xx response
    pub fn status(&self) -> Option<u16> {
        match self {
            VisionError::Network(NetworkError::Status { status, .. }) => Some(*status),
            VisionError::Network(NetworkError::Transport(e)) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, VisionError::Network(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, VisionError::Decode { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, VisionError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, VisionError>;
