//! Error taxonomy for the gateway client.
//!
//! Every failure a caller can see is one of these variants. Transport
//! failures are split three ways — cannot connect, deadline exceeded,
//! remote rejected — because the front-end messages differ for each.
//! Nothing here retries; surfacing the failure is the whole policy.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("API unreachable: {message}")]
    ApiUnavailable { message: String },

    #[error("API timed out: {operation} exceeded {timeout_ms}ms")]
    ApiTimeout { operation: String, timeout_ms: u64 },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Malformed response from {context}: {message}")]
    MalformedResponse { context: String, message: String },

    #[error("File too large: {size_bytes} bytes (limit {limit_bytes})")]
    FileTooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("Unsupported file type: {extension}")]
    UnsupportedFileType { extension: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Configuration error: {key} - {reason}")]
    Config { key: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Stable, user-facing phrasing for each failure kind.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::ApiUnavailable { .. } => {
                "Cannot connect to the API. Please check if the service is running.".to_string()
            }
            GatewayError::ApiTimeout { .. } => "Request timed out. Please try again.".to_string(),
            GatewayError::ApiError { status, message } => {
                format!("The API rejected the request ({}): {}", status, message)
            }
            GatewayError::MalformedResponse { .. } => {
                "The API returned an unexpected response.".to_string()
            }
            GatewayError::FileTooLarge {
                size_bytes,
                limit_bytes,
            } => format!(
                "File is too large: {:.1} MB (limit {} MB).",
                *size_bytes as f64 / (1024.0 * 1024.0),
                limit_bytes / (1024 * 1024)
            ),
            GatewayError::UnsupportedFileType { extension } => {
                format!("Unsupported file type: {}", extension)
            }
            GatewayError::InvalidRequest { reason } => format!("Invalid request: {}", reason),
            GatewayError::Config { key, reason } => {
                format!("Configuration problem: {} ({})", key, reason)
            }
            GatewayError::Io(e) => format!("File error: {}", e),
        }
    }

    /// True for errors raised locally, before any network activity.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            GatewayError::FileTooLarge { .. }
                | GatewayError::UnsupportedFileType { .. }
                | GatewayError::InvalidRequest { .. }
                | GatewayError::Config { .. }
                | GatewayError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
