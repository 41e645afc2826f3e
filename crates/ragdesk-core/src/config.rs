//! Gateway configuration.
//!
//! All knobs live in one explicit struct handed to the client at
//! construction — nothing is read from ambient globals after startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

pub const DEFAULT_APP_TITLE: &str = "RAG Document Assistant";
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 50;

/// Per-operation request deadlines.
///
/// Uploads get a long deadline because the remote side chunks and indexes
/// the document before answering. `admin` covers stats, listing and
/// deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationTimeouts {
    pub health: Duration,
    pub query: Duration,
    pub upload: Duration,
    pub admin: Duration,
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        Self {
            health: Duration::from_secs(10),
            query: Duration::from_secs(60),
            upload: Duration::from_secs(300),
            admin: Duration::from_secs(30),
        }
    }
}

/// Configuration for the gateway client and the front-end around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Root address of the external RAG API, no trailing slash.
    pub api_base_url: String,
    /// Title shown by the interactive front-end.
    pub app_title: String,
    /// Client-side upload size limit, in megabytes.
    pub max_file_size_mb: u64,
    /// Request deadlines per operation class.
    pub timeouts: OperationTimeouts,
}

impl GatewayConfig {
    /// Create a configuration with defaults for everything but the base URL.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let api_base_url: String = api_base_url.into();
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            timeouts: OperationTimeouts::default(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// `API_BASE_URL` is required; `APP_TITLE` and `MAX_FILE_SIZE` (in MB)
    /// are optional.
    pub fn from_env() -> Result<Self> {
        let api_base_url = std::env::var("API_BASE_URL").map_err(|_| GatewayError::Config {
            key: "API_BASE_URL".to_string(),
            reason: "not set".to_string(),
        })?;
        if api_base_url.trim().is_empty() {
            return Err(GatewayError::Config {
                key: "API_BASE_URL".to_string(),
                reason: "empty".to_string(),
            });
        }

        let mut config = Self::new(api_base_url);

        if let Ok(title) = std::env::var("APP_TITLE") {
            if !title.trim().is_empty() {
                config.app_title = title;
            }
        }

        if let Ok(raw) = std::env::var("MAX_FILE_SIZE") {
            config.max_file_size_mb = raw.parse().map_err(|_| GatewayError::Config {
                key: "MAX_FILE_SIZE".to_string(),
                reason: format!("not a number: {}", raw),
            })?;
        }

        Ok(config)
    }

    /// Upload size limit in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}
