//! The API gateway client.
//!
//! All operations share one `reqwest::Client` and one decode path.
//! Size and file-type checks for uploads run before any bytes leave the
//! machine.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use ragdesk_core::{
    DeleteReceipt, DocumentRecord, GatewayConfig, GatewayError, QueryRequest, QueryResponse,
    Result, StatsSnapshot, UploadReceipt,
};

/// File extensions the remote pipeline can process.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "txt", "md", "html"];

/// Client for the external RAG API.
#[derive(Clone)]
pub struct RagClient {
    http: Client,
    config: GatewayConfig,
}

impl RagClient {
    pub fn new(mut config: GatewayConfig) -> Self {
        config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    /// `GET /health` — true iff the API answered 200 within the deadline.
    ///
    /// Never errors: an unreachable API is a state to report, not a fault.
    pub async fn health_check(&self) -> bool {
        let url = self.endpoint("/health");
        match self
            .http
            .get(&url)
            .timeout(self.config.timeouts.health)
            .send()
            .await
        {
            Ok(resp) => resp.status() == StatusCode::OK,
            Err(err) => {
                warn!("health check against {} failed: {}", url, err);
                false
            }
        }
    }

    /// `POST /query` — ask a question against the indexed corpus.
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let timeout = self.config.timeouts.query;
        debug!(
            "query: top_k={} style={}",
            request.top_k, request.answer_style
        );
        let resp = self
            .http
            .post(self.endpoint("/query"))
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("query", timeout, e))?;
        decode("query", timeout, resp).await
    }

    /// `POST /upload` — send a document for chunking and indexing.
    ///
    /// Size and extension checks run first; a file over the configured
    /// limit fails with `FileTooLarge` without touching the network.
    pub async fn upload(
        &self,
        file_bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
        force_reprocess: bool,
    ) -> Result<UploadReceipt> {
        self.precheck_upload(filename, file_bytes.len() as u64)?;

        let timeout = self.config.timeouts.upload;
        let size = file_bytes.len();
        let part = multipart::Part::bytes(file_bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|_| GatewayError::InvalidRequest {
                reason: format!("invalid content type: {}", content_type),
            })?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("force_reprocess", force_reprocess.to_string());

        debug!("upload: {} ({} bytes)", filename, size);
        let resp = self
            .http
            .post(self.endpoint("/upload"))
            .timeout(timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error("upload", timeout, e))?;
        decode("upload", timeout, resp).await
    }

    /// Upload a file from disk. The size check runs against file
    /// metadata before the bytes are read.
    pub async fn upload_path(&self, path: &Path, force_reprocess: bool) -> Result<UploadReceipt> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| GatewayError::InvalidRequest {
                reason: format!("not a file path: {}", path.display()),
            })?
            .to_string();

        let meta = tokio::fs::metadata(path).await?;
        self.precheck_upload(&filename, meta.len())?;

        let bytes = tokio::fs::read(path).await?;
        let content_type = content_type_for(&file_extension(&filename));
        self.upload(bytes, &filename, content_type, force_reprocess)
            .await
    }

    /// `GET /documents` — all processed documents. An empty list is a
    /// valid, non-error result.
    pub async fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        let timeout = self.config.timeouts.admin;
        let resp = self
            .http
            .get(self.endpoint("/documents"))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error("list_documents", timeout, e))?;
        decode("list_documents", timeout, resp).await
    }

    /// `DELETE /documents/{filename}` — remove a document and its chunks.
    ///
    /// Whether deleting an absent filename is an error belongs to the
    /// remote API; a 404 comes back as `ApiError`, never a panic.
    pub async fn delete_document(&self, filename: &str) -> Result<DeleteReceipt> {
        let timeout = self.config.timeouts.admin;
        let url = format!(
            "{}/documents/{}",
            self.config.api_base_url,
            urlencoding::encode(filename)
        );
        debug!("delete: {}", filename);
        let resp = self
            .http
            .delete(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error("delete_document", timeout, e))?;
        decode("delete_document", timeout, resp).await
    }

    /// `GET /stats` — current collection statistics. Never cached;
    /// every call reflects remote state at call time.
    pub async fn get_stats(&self) -> Result<StatsSnapshot> {
        let timeout = self.config.timeouts.admin;
        let resp = self
            .http
            .get(self.endpoint("/stats"))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error("get_stats", timeout, e))?;
        decode("get_stats", timeout, resp).await
    }

    fn precheck_upload(&self, filename: &str, size_bytes: u64) -> Result<()> {
        let extension = file_extension(filename);
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(GatewayError::UnsupportedFileType { extension });
        }
        let limit_bytes = self.config.max_file_size_bytes();
        if size_bytes > limit_bytes {
            return Err(GatewayError::FileTooLarge {
                size_bytes,
                limit_bytes,
            });
        }
        Ok(())
    }
}

/// MIME type for a supported extension.
pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "doc" => "application/msword",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "html" => "text/html",
        _ => "application/octet-stream",
    }
}

fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("(none)")
        .to_ascii_lowercase()
}

/// Classify a reqwest transport failure into the taxonomy. Timeout and
/// connection-refused are distinct kinds on purpose.
fn transport_error(operation: &str, timeout: Duration, err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::ApiTimeout {
            operation: operation.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    } else if err.is_connect() {
        GatewayError::ApiUnavailable {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        GatewayError::MalformedResponse {
            context: operation.to_string(),
            message: err.to_string(),
        }
    } else {
        GatewayError::ApiUnavailable {
            message: err.to_string(),
        }
    }
}

/// Shared decode path: non-2xx becomes `ApiError` with whatever detail
/// the body carries; a 2xx body that fails to parse becomes
/// `MalformedResponse`.
async fn decode<T: DeserializeOwned>(
    operation: &str,
    timeout: Duration,
    resp: Response,
) -> Result<T> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| transport_error(operation, timeout, e))?;

    if !status.is_success() {
        return Err(GatewayError::ApiError {
            status: status.as_u16(),
            message: error_detail(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| GatewayError::MalformedResponse {
        context: operation.to_string(),
        message: e.to_string(),
    })
}

/// Pull a human-readable message out of an error body. The deployed API
/// wraps errors as `{"detail": ...}`; fall back to the raw text.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no error detail provided".to_string()
    } else {
        truncated(trimmed, 200)
    }
}

fn truncated(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}
