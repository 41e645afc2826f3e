//! Wire types for the external RAG API.
//!
//! Every type here is an ephemeral view over remote state: created per
//! call, never persisted locally. Fields the API may omit carry
//! `#[serde(default)]` so older server builds still decode; extra
//! diagnostic fields are kept in flattened maps instead of being dropped.

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

/// Requested answer verbosity, as the API spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStyle {
    Concise,
    Detailed,
    Explanatory,
}

impl Default for AnswerStyle {
    fn default() -> Self {
        AnswerStyle::Concise
    }
}

impl std::fmt::Display for AnswerStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerStyle::Concise => write!(f, "concise"),
            AnswerStyle::Detailed => write!(f, "detailed"),
            AnswerStyle::Explanatory => write!(f, "explanatory"),
        }
    }
}

impl std::str::FromStr for AnswerStyle {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concise" => Ok(AnswerStyle::Concise),
            "detailed" => Ok(AnswerStyle::Detailed),
            "explanatory" => Ok(AnswerStyle::Explanatory),
            other => Err(GatewayError::InvalidRequest {
                reason: format!(
                    "unknown answer style '{}' (expected concise, detailed or explanatory)",
                    other
                ),
            }),
        }
    }
}

/// Body of `POST /query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub top_k: u32,
    pub answer_style: AnswerStyle,
}

impl QueryRequest {
    /// Validated constructor: non-empty question, `top_k >= 1`.
    pub fn new(question: impl Into<String>, top_k: u32, answer_style: AnswerStyle) -> Result<Self> {
        let question: String = question.into();
        if question.trim().is_empty() {
            return Err(GatewayError::InvalidRequest {
                reason: "question is empty".to_string(),
            });
        }
        if top_k == 0 {
            return Err(GatewayError::InvalidRequest {
                reason: "top_k must be at least 1".to_string(),
            });
        }
        Ok(Self {
            question,
            top_k,
            answer_style,
        })
    }
}

/// Diagnostic counters reported alongside an answer.
///
/// The set of counters is owned by the remote pipeline; anything this
/// client does not model lands in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_variations: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fusion_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results_before_dedup: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_results_after_rerank: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProcessingInfo {
    /// Check the pipeline counters against their defining inequalities:
    /// `unique_results <= total_results_before_dedup` and
    /// `final_results_after_rerank <= unique_results`. Missing counters
    /// are not a violation.
    pub fn counters_consistent(&self) -> bool {
        if let (Some(unique), Some(total)) = (self.unique_results, self.total_results_before_dedup)
        {
            if unique > total {
                return false;
            }
        }
        if let (Some(reranked), Some(unique)) =
            (self.final_results_after_rerank, self.unique_results)
        {
            if reranked > unique {
                return false;
            }
        }
        true
    }
}

/// Per-chunk metadata attached to a retrieved source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_type: Option<String>,
}

/// One retrieved source chunk backing an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceChunk {
    pub content: String,
    pub score: f64,
    pub metadata: ChunkMetadata,
}

/// Body of a successful `POST /query` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub answer: String,
    pub num_sources: u32,
    #[serde(default)]
    pub processing_info: ProcessingInfo,
    #[serde(default)]
    pub results: Vec<SourceChunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Confirmation returned by `POST /upload`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks_created: Option<u32>,
    #[serde(default)]
    pub skipped_processing: bool,
    #[serde(default)]
    pub used_existing_markdown: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One entry of `GET /documents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub source_file: String,
    pub chunk_count: u32,
    #[serde(default)]
    pub chunk_types: Vec<String>,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub created_dates: Vec<String>,
}

impl DocumentRecord {
    /// Most recent `created_dates` entry, if the API reported any.
    pub fn last_updated(&self) -> Option<&str> {
        self.created_dates.last().map(String::as_str)
    }
}

/// Snapshot returned by `GET /stats`. Never cached by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_chunks: u64,
    /// Some server builds spell this `unique_documents`.
    #[serde(alias = "unique_documents")]
    pub total_documents: u64,
    pub collection_status: String,
    #[serde(default)]
    pub document_names: Vec<String>,
}

/// Confirmation returned by `DELETE /documents/{filename}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
