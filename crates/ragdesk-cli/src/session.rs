//! Session-scoped UI state.
//!
//! One struct owns everything the front-end mutates between actions:
//! the client handle, the current answer settings, the last outcome,
//! and the question history. Each action issues exactly one blocking
//! call and records how it went — no globals anywhere.

use std::path::Path;

use chrono::Utc;

use ragdesk_client::RagClient;
use ragdesk_core::{
    AnswerStyle, DeleteReceipt, DocumentRecord, GatewayError, QueryRequest, QueryResponse, Result,
    StatsSnapshot, UploadReceipt,
};

pub const MIN_TOP_K: u32 = 1;
pub const MAX_TOP_K: u32 = 10;
pub const DEFAULT_TOP_K: u32 = 5;

/// Questions offered by the `samples` command, from the corpus of bank
/// quarterly reports this deployment was built around.
pub const SAMPLE_QUESTIONS: &[&str] = &[
    "What were Scotiabank's capital ratios in Q1 2025?",
    "What was the net income for the quarter?",
    "What are the main risk factors mentioned?",
    "How did the bank perform in international markets?",
    "What were the key financial highlights?",
];

/// One asked question, kept for the session history.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub question: String,
    pub asked_at: String,
    pub succeeded: bool,
}

pub struct Session {
    client: RagClient,
    pub answer_style: AnswerStyle,
    pub top_k: u32,
    pub last_result: Option<QueryResponse>,
    pub last_error: Option<String>,
    pub history: Vec<HistoryEntry>,
}

impl Session {
    pub fn new(client: RagClient) -> Self {
        Self {
            client,
            answer_style: AnswerStyle::default(),
            top_k: DEFAULT_TOP_K,
            last_result: None,
            last_error: None,
            history: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.client.config().app_title
    }

    pub fn base_url(&self) -> &str {
        &self.client.config().api_base_url
    }

    pub async fn check_health(&self) -> bool {
        self.client.health_check().await
    }

    pub fn set_style(&mut self, style: AnswerStyle) {
        self.answer_style = style;
    }

    pub fn set_top_k(&mut self, top_k: u32) -> Result<()> {
        if !(MIN_TOP_K..=MAX_TOP_K).contains(&top_k) {
            return Err(GatewayError::InvalidRequest {
                reason: format!("top_k must be between {} and {}", MIN_TOP_K, MAX_TOP_K),
            });
        }
        self.top_k = top_k;
        Ok(())
    }

    /// Ask one question with the session's current settings. The outcome
    /// lands in the history either way.
    pub async fn ask(&mut self, question: &str) -> Result<QueryResponse> {
        let outcome = match QueryRequest::new(question, self.top_k, self.answer_style) {
            Ok(request) => self.client.query(&request).await,
            Err(err) => Err(err),
        };

        self.history.push(HistoryEntry {
            question: question.to_string(),
            asked_at: Utc::now().to_rfc3339(),
            succeeded: outcome.is_ok(),
        });

        match outcome {
            Ok(resp) => {
                self.last_result = Some(resp.clone());
                self.last_error = None;
                Ok(resp)
            }
            Err(err) => {
                self.last_error = Some(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn upload(&mut self, path: &Path, force_reprocess: bool) -> Result<UploadReceipt> {
        let outcome = self.client.upload_path(path, force_reprocess).await;
        self.track(outcome)
    }

    pub async fn documents(&mut self) -> Result<Vec<DocumentRecord>> {
        let outcome = self.client.list_documents().await;
        self.track(outcome)
    }

    pub async fn delete(&mut self, filename: &str) -> Result<DeleteReceipt> {
        let outcome = self.client.delete_document(filename).await;
        self.track(outcome)
    }

    pub async fn stats(&mut self) -> Result<StatsSnapshot> {
        let outcome = self.client.get_stats().await;
        self.track(outcome)
    }

    fn track<T>(&mut self, outcome: Result<T>) -> Result<T> {
        match &outcome {
            Ok(_) => self.last_error = None,
            Err(err) => self.last_error = Some(err.user_message()),
        }
        outcome
    }
}
