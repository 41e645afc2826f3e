//! Gateway client tests against an in-process mock of the RAG API.
//!
//! Each test spins up an axum router on an ephemeral port and points a
//! `RagClient` at it, so the full request/response path — serialization,
//! timeouts, error mapping — is exercised without a live deployment.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;

use ragdesk_client::RagClient;
use ragdesk_core::{AnswerStyle, GatewayConfig, GatewayError, QueryRequest};

#[derive(Default)]
struct MockApi {
    query_hits: AtomicUsize,
    upload_hits: AtomicUsize,
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A healthy mock with a three-chunk corpus.
fn healthy_router(api: Arc<MockApi>) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "healthy"})) }))
        .route("/query", post(handle_query))
        .route("/upload", post(handle_upload))
        .route("/documents", get(handle_documents))
        .route("/documents/{filename}", delete(handle_delete))
        .route("/stats", get(handle_stats))
        .with_state(api)
}

async fn handle_query(
    State(api): State<Arc<MockApi>>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    api.query_hits.fetch_add(1, Ordering::SeqCst);

    let corpus_size = 3;
    let top_k = body["top_k"].as_u64().unwrap_or(5) as usize;
    let n = top_k.min(corpus_size);
    let results: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            json!({
                "content": format!("Relevant excerpt {} about capital ratios.", i + 1),
                "score": 0.9 - 0.1 * i as f64,
                "metadata": {
                    "source_file": "q1_report.pdf",
                    "header": "Capital Management",
                    "chunk_type": "text"
                }
            })
        })
        .collect();

    Json(json!({
        "query": body["question"],
        "answer": "The CET1 capital ratio was 13.2% in Q1 2025.",
        "num_sources": n,
        "processing_info": {
            "query_variations": 3,
            "fusion_method": "rrf",
            "total_results_before_dedup": 12,
            "unique_results": 9,
            "final_results_after_rerank": n
        },
        "results": results,
        "timestamp": "2025-03-01T12:00:00Z"
    }))
}

async fn handle_upload(
    State(api): State<Arc<MockApi>>,
    mut multipart: Multipart,
) -> Json<serde_json::Value> {
    api.upload_hits.fetch_add(1, Ordering::SeqCst);

    let mut filename = String::new();
    let mut size = 0usize;
    let mut force_reprocess = false;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                filename = field.file_name().unwrap_or_default().to_string();
                size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            }
            Some("force_reprocess") => {
                force_reprocess = field.text().await.ok().as_deref() == Some("true");
            }
            _ => {}
        }
    }

    Json(json!({
        "filename": filename,
        "chunks_created": (size / 100).max(1),
        "skipped_processing": false,
        "used_existing_markdown": force_reprocess,
    }))
}

async fn handle_documents() -> Json<serde_json::Value> {
    Json(json!([
        {
            "source_file": "q1_report.pdf",
            "chunk_count": 42,
            "chunk_types": ["text", "table"],
            "headers": ["Overview", "Capital Management"],
            "created_dates": ["2025-02-01", "2025-03-01"]
        },
        {
            "source_file": "Q1 Highlights.md",
            "chunk_count": 7,
            "chunk_types": ["text"],
            "headers": [],
            "created_dates": []
        }
    ]))
}

async fn handle_delete(Path(filename): Path<String>) -> impl IntoResponse {
    if filename == "q1_report.pdf" || filename == "Q1 Highlights.md" {
        (
            StatusCode::OK,
            Json(json!({"message": format!("deleted {}", filename)})),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Document not found"})),
        )
    }
}

async fn handle_stats() -> Json<serde_json::Value> {
    Json(json!({
        "total_chunks": 306,
        "unique_documents": 30,
        "collection_status": "ready",
        "document_names": ["q1_report.pdf", "Q1 Highlights.md"]
    }))
}

async fn healthy_client() -> (RagClient, Arc<MockApi>) {
    let api = Arc::new(MockApi::default());
    let base = spawn(healthy_router(api.clone())).await;
    (RagClient::new(GatewayConfig::new(base)), api)
}

/// A base URL where nothing is listening.
fn unreachable_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

// ---------------------------------------------------------------
// Query
// ---------------------------------------------------------------

#[tokio::test]
async fn query_returns_consistent_result() {
    let (client, api) = healthy_client().await;

    let req = QueryRequest::new(
        "What were Scotiabank's capital ratios in Q1 2025?",
        5,
        AnswerStyle::Concise,
    )
    .unwrap();
    let resp = client.query(&req).await.unwrap();

    assert!(!resp.answer.is_empty());
    // top_k = 5 against a three-chunk corpus: fewer sources is fine.
    assert!(resp.num_sources <= 5);
    assert_eq!(resp.num_sources as usize, resp.results.len());
    assert!(resp.processing_info.counters_consistent());
    assert_eq!(api.query_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn query_remote_error_maps_to_api_error() {
    let app = Router::new().route(
        "/query",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "vector store offline"})),
            )
        }),
    );
    let base = spawn(app).await;
    let client = RagClient::new(GatewayConfig::new(base));

    let req = QueryRequest::new("anything", 3, AnswerStyle::Detailed).unwrap();
    let err = client.query(&req).await.unwrap_err();
    match err {
        GatewayError::ApiError { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "vector store offline");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn query_malformed_body_maps_to_malformed_response() {
    let app = Router::new().route("/query", post(|| async { "this is not json" }));
    let base = spawn(app).await;
    let client = RagClient::new(GatewayConfig::new(base));

    let req = QueryRequest::new("anything", 3, AnswerStyle::Concise).unwrap();
    let err = client.query(&req).await.unwrap_err();
    assert!(matches!(err, GatewayError::MalformedResponse { .. }));
}

#[tokio::test]
async fn query_deadline_maps_to_api_timeout() {
    let app = Router::new().route(
        "/query",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({}))
        }),
    );
    let base = spawn(app).await;

    let mut config = GatewayConfig::new(base);
    config.timeouts.query = Duration::from_millis(200);
    let client = RagClient::new(config);

    let req = QueryRequest::new("slow question", 3, AnswerStyle::Concise).unwrap();
    let err = client.query(&req).await.unwrap_err();
    match err {
        GatewayError::ApiTimeout {
            operation,
            timeout_ms,
        } => {
            assert_eq!(operation, "query");
            assert_eq!(timeout_ms, 200);
        }
        other => panic!("expected ApiTimeout, got {:?}", other),
    }
}

#[tokio::test]
async fn query_unreachable_maps_to_api_unavailable() {
    let client = RagClient::new(GatewayConfig::new(unreachable_base()));
    let req = QueryRequest::new("anything", 3, AnswerStyle::Concise).unwrap();
    let err = client.query(&req).await.unwrap_err();
    assert!(matches!(err, GatewayError::ApiUnavailable { .. }));
}

// ---------------------------------------------------------------
// Health
// ---------------------------------------------------------------

#[tokio::test]
async fn health_check_reports_reachable_api() {
    let (client, _) = healthy_client().await;
    assert!(client.health_check().await);
}

#[tokio::test]
async fn health_check_unreachable_is_false_not_error() {
    let client = RagClient::new(GatewayConfig::new(unreachable_base()));
    assert!(!client.health_check().await);
}

#[tokio::test]
async fn health_check_rejecting_api_is_false() {
    let app = Router::new().route(
        "/health",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
    );
    let base = spawn(app).await;
    let client = RagClient::new(GatewayConfig::new(base));
    assert!(!client.health_check().await);
}

// ---------------------------------------------------------------
// Upload
// ---------------------------------------------------------------

#[tokio::test]
async fn upload_round_trip() {
    let (client, api) = healthy_client().await;

    let receipt = client
        .upload(
            b"Q1 narrative text".repeat(50),
            "q1_notes.txt",
            "text/plain",
            false,
        )
        .await
        .unwrap();

    assert_eq!(receipt.filename.as_deref(), Some("q1_notes.txt"));
    assert!(receipt.chunks_created.unwrap() >= 1);
    assert!(!receipt.skipped_processing);
    assert_eq!(api.upload_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn oversized_upload_fails_before_any_network_call() {
    let (client, api) = {
        let api = Arc::new(MockApi::default());
        let base = spawn(healthy_router(api.clone())).await;
        let mut config = GatewayConfig::new(base);
        config.max_file_size_mb = 1;
        (RagClient::new(config), api)
    };

    let oversized = vec![0u8; 1024 * 1024 + 1];
    let err = client
        .upload(oversized, "big.pdf", "application/pdf", false)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::FileTooLarge { .. }));
    assert_eq!(api.upload_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unsupported_extension_fails_locally() {
    let (client, api) = healthy_client().await;

    let err = client
        .upload(vec![1, 2, 3], "setup.exe", "application/octet-stream", false)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::UnsupportedFileType { .. }));
    assert_eq!(api.upload_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upload_path_reads_and_sends_file() {
    let (client, _) = healthy_client().await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("highlights.md");
    std::fs::write(&path, "# Q1 Highlights\n\nNet income grew.").unwrap();

    let receipt = client.upload_path(&path, true).await.unwrap();
    assert_eq!(receipt.filename.as_deref(), Some("highlights.md"));
    // The mock echoes force_reprocess through this flag.
    assert!(receipt.used_existing_markdown);
}

#[tokio::test]
async fn upload_path_checks_size_from_metadata() {
    let api = Arc::new(MockApi::default());
    let base = spawn(healthy_router(api.clone())).await;
    let mut config = GatewayConfig::new(base);
    config.max_file_size_mb = 1;
    let client = RagClient::new(config);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.txt");
    std::fs::write(&path, vec![b'x'; 1024 * 1024 + 1]).unwrap();

    let err = client.upload_path(&path, false).await.unwrap_err();
    assert!(matches!(err, GatewayError::FileTooLarge { .. }));
    assert_eq!(api.upload_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upload_path_missing_file_is_io_error() {
    let (client, _) = healthy_client().await;
    let err = client
        .upload_path(std::path::Path::new("/nonexistent/q1.pdf"), false)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Io(_)));
}

// ---------------------------------------------------------------
// Documents
// ---------------------------------------------------------------

#[tokio::test]
async fn list_documents_is_read_stable() {
    let (client, _) = healthy_client().await;

    let first = client.list_documents().await.unwrap();
    let second = client.list_documents().await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    assert_eq!(first[0].last_updated(), Some("2025-03-01"));
}

#[tokio::test]
async fn empty_document_list_is_not_an_error() {
    let app = Router::new().route("/documents", get(|| async { Json(json!([])) }));
    let base = spawn(app).await;
    let client = RagClient::new(GatewayConfig::new(base));

    let docs = client.list_documents().await.unwrap();
    assert!(docs.is_empty());
}

#[tokio::test]
async fn delete_known_document() {
    let (client, _) = healthy_client().await;
    let receipt = client.delete_document("q1_report.pdf").await.unwrap();
    assert_eq!(receipt.message.as_deref(), Some("deleted q1_report.pdf"));
}

#[tokio::test]
async fn delete_missing_document_surfaces_api_error() {
    let (client, _) = healthy_client().await;
    let err = client.delete_document("never_uploaded.pdf").await.unwrap_err();
    match err {
        GatewayError::ApiError { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Document not found");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn delete_encodes_filenames_with_spaces() {
    let (client, _) = healthy_client().await;
    let receipt = client.delete_document("Q1 Highlights.md").await.unwrap();
    assert_eq!(receipt.message.as_deref(), Some("deleted Q1 Highlights.md"));
}

// ---------------------------------------------------------------
// Stats
// ---------------------------------------------------------------

#[tokio::test]
async fn stats_snapshot_decodes_server_spelling() {
    let (client, _) = healthy_client().await;
    let stats = client.get_stats().await.unwrap();

    assert_eq!(stats.total_chunks, 306);
    // The server reports `unique_documents`; the client reads it as
    // `total_documents`.
    assert_eq!(stats.total_documents, 30);
    assert_eq!(stats.collection_status, "ready");
    assert_eq!(stats.document_names.len(), 2);
}

// ---------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------

#[tokio::test]
async fn trailing_slash_base_url_targets_same_endpoints() {
    let api = Arc::new(MockApi::default());
    let base = spawn(healthy_router(api.clone())).await;

    let client = RagClient::new(GatewayConfig::new(format!("{}/", base)));
    assert!(client.health_check().await);

    let req = QueryRequest::new("ratio?", 2, AnswerStyle::Concise).unwrap();
    let resp = client.query(&req).await.unwrap();
    assert_eq!(resp.num_sources, 2);
}
