//! Plain-terminal rendering for answers, documents, stats and receipts.

use std::time::Duration;

use ragdesk_core::{DocumentRecord, QueryResponse, StatsSnapshot, UploadReceipt};

const PREVIEW_CHARS: usize = 200;

/// Normalize a markdown-ish answer for terminal output: drop `**` bold
/// markers, turn `*`/`-` bullets into indented dashes, collapse blank
/// runs.
pub fn format_answer(answer: &str) -> String {
    let text = answer.replace("**", "");
    let mut lines: Vec<String> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            if lines.last().map(|l| !l.is_empty()).unwrap_or(false) {
                lines.push(String::new());
            }
        } else if let Some(item) = line.strip_prefix('*').or_else(|| line.strip_prefix('-')) {
            lines.push(format!("  - {}", item.trim()));
        } else {
            lines.push(line.to_string());
        }
    }

    while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
        lines.pop();
    }
    lines.join("\n")
}

pub fn render_query(resp: &QueryResponse) -> String {
    let mut out = String::new();
    out.push_str("Answer:\n");
    out.push_str(&format_answer(&resp.answer));
    out.push_str("\n\n");
    out.push_str(&format!("Sources used:       {}\n", resp.num_sources));
    if let Some(variations) = resp.processing_info.query_variations {
        out.push_str(&format!("Query variations:   {}\n", variations));
    }
    if let Some(method) = &resp.processing_info.fusion_method {
        out.push_str(&format!("Fusion method:      {}\n", method));
    }
    if let Some(timestamp) = &resp.timestamp {
        out.push_str(&format!("Answered at:        {}\n", timestamp));
    }

    if !resp.results.is_empty() {
        out.push_str("\nSources:\n");
        for (i, source) in resp.results.iter().enumerate() {
            out.push_str(&format!("  {}. {}", i + 1, source.metadata.source_file));
            if let Some(header) = &source.metadata.header {
                out.push_str(&format!("  [{}]", header));
            }
            if let Some(kind) = &source.metadata.chunk_type {
                out.push_str(&format!("  ({})", kind));
            }
            out.push_str(&format!("  score {:.3}\n", source.score));
            out.push_str(&format!("     {}\n", preview(&source.content)));
        }
    }
    out
}

pub fn render_documents(documents: &[DocumentRecord]) -> String {
    if documents.is_empty() {
        return "No documents found in database".to_string();
    }

    let mut out = format!("Documents ({}):\n", documents.len());
    for doc in documents {
        out.push_str(&format!("  {}\n", doc.source_file));
        let types = if doc.chunk_types.is_empty() {
            "-".to_string()
        } else {
            doc.chunk_types.join(", ")
        };
        out.push_str(&format!(
            "    chunks: {}  types: {}  sections: {}  last updated: {}\n",
            doc.chunk_count,
            types,
            doc.headers.len(),
            doc.last_updated().unwrap_or("unknown"),
        ));
    }
    out
}

pub fn render_stats(stats: &StatsSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total chunks:       {}\n", stats.total_chunks));
    out.push_str(&format!("Total documents:    {}\n", stats.total_documents));
    out.push_str(&format!("Collection status:  {}\n", stats.collection_status));

    if !stats.document_names.is_empty() {
        out.push_str("\nProcessed documents:\n");
        for (i, name) in stats.document_names.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, name));
        }
    }
    out
}

pub fn render_receipt(receipt: &UploadReceipt, elapsed: Duration) -> String {
    let mut out = String::new();
    out.push_str("Document processed successfully.\n");
    if let Some(name) = &receipt.filename {
        out.push_str(&format!("File:               {}\n", name));
    }
    if let Some(chunks) = receipt.chunks_created {
        out.push_str(&format!("Chunks created:     {}\n", chunks));
    }
    out.push_str(&format!(
        "Processing time:    {:.1}s\n",
        elapsed.as_secs_f64()
    ));
    out.push_str(&format!(
        "Status:             {}\n",
        if receipt.skipped_processing {
            "skipped"
        } else {
            "processed"
        }
    ));
    if receipt.used_existing_markdown {
        out.push_str("Used existing markdown file (faster processing).\n");
    }
    if receipt.skipped_processing {
        out.push_str("Document already exists in database (processing skipped).\n");
    }
    if let Some(message) = &receipt.message {
        out.push_str(&format!("{}\n", message));
    }
    out
}

fn preview(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        flat
    } else {
        let mut cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        cut.push_str("...");
        cut
    }
}
