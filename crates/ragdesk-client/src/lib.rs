//! Gateway client for the external RAG API.
//!
//! A stateless request/response bridge: one bounded HTTP call per user
//! action, no retries, every failure mapped onto the typed error
//! taxonomy in `ragdesk-core`.

pub mod client;

pub use client::{content_type_for, RagClient, SUPPORTED_EXTENSIONS};
