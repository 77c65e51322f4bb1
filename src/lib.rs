//! ```text
//! URL ──► ingestion::fetch ──► ingestion::extract ──► embeddings ──┐
//!                                                                  ▼
//!                                               store::SqlitePageStore
//!                                                                  │
//! Question ──► answer::Answerer ──► store query ──► chat reply ◄───┘
//! ```
//!
//! webrag is a small retrieval-augmented Q&A service over a single scraped
//! web page. The [`server`] module exposes the pipeline through a two-panel
//! web UI: one panel fetches a URL, extracts its paragraph text, embeds it,
//! and persists it; the other answers free-text questions by retrieving the
//! stored content and forwarding it as context to a chat model.

pub mod answer;
pub mod config;
pub mod embeddings;
pub mod ingestion;
pub mod server;
pub mod store;
pub mod types;

pub use types::RagError;
