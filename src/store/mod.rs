//! Persistent vector storage for scraped pages.
//!
//! One backend: SQLite with vector search via `sqlite-vec`, managed through
//! `rig-sqlite`. The collection lives at a fixed on-disk path, is created on
//! first open, and is shared by every operation in the process.
//!
//! The store is intentionally single-slot: pages are upserted under the
//! constant [`DEFAULT_PAGE_ID`], so each successful scrape replaces the
//! previously stored page. See DESIGN.md for the rationale.

pub mod sqlite;

pub use sqlite::{PageDocument, RetrievedPage, SqlitePageStore, DEFAULT_PAGE_ID};
