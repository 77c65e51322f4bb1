//! HTTP server exposing the two-panel UI and its JSON API.
//!
//! Routes:
//! - `GET /` — the embedded scrape/ask page
//! - `POST /api/scrape` — fetch → extract → embed → store, status string back
//! - `POST /api/ask` — retrieval-augmented answer for a question
//! - `GET /health` — liveness plus stored-page count
//!
//! The process owns a single store handle, opened here at startup and shared
//! through [`AppState`]. Scrapes (the only mutation) are serialized behind a
//! mutex; queries read without it.

pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use rig::client::EmbeddingsClient;
use rig::providers::ollama;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::answer::Answerer;
use crate::config::AppConfig;
use crate::ingestion;
use crate::store::SqlitePageStore;
use crate::types::RagError;

/// Store type used by the running service.
pub type PageStore = SqlitePageStore<ollama::EmbeddingModel<reqwest::Client>>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub store: Arc<PageStore>,
    pub answerer: Arc<Answerer<ollama::EmbeddingModel<reqwest::Client>>>,
    /// Single-writer discipline for the single-slot store.
    pub ingest_lock: Arc<Mutex<()>>,
}

/// Builds the router with all routes bound to `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/api/scrape", post(routes::scrape))
        .route("/api/ask", post(routes::ask))
        .with_state(state)
}

/// Opens the store, wires up the pipeline, and serves until shutdown.
pub async fn start_server(config: AppConfig) -> Result<(), RagError> {
    let addr = config.socket_addr()?;
    let http = ingestion::http_client()?;

    let ollama = ollama::Client::new();
    let embedder =
        ollama.embedding_model_with_ndims(&config.embedding_model, config.embedding_dims);
    let store = Arc::new(SqlitePageStore::open(&config.db_path, &embedder).await?);
    let answerer = Arc::new(Answerer::new(
        store.clone(),
        ollama,
        config.chat_model.clone(),
        config.top_k,
    ));

    let state = AppState {
        http,
        store,
        answerer,
        ingest_lock: Arc::new(Mutex::new(())),
    };
    let router = build_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        db = %config.db_path.display(),
        embedding_model = %config.embedding_model,
        chat_model = %config.chat_model,
        "serving webrag UI"
    );
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
