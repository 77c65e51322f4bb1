//! Request handlers, payload types, and the embedded UI page.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use url::Url;

use crate::embeddings::embed_document;
use crate::ingestion::{extract_paragraphs, fetch_page};
use crate::store::{DEFAULT_PAGE_ID, PageDocument};
use crate::types::RagError;

use super::AppState;

/// Fixed status literal shown after a successful scrape-and-store action.
pub const SCRAPE_SUCCESS: &str = "Page stored successfully. You can now ask questions.";

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Pipeline errors that escaped handler-level recovery, rendered as a JSON
/// error body.
pub struct ApiError(RagError);

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RagError::InvalidDocument(_) => StatusCode::BAD_REQUEST,
            RagError::Fetch { .. } | RagError::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(error = %self.0, "request failed");
        let body = Json(json!({
            "error": { "message": self.0.to_string() }
        }));
        (status, body).into_response()
    }
}

/// Serves the two-panel UI.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Liveness check with the current stored-page count.
pub async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let pages = state.store.count().await?;
    Ok(Json(json!({ "status": "ok", "pages": pages })))
}

/// Runs the full scrape chain for a URL and reports a status string.
///
/// A non-200 fetch is a recovered outcome: its message goes straight into
/// the status field and nothing is written to the store.
pub async fn scrape(
    State(state): State<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let url = Url::parse(request.url.trim())
        .map_err(|err| RagError::InvalidDocument(format!("invalid URL: {err}")))?;

    let _guard = state.ingest_lock.lock().await;

    let html = match fetch_page(&state.http, &url).await {
        Ok(html) => html,
        Err(err @ RagError::Fetch { .. }) => {
            warn!(%url, "fetch rejected: {err}");
            return Ok(Json(ScrapeResponse {
                status: err.to_string(),
            }));
        }
        Err(err) => return Err(err.into()),
    };

    let text = extract_paragraphs(&html);
    info!(%url, chars = text.len(), "extracted paragraph text");

    let embedding = embed_document(state.store.model(), &text).await?;
    let document = PageDocument::new(DEFAULT_PAGE_ID, url.as_str(), text);
    state.store.upsert_page(document, embedding).await?;

    info!(%url, "page embedded and stored");
    Ok(Json(ScrapeResponse {
        status: SCRAPE_SUCCESS.to_string(),
    }))
}

/// Answers a question over the stored page.
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let answer = state.answerer.answer(&request.question).await?;
    Ok(Json(AskResponse { answer }))
}

const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>webrag</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 2rem auto; padding: 0 1rem; }
  section { border: 1px solid #ccc; border-radius: 6px; padding: 1rem; margin-bottom: 1.5rem; }
  label { display: block; margin-top: 0.75rem; font-weight: 600; }
  input { width: 100%; padding: 0.4rem; margin-top: 0.25rem; box-sizing: border-box; }
  textarea { width: 100%; min-height: 4rem; margin-top: 0.25rem; box-sizing: border-box; }
  button { margin-top: 0.75rem; padding: 0.4rem 1rem; }
  .hint { color: #666; font-size: 0.85rem; }
</style>
</head>
<body>
<h1>URL Scraper and RAG-based Q&amp;A</h1>

<section>
  <h2>Scrape and Store</h2>
  <label for="url">Enter URL</label>
  <input id="url" type="text" placeholder="https://example.com">
  <button id="scrape">Scrape and Store</button>
  <label for="status">Status</label>
  <textarea id="status" readonly></textarea>
  <p class="hint">One page is stored at a time; scraping replaces the previously stored page.</p>
</section>

<section>
  <h2>Ask a Question</h2>
  <label for="question">Ask a Question</label>
  <input id="question" type="text" placeholder="What is this page about?">
  <button id="ask">Get Answer</button>
  <label for="answer">Answer</label>
  <textarea id="answer" readonly></textarea>
</section>

<script>
async function post(path, payload) {
  const response = await fetch(path, {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify(payload),
  });
  const body = await response.json();
  if (!response.ok) {
    throw new Error(body.error ? body.error.message : response.statusText);
  }
  return body;
}

const scrapeButton = document.getElementById("scrape");
scrapeButton.addEventListener("click", async () => {
  const status = document.getElementById("status");
  scrapeButton.disabled = true;
  status.value = "Working...";
  try {
    const result = await post("/api/scrape", { url: document.getElementById("url").value });
    status.value = result.status;
  } catch (err) {
    status.value = "Error: " + err.message;
  } finally {
    scrapeButton.disabled = false;
  }
});

const askButton = document.getElementById("ask");
askButton.addEventListener("click", async () => {
  const answer = document.getElementById("answer");
  askButton.disabled = true;
  answer.value = "Working...";
  try {
    const result = await post("/api/ask", { question: document.getElementById("question").value });
    answer.value = result.answer;
  } catch (err) {
    answer.value = "Error: " + err.message;
  } finally {
    askButton.disabled = false;
  }
});
</script>
</body>
</html>
"##;
