use rig::OneOrMany;
use rig::embeddings::{Embedding, EmbeddingModel};
use rig_sqlite::{Column, ColumnValue, SqliteVectorStore, SqliteVectorStoreTable};
use serde::{Deserialize, Serialize};
use std::mem::transmute;
use std::os::raw::c_char;
use std::path::Path;
use std::sync::Once;
use tokio_rusqlite::{Connection, ffi};

use crate::types::RagError;

/// Identifier every scraped page is stored under. Constant by design: the
/// store holds one meaningfully addressable page at a time, and each new
/// scrape replaces it.
pub const DEFAULT_PAGE_ID: &str = "1";

/// A scraped page as persisted in the `pages` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageDocument {
    pub id: String,
    pub url: String,
    pub content: String,
}

impl PageDocument {
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            content: content.into(),
        }
    }
}

impl SqliteVectorStoreTable for PageDocument {
    fn name() -> &'static str {
        "pages"
    }

    fn schema() -> Vec<Column> {
        vec![
            Column::new("id", "TEXT PRIMARY KEY"),
            Column::new("url", "TEXT").indexed(),
            Column::new("content", "TEXT"),
        ]
    }

    fn id(&self) -> String {
        self.id.clone()
    }

    fn column_values(&self) -> Vec<(&'static str, Box<dyn ColumnValue>)> {
        vec![
            ("id", Box::new(self.id.clone())),
            ("url", Box::new(self.url.clone())),
            ("content", Box::new(self.content.clone())),
        ]
    }
}

/// A query hit: the stored page plus its cosine similarity to the question.
#[derive(Clone, Debug)]
pub struct RetrievedPage {
    pub page: PageDocument,
    pub similarity: f32,
}

/// SQLite-backed page store with vector search.
///
/// Holds its embedding model so [`query`](Self::query) can embed raw
/// question text internally; callers never hand it a vector for retrieval.
#[derive(Clone)]
pub struct SqlitePageStore<E>
where
    E: EmbeddingModel + 'static,
{
    inner: SqliteVectorStore<E, PageDocument>,
    /// Separate connection handle for direct queries not covered by
    /// rig-sqlite. This is a clone of the connection used by the inner store.
    conn: Connection,
    model: E,
}

impl<E> SqlitePageStore<E>
where
    E: EmbeddingModel + Clone + Send + Sync + 'static,
{
    /// Opens (or creates) the store at `path`.
    ///
    /// Registers the sqlite-vec extension process-wide on first use and
    /// verifies it is loadable before handing the connection to rig-sqlite.
    /// Idempotent across calls and processes.
    pub async fn open(path: impl AsRef<Path>, model: &E) -> Result<Self, RagError> {
        Self::register_sqlite_vec()?;
        let conn = Connection::open(path)
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;
        conn.call(|conn| {
            let result = conn.query_row("select vec_version()", [], |row| row.get::<_, String>(0));
            match result {
                Ok(_) => Ok(()),
                Err(err) => Err(tokio_rusqlite::Error::Rusqlite(err)),
            }
        })
        .await
        .map_err(|err| RagError::Storage(err.to_string()))?;
        // Clone connection for direct access before moving into store
        let conn_for_queries = conn.clone();
        let store = SqliteVectorStore::new(conn, model)
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;
        Ok(Self {
            inner: store,
            conn: conn_for_queries,
            model: model.clone(),
        })
    }

    /// The embedding model this store was opened with.
    pub fn model(&self) -> &E {
        &self.model
    }

    /// Replaces whatever record currently occupies the document's id with
    /// the given page/vector pair.
    ///
    /// The stale row and its rowid-aligned embedding are removed in one
    /// transaction before the insert, so a repeated scrape never accumulates
    /// orphaned vectors.
    pub async fn upsert_page(
        &self,
        document: PageDocument,
        embedding: Vec<f32>,
    ) -> Result<(), RagError> {
        let id = document.id.clone();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "DELETE FROM pages_embeddings WHERE rowid IN \
                     (SELECT rowid FROM pages WHERE id = ?)",
                    [&id],
                )?;
                tx.execute("DELETE FROM pages WHERE id = ?", [&id])?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;

        let converted: Vec<f64> = embedding.into_iter().map(f64::from).collect();
        let embed = Embedding {
            document: document.content.clone(),
            vec: converted,
        };
        self.inner
            .add_rows(vec![(document, OneOrMany::one(embed))])
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;
        Ok(())
    }

    /// Returns up to `top_k` pages ranked by similarity to `question`.
    ///
    /// The question is embedded here, with the store's own model; an empty
    /// collection yields an empty result, not an error.
    pub async fn query(
        &self,
        question: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedPage>, RagError> {
        let embedding = self
            .model
            .embed_text(question)
            .await
            .map_err(|err| RagError::Embedding(err.to_string()))?;
        let query_vec: Vec<f32> = embedding.vec.into_iter().map(|value| value as f32).collect();
        let embedding_json = serde_json::to_string(&query_vec)
            .map_err(|err| RagError::Storage(err.to_string()))?;

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT p.id, p.url, p.content, \
                     vec_distance_cosine(e.embedding, vec_f32(?)) AS distance \
                     FROM pages p \
                     JOIN pages_embeddings e ON e.rowid = p.rowid \
                     ORDER BY distance ASC \
                     LIMIT {top_k}"
                ))?;

                let rows = stmt.query_map([&embedding_json], |row| {
                    let page = PageDocument {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        content: row.get(2)?,
                    };
                    let distance: f32 = row.get(3)?;
                    // Convert distance to similarity (1 - distance for cosine)
                    Ok(RetrievedPage {
                        page,
                        similarity: 1.0 - distance,
                    })
                })?;

                let mut results = Vec::new();
                for row in rows {
                    results.push(row?);
                }
                Ok(results)
            })
            .await
            .map_err(|err| RagError::Storage(err.to_string()))
    }

    /// Number of pages currently stored.
    pub async fn count(&self) -> Result<usize, RagError> {
        self.conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(|err| RagError::Storage(err.to_string()))
    }

    fn register_sqlite_vec() -> Result<(), RagError> {
        use std::sync::Mutex;

        static INIT: Once = Once::new();
        static INIT_RESULT: Mutex<Option<Result<(), String>>> = Mutex::new(None);

        INIT.call_once(|| {
            let result = unsafe {
                type SqliteExtensionInit = unsafe extern "C" fn(
                    *mut ffi::sqlite3,
                    *mut *mut c_char,
                    *const ffi::sqlite3_api_routines,
                ) -> i32;

                let init: unsafe extern "C" fn() = sqlite_vec::sqlite3_vec_init;
                let init_fn: SqliteExtensionInit =
                    transmute::<unsafe extern "C" fn(), SqliteExtensionInit>(init);
                let rc = ffi::sqlite3_auto_extension(Some(init_fn));
                if rc != 0 {
                    Err(format!(
                        "failed to register sqlite-vec extension (code {rc})"
                    ))
                } else {
                    Ok(())
                }
            };
            *INIT_RESULT.lock().expect("init result mutex poisoned") = Some(result);
        });

        INIT_RESULT
            .lock()
            .expect("init result mutex poisoned")
            .clone()
            .expect("init was called but result not set")
            .map_err(RagError::Storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{HashEmbedding, embed_document};
    use tempfile::tempdir;

    async fn open_test_store(dir: &tempfile::TempDir) -> SqlitePageStore<HashEmbedding> {
        let model = HashEmbedding::new(8);
        SqlitePageStore::open(dir.path().join("pages.sqlite3"), &model)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn fresh_store_is_empty() {
        let dir = tempdir().unwrap();
        let store = open_test_store(&dir).await;
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.query("anything", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stored_page_is_retrievable_by_question() {
        let dir = tempdir().unwrap();
        let store = open_test_store(&dir).await;

        let text = "Example text about gardening.";
        let vector = embed_document(store.model(), text).await.unwrap();
        let document = PageDocument::new(DEFAULT_PAGE_ID, "http://example.com", text);
        store.upsert_page(document, vector).await.unwrap();

        let hits = store.query("What is this page about?", 3).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].page.content, text);
        assert_eq!(hits[0].page.id, DEFAULT_PAGE_ID);
    }

    #[tokio::test]
    async fn second_upsert_replaces_the_single_slot() {
        let dir = tempdir().unwrap();
        let store = open_test_store(&dir).await;

        let first = "Content from page A.";
        let vector = embed_document(store.model(), first).await.unwrap();
        store
            .upsert_page(
                PageDocument::new(DEFAULT_PAGE_ID, "http://a.example", first),
                vector,
            )
            .await
            .unwrap();

        let second = "Content from page B.";
        let vector = embed_document(store.model(), second).await.unwrap();
        store
            .upsert_page(
                PageDocument::new(DEFAULT_PAGE_ID, "http://b.example", second),
                vector,
            )
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let hits = store.query("page content", 3).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].page.content, second);
        assert_eq!(hits[0].page.url, "http://b.example");
    }

    #[tokio::test]
    async fn reopen_sees_persisted_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pages.sqlite3");
        let model = HashEmbedding::new(8);

        {
            let store = SqlitePageStore::open(&path, &model).await.unwrap();
            let text = "Persistent content.";
            let vector = embed_document(&model, text).await.unwrap();
            store
                .upsert_page(
                    PageDocument::new(DEFAULT_PAGE_ID, "http://example.com", text),
                    vector,
                )
                .await
                .unwrap();
        }

        let reopened = SqlitePageStore::open(&path, &model).await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
        let hits = reopened.query("persistent", 3).await.unwrap();
        assert_eq!(hits[0].page.content, "Persistent content.");
    }
}
