//! Whole-document embedding via a rig embedding model.
//!
//! The production model is the Ollama provider configured in
//! [`crate::config::AppConfig`]; [`HashEmbedding`] is a deterministic
//! stand-in for offline runs and tests.

use rig::embeddings::embedding::{Embedding, EmbeddingError, EmbeddingModel};

use crate::types::RagError;

/// Embeds the full document text as a single vector.
///
/// The text is sent in one call: no chunking, no truncation, no length
/// validation. If the backing model rejects oversized input, the failure
/// surfaces as [`RagError::Embedding`] and aborts the calling action.
pub async fn embed_document<E>(model: &E, text: &str) -> Result<Vec<f32>, RagError>
where
    E: EmbeddingModel,
{
    let embedding = model
        .embed_text(text)
        .await
        .map_err(|err| RagError::Embedding(err.to_string()))?;
    Ok(embedding.vec.into_iter().map(|value| value as f32).collect())
}

/// Deterministic hash-based embedding model.
///
/// Identical inputs always produce identical vectors, so store round-trips
/// can be exercised without a running Ollama instance.
#[derive(Clone, Debug)]
pub struct HashEmbedding {
    ndims: usize,
}

impl HashEmbedding {
    pub fn new(ndims: usize) -> Self {
        Self { ndims }
    }
}

impl EmbeddingModel for HashEmbedding {
    const MAX_DOCUMENTS: usize = 64;

    type Client = ();

    fn make(_client: &Self::Client, _model: impl Into<String>, dims: Option<usize>) -> Self {
        Self::new(dims.unwrap_or(0))
    }

    fn ndims(&self) -> usize {
        self.ndims
    }

    fn embed_texts(
        &self,
        texts: impl IntoIterator<Item = String> + Send,
    ) -> impl std::future::Future<Output = Result<Vec<Embedding>, EmbeddingError>> + Send {
        let ndims = self.ndims;
        let docs: Vec<String> = texts.into_iter().collect();
        async move {
            Ok(docs
                .into_iter()
                .map(|document| Embedding {
                    vec: hash_to_vec(&document, ndims),
                    document,
                })
                .collect())
        }
    }
}

fn hash_to_vec(text: &str, ndims: usize) -> Vec<f64> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let seed = hasher.finish();
    (0..ndims)
        .map(|i| {
            let bits = seed.rotate_left((i as u32 * 8) % 64) ^ ((i as u64) << 24);
            (bits as f64) / u32::MAX as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embedding_is_deterministic() {
        let model = HashEmbedding::new(8);
        let first = embed_document(&model, "hello world").await.unwrap();
        let second = embed_document(&model, "hello world").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 8);
    }

    #[tokio::test]
    async fn different_texts_embed_differently() {
        let model = HashEmbedding::new(8);
        let first = embed_document(&model, "hello world").await.unwrap();
        let second = embed_document(&model, "goodbye world").await.unwrap();
        assert_ne!(first, second);
    }
}
