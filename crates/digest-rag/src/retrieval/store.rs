//! In-memory document store with embedding similarity search

use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::document::fill_default_metadata;
use crate::types::{Fragment, Metadata, SearchResult};

#[derive(Debug, Clone)]
struct StoredFragment {
    fragment: Fragment,
    embedding: Vec<f32>,
}

/// Fragments and their embeddings, shared by every request
///
/// Readers clone the current snapshot and score without holding the lock;
/// writers embed first and only lock for the append.
pub struct DocumentStore {
    embedder: Arc<dyn EmbeddingProvider>,
    fragments: RwLock<Arc<Vec<StoredFragment>>>,
}

impl DocumentStore {
    /// Create an empty store
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            fragments: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Embed and append texts, returning how many fragments were added
    ///
    /// `metadata[i]` belongs to `texts[i]`. Every fragment carries `part`,
    /// `content_hash` and `ingested_at`, filled in when the caller omits them.
    pub async fn add_documents(&self, texts: Vec<String>, metadata: Vec<Metadata>) -> Result<usize> {
        if texts.is_empty() {
            return Ok(0);
        }

        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(Error::embedding(format!(
                "{} returned {} embeddings for {} texts",
                self.embedder.name(),
                embeddings.len(),
                texts.len()
            )));
        }

        let dimensions = embeddings[0].len();
        if dimensions == 0 || embeddings.iter().any(|e| e.len() != dimensions) {
            return Err(Error::embedding("inconsistent embedding dimensions in batch"));
        }

        let mut metadata = metadata.into_iter();
        let mut guard = self.fragments.write();
        if let Some(existing) = guard.first() {
            check_dimensions(existing.embedding.len(), dimensions)?;
        }

        let fragments = Arc::make_mut(&mut guard);
        let added = texts.len();
        for (part, (text, embedding)) in texts.into_iter().zip(embeddings).enumerate() {
            let sequence = fragments.len() as u64;
            let mut meta = metadata.next().unwrap_or_default();
            fill_default_metadata(&mut meta, part, &text);
            fragments.push(StoredFragment {
                fragment: Fragment::new(text, meta, sequence),
                embedding,
            });
        }

        tracing::info!("Stored {} fragments ({} total)", added, fragments.len());
        Ok(added)
    }

    /// Return the `k` fragments most similar to `question`
    ///
    /// Results are ordered by descending cosine similarity; equal scores keep
    /// insertion order.
    pub async fn query(&self, question: &str, k: usize) -> Result<Vec<SearchResult>> {
        let snapshot = Arc::clone(&self.fragments.read());
        if k == 0 || snapshot.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(question).await?;
        check_dimensions(snapshot[0].embedding.len(), query_embedding.len())?;

        let mut scored: Vec<(f32, &StoredFragment)> = snapshot
            .iter()
            .map(|stored| (cosine_similarity(&query_embedding, &stored.embedding), stored))
            .collect();

        // Stable sort keeps insertion order for ties
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(k);

        tracing::debug!(
            "Query matched {} of {} fragments (best {:.3})",
            scored.len(),
            snapshot.len(),
            scored.first().map(|(s, _)| *s).unwrap_or(0.0)
        );

        Ok(scored
            .into_iter()
            .map(|(similarity, stored)| SearchResult {
                fragment: stored.fragment.clone(),
                similarity,
            })
            .collect())
    }

    /// Drop every fragment, returning how many were removed
    pub fn reset(&self) -> usize {
        let mut guard = self.fragments.write();
        let removed = guard.len();
        *guard = Arc::new(Vec::new());
        tracing::info!("Document store reset ({} fragments removed)", removed);
        removed
    }

    /// Number of stored fragments
    pub fn len(&self) -> usize {
        self.fragments.read().len()
    }

    /// Whether the store holds no fragments
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_dimensions(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::embedding(format!(
            "embedding dimension mismatch: store has {}, got {}",
            expected, actual
        )));
    }
    Ok(())
}

/// Cosine similarity, 0.0 when either vector has zero norm
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = (norm_a * norm_b).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}
