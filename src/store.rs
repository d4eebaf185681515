//! Storage abstraction for the chunk index.
//!
//! The [`VectorStore`] trait defines the operations the indexing and
//! retrieval pipeline needs, enabling pluggable backends (SQLite,
//! in-memory). Implementations must be `Send + Sync` to work with async
//! runtimes.
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`add_document`](VectorStore::add_document) | Store one document's chunks and vectors |
//! | [`query`](VectorStore::query) | Rank chunks by cosine similarity to a query vector |
//! | [`clear`](VectorStore::clear) | Drop all documents and chunks |
//! | [`document_count`](VectorStore::document_count) | Number of indexed documents |
//! | [`chunk_count`](VectorStore::chunk_count) | Number of indexed chunks |
//! | [`list_documents`](VectorStore::list_documents) | Indexed document records, ordinal order |

use std::sync::RwLock;

use anyhow::{ensure, Result};
use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::models::Chunk;

/// A chunk ranked by similarity to a query vector.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub text: String,
    pub source: String,
    pub chunk_index: i64,
    /// Cosine similarity; larger is more relevant.
    pub score: f64,
}

/// Metadata for one indexed document.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub ordinal: u64,
    pub source: String,
    pub chunk_count: u64,
    pub created_at: i64,
}

/// Abstract chunk storage backend.
///
/// The store only ranks pre-computed vectors; embedding happens above it in
/// the [`Indexer`](crate::index::Indexer).
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store one document's chunks with their embedding vectors.
    ///
    /// `chunks` and `vectors` must be the same length. Write failures
    /// propagate: a partially indexed document is a data-integrity problem
    /// the caller must see.
    async fn add_document(
        &self,
        ordinal: u64,
        source: &str,
        chunks: &[Chunk],
        vectors: &[Vec<f32>],
    ) -> Result<()>;

    /// Return up to `k` chunks ranked by decreasing cosine similarity.
    ///
    /// A store holding fewer than `k` chunks returns all of them; an empty
    /// store returns an empty vec, never an error.
    async fn query(&self, query_vec: &[f32], k: usize) -> Result<Vec<ScoredChunk>>;

    /// Drop all documents and chunks, leaving the store ready for new adds.
    async fn clear(&self) -> Result<()>;

    /// Number of documents indexed so far (the next free ordinal).
    async fn document_count(&self) -> Result<u64>;

    /// Number of chunks indexed so far.
    async fn chunk_count(&self) -> Result<u64>;

    /// Indexed document records in ordinal order.
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>>;
}

struct StoredChunk {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// In-memory [`VectorStore`] for tests and the `memory` store backend.
///
/// RwLock-guarded rows; vector search is brute-force cosine similarity over
/// all stored vectors. Contents do not survive the process.
pub struct MemoryStore {
    docs: RwLock<Vec<DocumentRecord>>,
    chunks: RwLock<Vec<StoredChunk>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
            chunks: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn add_document(
        &self,
        ordinal: u64,
        source: &str,
        chunks: &[Chunk],
        vectors: &[Vec<f32>],
    ) -> Result<()> {
        ensure!(
            chunks.len() == vectors.len(),
            "chunk/vector count mismatch: {} chunks, {} vectors",
            chunks.len(),
            vectors.len()
        );

        let mut stored = self.chunks.write().unwrap();
        for (chunk, vector) in chunks.iter().zip(vectors.iter()) {
            stored.push(StoredChunk {
                chunk: chunk.clone(),
                vector: vector.clone(),
            });
        }

        self.docs.write().unwrap().push(DocumentRecord {
            ordinal,
            source: source.to_string(),
            chunk_count: chunks.len() as u64,
            created_at: chrono::Utc::now().timestamp(),
        });
        Ok(())
    }

    async fn query(&self, query_vec: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let stored = self.chunks.read().unwrap();
        let mut scored: Vec<ScoredChunk> = stored
            .iter()
            .map(|sc| ScoredChunk {
                text: sc.chunk.text.clone(),
                source: sc.chunk.source.clone(),
                chunk_index: sc.chunk.chunk_index,
                score: cosine_similarity(query_vec, &sc.vector) as f64,
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    async fn clear(&self) -> Result<()> {
        self.docs.write().unwrap().clear();
        self.chunks.write().unwrap().clear();
        Ok(())
    }

    async fn document_count(&self) -> Result<u64> {
        Ok(self.docs.read().unwrap().len() as u64)
    }

    async fn chunk_count(&self) -> Result<u64> {
        Ok(self.chunks.read().unwrap().len() as u64)
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        let mut docs = self.docs.read().unwrap().clone();
        docs.sort_by_key(|d| d.ordinal);
        Ok(docs)
    }
}
