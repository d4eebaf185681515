//! The indexer: owner of the chunk-to-vector-store lifecycle.
//!
//! An [`Indexer`] is an explicit instance holding its own store handle,
//! embedding provider, and document ordinal counter — constructed once at
//! process start and passed by reference to all callers; there is no ambient
//! global state. The counter seeds from the store at construction so ids
//! stay collision-free across process restarts, resets to zero on
//! [`clear`](Indexer::clear), and is mutex-guarded across the whole of
//! [`add`](Indexer::add) so concurrent adds serialize instead of minting
//! the same ordinal.
//!
//! Failure semantics:
//! - `add` failures propagate — a partially indexed document is a
//!   data-integrity problem the caller must see.
//! - `query` failures degrade to an empty result with a stderr warning — a
//!   query with no context is valid, just unhelpful.

use anyhow::Result;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::embedding::{embed_query, EmbeddingProvider};
use crate::models::Chunk;
use crate::store::{DocumentRecord, ScoredChunk, VectorStore};

/// Default embedding request batch size; see `embedding.batch_size`.
const DEFAULT_EMBED_BATCH: usize = 64;

pub struct Indexer {
    store: Box<dyn VectorStore>,
    provider: Box<dyn EmbeddingProvider>,
    doc_counter: Mutex<u64>,
    embed_batch: usize,
}

impl Indexer {
    /// Build the configured store and embedding provider and wrap them.
    pub async fn from_config(config: &crate::config::Config) -> Result<Self> {
        let store: Box<dyn VectorStore> = match config.store.backend.as_str() {
            "memory" => Box::new(crate::store::MemoryStore::new()),
            _ => Box::new(crate::db::SqliteStore::open(&config.store.path).await?),
        };
        let provider = crate::embedding::create_provider(&config.embedding)?;
        Ok(Self::new(store, provider)
            .await?
            .with_embed_batch(config.embedding.batch_size))
    }

    /// Wrap a store and embedding provider, seeding the document counter
    /// from what the store already holds.
    pub async fn new(
        store: Box<dyn VectorStore>,
        provider: Box<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let next_ordinal = store.document_count().await?;
        Ok(Self {
            store,
            provider,
            doc_counter: Mutex::new(next_ordinal),
            embed_batch: DEFAULT_EMBED_BATCH,
        })
    }

    /// Override the embedding request batch size (`embedding.batch_size`).
    pub fn with_embed_batch(mut self, batch_size: usize) -> Self {
        self.embed_batch = batch_size.max(1);
        self
    }

    /// Index one document's chunk texts under `source`.
    ///
    /// Assigns the next document ordinal and chunk ids of the form
    /// `doc_{ordinal}_chunk_{i}`. Concurrent adds serialize on the counter
    /// lock, which is held across the embed and store awaits. Re-adding the
    /// same source takes a fresh ordinal — replace semantics require an
    /// explicit [`clear`](Self::clear) first. Returns the assigned ordinal.
    pub async fn add(&self, chunk_texts: &[String], source: &str) -> Result<u64> {
        let mut counter = self.doc_counter.lock().await;
        let ordinal = *counter;

        let chunks: Vec<Chunk> = chunk_texts
            .iter()
            .enumerate()
            .map(|(i, text)| Chunk {
                id: format!("doc_{}_chunk_{}", ordinal, i),
                source: source.to_string(),
                chunk_index: i as i64,
                text: text.clone(),
                hash: content_hash(text),
            })
            .collect();

        let mut vectors = Vec::with_capacity(chunk_texts.len());
        for batch in chunk_texts.chunks(self.embed_batch) {
            vectors.extend(self.provider.embed(batch).await?);
        }

        self.store
            .add_document(ordinal, source, &chunks, &vectors)
            .await?;

        // Only a fully stored document advances the counter.
        *counter = ordinal + 1;
        Ok(ordinal)
    }

    /// Return up to `k` chunks ranked by decreasing similarity to `text`.
    ///
    /// Embedding or store failures are recovered locally as an empty result.
    pub async fn query(&self, text: &str, k: usize) -> Vec<ScoredChunk> {
        let query_vec = match embed_query(self.provider.as_ref(), text).await {
            Ok(v) => v,
            Err(e) => {
                eprintln!("warning: query embedding failed, returning no context: {}", e);
                return Vec::new();
            }
        };

        match self.store.query(&query_vec, k).await {
            Ok(hits) => hits,
            Err(e) => {
                eprintln!("warning: retrieval failed, returning no context: {}", e);
                Vec::new()
            }
        }
    }

    /// Drop all indexed chunks and reset the document counter to zero.
    pub async fn clear(&self) -> Result<()> {
        let mut counter = self.doc_counter.lock().await;
        self.store.clear().await?;
        *counter = 0;
        Ok(())
    }

    pub async fn chunk_count(&self) -> Result<u64> {
        self.store.chunk_count().await
    }

    pub async fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        self.store.list_documents().await
    }

    /// The ordinal the next `add` will be assigned.
    pub async fn next_ordinal(&self) -> u64 {
        *self.doc_counter.lock().await
    }
}

/// SHA-256 content hash, hex-encoded. Stored per chunk so a future
/// re-embedding pass can detect stale vectors.
fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
