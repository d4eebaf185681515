//! SQLite-backed [`VectorStore`] and schema migrations.
//!
//! Chunks persist with their embedding vectors as little-endian f32 BLOBs
//! (see [`crate::embedding::vec_to_blob`]). Similarity queries load the
//! candidate vectors and rank by cosine in Rust — the corpus for a handbook
//! run is small enough that brute force beats carrying a vector extension.

use std::path::Path;
use std::str::FromStr;

use anyhow::{ensure, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use crate::models::Chunk;
use crate::store::{DocumentRecord, ScoredChunk, VectorStore};

/// Open (creating if missing) the SQLite database at `path`.
pub async fn connect(path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create the schema. Idempotent; safe to run on every startup.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            ordinal INTEGER PRIMARY KEY,
            source TEXT NOT NULL,
            chunk_count INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            document_ordinal INTEGER NOT NULL,
            source TEXT NOT NULL,
            chunk_index INTEGER NOT NULL,
            text TEXT NOT NULL,
            hash TEXT NOT NULL,
            embedding BLOB NOT NULL,
            dims INTEGER NOT NULL,
            UNIQUE(document_ordinal, chunk_index),
            FOREIGN KEY (document_ordinal) REFERENCES documents(ordinal)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_ordinal)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Persistent [`VectorStore`] over a SQLite pool.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect, migrate, and wrap the database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = connect(path).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
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

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO documents (ordinal, source, chunk_count, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(ordinal as i64)
        .bind(source)
        .bind(chunks.len() as i64)
        .bind(chrono::Utc::now().timestamp())
        .execute(&mut *tx)
        .await?;

        for (chunk, vector) in chunks.iter().zip(vectors.iter()) {
            sqlx::query(
                r#"
                INSERT INTO chunks (id, document_ordinal, source, chunk_index, text, hash, embedding, dims)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&chunk.id)
            .bind(ordinal as i64)
            .bind(&chunk.source)
            .bind(chunk.chunk_index)
            .bind(&chunk.text)
            .bind(&chunk.hash)
            .bind(vec_to_blob(vector))
            .bind(vector.len() as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn query(&self, query_vec: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let rows = sqlx::query("SELECT text, source, chunk_index, embedding FROM chunks")
            .fetch_all(&self.pool)
            .await?;

        let mut scored: Vec<ScoredChunk> = rows
            .into_iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let vector = blob_to_vec(&blob);
                ScoredChunk {
                    text: row.get("text"),
                    source: row.get("source"),
                    chunk_index: row.get("chunk_index"),
                    score: cosine_similarity(query_vec, &vector) as f64,
                }
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    async fn clear(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM chunks").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM documents").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn document_count(&self) -> Result<u64> {
        // MAX + 1 rather than COUNT so the next ordinal stays collision-free
        // even if rows were removed out of band.
        let next: Option<i64> = sqlx::query_scalar("SELECT MAX(ordinal) + 1 FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(next.unwrap_or(0) as u64)
    }

    async fn chunk_count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        let rows = sqlx::query(
            "SELECT ordinal, source, chunk_count, created_at FROM documents ORDER BY ordinal",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DocumentRecord {
                ordinal: row.get::<i64, _>("ordinal") as u64,
                source: row.get("source"),
                chunk_count: row.get::<i64, _>("chunk_count") as u64,
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
