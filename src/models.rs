//! Core data models used throughout Handbook Forge.
//!
//! These types represent the chunks, retrieved context, section plan, and
//! assembled handbook that flow through the indexing and synthesis pipeline.

/// A fixed-size overlapping word window extracted from a document.
///
/// The unit stored in the vector index. `id` is deterministic in the
/// document ordinal and chunk sequence (`doc_{ordinal}_chunk_{index}`),
/// so ids never collide across documents.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub source: String,
    pub chunk_index: i64,
    pub text: String,
    pub hash: String,
}

/// A chunk returned by a similarity query, tagged with its origin.
///
/// Ephemeral: produced per query by the context selector, never persisted.
#[derive(Debug, Clone)]
pub struct ContextEntry {
    pub text: String,
    pub source: String,
    pub relevance_rank: usize,
}

/// One entry of the fixed handbook skeleton.
///
/// `target_words` is advisory guidance embedded in the generation prompt,
/// not an enforced length.
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    pub title: &'static str,
    pub target_words: usize,
    pub brief: &'static str,
}

/// Outcome of generating a single handbook section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    Ok,
    Failed,
}

/// A generated section, immutable once created.
///
/// Failed sections carry a placeholder body noting the error and a
/// `word_count` of zero.
#[derive(Debug, Clone)]
pub struct GeneratedSection {
    pub title: String,
    pub body: String,
    pub word_count: usize,
    pub status: GenerationStatus,
}

impl GeneratedSection {
    pub fn ok(title: &str, body: String) -> Self {
        let word_count = body.split_whitespace().count();
        Self {
            title: title.to_string(),
            body,
            word_count,
            status: GenerationStatus::Ok,
        }
    }

    pub fn failed(title: &str, error: &str) -> Self {
        Self {
            title: title.to_string(),
            body: format!("[generation failed: {}]", error),
            word_count: 0,
            status: GenerationStatus::Failed,
        }
    }
}

/// The final assembled multi-section document.
#[derive(Debug, Clone)]
pub struct Handbook {
    pub topic: String,
    pub table_of_contents: Vec<String>,
    pub sections: Vec<GeneratedSection>,
    pub references: Vec<String>,
    pub total_word_count: usize,
}

/// Per-file result of an ingestion batch.
///
/// Extraction and indexing failures are per-document; a batch reports
/// successes and failures side by side.
#[derive(Debug)]
pub enum IngestOutcome {
    Indexed {
        path: String,
        ordinal: u64,
        chunks: usize,
        characters: usize,
    },
    Failed {
        path: String,
        error: String,
    },
}
