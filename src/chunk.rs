//! Overlapping word-window text chunker.
//!
//! Splits extracted document text into fixed-size windows of *words*, not
//! characters, so a chunk boundary never splits a word. Consecutive windows
//! from the same document overlap by `overlap` words, which keeps retrieval
//! context intact across chunk boundaries.
//!
//! # Algorithm
//!
//! 1. Split text on whitespace into a word sequence.
//! 2. Starting at word 0, take a window of `chunk_size` words.
//! 3. Advance the window start by `chunk_size - overlap` words.
//! 4. Stop after the window that reaches the final word — a remainder
//!    shorter than `overlap` belongs to that window, never to a degenerate
//!    extra chunk fully contained in its predecessor.
//!
//! # Guarantees
//!
//! - `overlap >= chunk_size` (or `chunk_size == 0`) is rejected with
//!   [`ChunkError::InvalidConfig`] before any work — the advance step would
//!   otherwise be non-positive and the loop would never terminate.
//! - Input with fewer than `chunk_size` words yields exactly one chunk
//!   containing the whole text.
//! - For W words with size C and overlap O, the chunk count is
//!   `ceil((W - O) / (C - O))`.
//! - The last O words of chunk `i` equal the first O words of chunk `i + 1`
//!   (except for the final chunk, which has no successor).

use thiserror::Error;

/// Chunking configuration error, caught before any indexing work begins.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("invalid chunking config: overlap ({overlap}) must be < chunk_size ({chunk_size}), chunk_size must be > 0")]
    InvalidConfig { chunk_size: usize, overlap: usize },
}

/// Split text into overlapping windows of `chunk_size` words.
///
/// Each returned chunk is the window's words joined by single spaces, so
/// chunk text is whitespace-normalized relative to the input. Empty or
/// whitespace-only input yields an empty vec.
pub fn chunk_words(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>, ChunkError> {
    if chunk_size == 0 || overlap >= chunk_size {
        return Err(ChunkError::InvalidConfig {
            chunk_size,
            overlap,
        });
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Vec::new());
    }

    let stride = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += stride;
    }

    Ok(chunks)
}
