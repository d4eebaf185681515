//! Context selection policy over the indexer.
//!
//! A thin layer between raw similarity hits and the synthesizer: the vector
//! store may return near-duplicate chunks (overlapping windows share words,
//! and re-added documents duplicate content), so the selector deduplicates
//! by (source, text) before truncating to `k`. Deduplication is a policy the
//! pipeline enforces here, not something assumed of the store.

use std::collections::HashSet;

use crate::index::Indexer;
use crate::models::ContextEntry;

/// Select up to `k` ranked, deduplicated context entries for a query/topic.
///
/// Over-fetches `2k` candidates so duplicate hits cannot shrink the result
/// below `k` when distinct entries exist, then dedups preserving rank order
/// and assigns `relevance_rank` from 0.
pub async fn select_context(indexer: &Indexer, query: &str, k: usize) -> Vec<ContextEntry> {
    let candidates = indexer.query(query, k.saturating_mul(2)).await;

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut entries = Vec::new();
    for hit in candidates {
        let key = (hit.source.clone(), hit.text.clone());
        if !seen.insert(key) {
            continue;
        }
        entries.push(ContextEntry {
            text: hit.text,
            source: hit.source,
            relevance_rank: entries.len(),
        });
        if entries.len() == k {
            break;
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingProvider;
    use crate::store::MemoryStore;

    async fn indexer_with(texts: &[(&str, &str)]) -> Indexer {
        let indexer = Indexer::new(Box::new(MemoryStore::new()), Box::<HashingProvider>::default())
            .await
            .unwrap();
        for (source, text) in texts {
            indexer.add(&[text.to_string()], source).await.unwrap();
        }
        indexer
    }

    #[tokio::test]
    async fn dedups_identical_source_text_pairs() {
        // the same document added twice produces duplicate (source, text) hits
        let indexer = indexer_with(&[
            ("a.pdf", "neural retrieval systems"),
            ("a.pdf", "neural retrieval systems"),
            ("b.pdf", "symbolic reasoning engines"),
        ])
        .await;

        let entries = select_context(&indexer, "neural retrieval systems", 3).await;
        let pairs: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e.source.as_str(), e.text.as_str()))
            .collect();
        let unique: HashSet<_> = pairs.iter().collect();
        assert_eq!(pairs.len(), unique.len());
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn ranks_are_contiguous_from_zero() {
        let indexer = indexer_with(&[
            ("a.pdf", "alpha topic text"),
            ("b.pdf", "beta topic text"),
            ("c.pdf", "gamma topic text"),
        ])
        .await;

        let entries = select_context(&indexer, "topic text", 3).await;
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.relevance_rank, i);
        }
    }

    #[tokio::test]
    async fn truncates_to_k() {
        let indexer = indexer_with(&[
            ("a.pdf", "one shared subject"),
            ("b.pdf", "two shared subject"),
            ("c.pdf", "three shared subject"),
        ])
        .await;

        let entries = select_context(&indexer, "shared subject", 2).await;
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn empty_index_yields_no_entries() {
        let indexer = Indexer::new(Box::new(MemoryStore::new()), Box::<HashingProvider>::default())
            .await
            .unwrap();
        assert!(select_context(&indexer, "anything", 5).await.is_empty());
    }
}
