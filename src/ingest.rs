//! Batch ingestion: extract → chunk → index.
//!
//! Takes explicit file paths (directories are expanded to the `.pdf` files
//! they contain) and processes each document independently. Extraction and
//! indexing failures are per-document and reported alongside successes —
//! partial-batch success is expected and normal for multi-file uploads.

use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

use crate::chunk::chunk_words;
use crate::config::Config;
use crate::extract::Extractor;
use crate::index::Indexer;
use crate::models::IngestOutcome;

/// Expand the given paths: files pass through, directories yield their
/// `.pdf` files (recursively, sorted for stable ordering).
pub fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| {
                    p.extension()
                        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                        .unwrap_or(false)
                })
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    files
}

/// Ingest a batch of documents into the index.
///
/// Every per-document failure — extraction, chunking, and indexing alike —
/// is captured in the returned outcomes; one bad document never aborts the
/// rest of the batch.
pub async fn ingest_paths(
    config: &Config,
    indexer: &Indexer,
    extractor: &Extractor,
    paths: &[PathBuf],
) -> Result<Vec<IngestOutcome>> {
    let files = expand_paths(paths);
    let mut outcomes = Vec::with_capacity(files.len());

    for path in &files {
        match ingest_one(config, indexer, extractor, path).await {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => outcomes.push(IngestOutcome::Failed {
                path: path.display().to_string(),
                error: e.to_string(),
            }),
        }
    }

    Ok(outcomes)
}

async fn ingest_one(
    config: &Config,
    indexer: &Indexer,
    extractor: &Extractor,
    path: &Path,
) -> Result<IngestOutcome> {
    let text = match extractor.extract_file(path) {
        Ok(text) => text,
        Err(e) => {
            return Ok(IngestOutcome::Failed {
                path: path.display().to_string(),
                error: e.to_string(),
            })
        }
    };

    let chunks = chunk_words(&text, config.chunking.chunk_size, config.chunking.overlap)?;
    let source = source_name(path);
    let ordinal = indexer.add(&chunks, &source).await?;

    Ok(IngestOutcome::Indexed {
        path: path.display().to_string(),
        ordinal,
        chunks: chunks.len(),
        characters: text.chars().count(),
    })
}

/// Documents are tagged by file name, not full path.
fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print the user-facing batch summary.
pub fn print_summary(outcomes: &[IngestOutcome]) {
    let mut indexed = 0usize;
    let mut failed = 0usize;
    let mut total_chunks = 0usize;

    for outcome in outcomes {
        match outcome {
            IngestOutcome::Indexed {
                path,
                ordinal,
                chunks,
                characters,
            } => {
                indexed += 1;
                total_chunks += chunks;
                println!(
                    "  ok: {} (doc {}, {} chunks, {} characters)",
                    path, ordinal, chunks, characters
                );
            }
            IngestOutcome::Failed { path, error } => {
                failed += 1;
                println!("  failed: {} ({})", path, error);
            }
        }
    }

    println!("add");
    println!("  indexed: {} documents", indexed);
    println!("  chunks written: {}", total_chunks);
    if failed > 0 {
        println!("  failed: {} documents", failed);
    }
    println!("ok");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingProvider;
    use crate::store::MemoryStore;

    #[test]
    fn expand_keeps_explicit_files_and_finds_pdfs_in_dirs() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.pdf"), b"x").unwrap();
        std::fs::write(tmp.path().join("b.PDF"), b"x").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), b"x").unwrap();
        let explicit = tmp.path().join("notes.txt");

        let files = expand_paths(&[tmp.path().to_path_buf(), explicit.clone()]);
        assert_eq!(files.len(), 3);
        assert!(files.contains(&explicit));
        assert!(files.iter().any(|p| p.ends_with("a.pdf")));
        assert!(files.iter().any(|p| p.ends_with("b.PDF")));
    }

    #[tokio::test]
    async fn bad_file_does_not_abort_batch() {
        let tmp = tempfile::TempDir::new().unwrap();
        let bad = tmp.path().join("broken.pdf");
        std::fs::write(&bad, b"definitely not a pdf").unwrap();
        let missing = tmp.path().join("missing.pdf");

        let config = Config::default();
        let indexer = Indexer::new(Box::new(MemoryStore::new()), Box::<HashingProvider>::default())
            .await
            .unwrap();
        let extractor = Extractor::default();

        let outcomes = ingest_paths(&config, &indexer, &extractor, &[bad, missing])
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, IngestOutcome::Failed { .. })));
    }

    #[tokio::test]
    async fn chunking_error_is_reported_per_file() {
        use crate::extract::{ExtractError, ExtractStrategy};

        struct FixedTextStrategy;
        impl ExtractStrategy for FixedTextStrategy {
            fn name(&self) -> &'static str {
                "fixed"
            }
            fn extract(&self, _bytes: &[u8]) -> Result<String, ExtractError> {
                Ok("some extracted words".to_string())
            }
        }

        let tmp = tempfile::TempDir::new().unwrap();
        let doc = tmp.path().join("doc.pdf");
        std::fs::write(&doc, b"stub").unwrap();

        let mut config = Config::default();
        config.chunking.overlap = config.chunking.chunk_size;

        let indexer = Indexer::new(Box::new(MemoryStore::new()), Box::<HashingProvider>::default())
            .await
            .unwrap();
        let extractor = Extractor::new(vec![Box::new(FixedTextStrategy)]);

        let outcomes = ingest_paths(&config, &indexer, &extractor, &[doc])
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            &outcomes[0],
            IngestOutcome::Failed { error, .. } if error.contains("overlap")
        ));
    }

    #[test]
    fn source_name_is_basename() {
        assert_eq!(source_name(Path::new("/tmp/deep/paper.pdf")), "paper.pdf");
    }
}
