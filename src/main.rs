//! # Handbook Forge CLI (`hbk`)
//!
//! The `hbk` binary drives the retrieval-augmented handbook pipeline:
//! database initialization, PDF ingestion, question answering, handbook
//! generation, and index maintenance.
//!
//! ## Usage
//!
//! ```bash
//! hbk --config ./config/hbk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `hbk init` | Create the SQLite database and schema |
//! | `hbk add <paths…>` | Extract, chunk, embed, and index PDFs |
//! | `hbk ask "<question>"` | Answer a question from retrieved context |
//! | `hbk generate "<topic>"` | Synthesize a full handbook on a topic |
//! | `hbk status` | Show indexed documents and chunk counts |
//! | `hbk clear` | Drop all indexed chunks and reset ids |
//!
//! Requests state their intent explicitly: `ask` answers a question,
//! `generate` synthesizes a document. There is no keyword sniffing on the
//! message text.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use handbook_forge::backend;
use handbook_forge::config;
use handbook_forge::extract::Extractor;
use handbook_forge::index::Indexer;
use handbook_forge::ingest;
use handbook_forge::models::Handbook;
use handbook_forge::output;
use handbook_forge::retrieve::select_context;
use handbook_forge::synth::Synthesizer;

/// Handbook Forge — retrieval-augmented handbook synthesis from PDF
/// source material.
#[derive(Parser)]
#[command(
    name = "hbk",
    about = "Handbook Forge — retrieval-augmented handbook synthesis from PDF source material",
    version,
    long_about = "Handbook Forge ingests PDFs into an embedded vector index and uses a \
    language-model backend to answer questions or synthesize long multi-section handbook \
    documents from the retrieved context."
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when the file
    /// does not exist.
    #[arg(long, global = true, default_value = "./config/hbk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and its tables. Idempotent —
    /// running it multiple times is safe.
    Init,

    /// Extract, chunk, embed, and index PDF documents.
    ///
    /// Accepts files and directories (directories are scanned for `.pdf`).
    /// Each document is processed independently: a file that fails to
    /// extract is reported and the rest of the batch continues.
    Add {
        /// PDF files or directories containing them.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Answer a question from the indexed documents.
    ///
    /// Retrieves the most relevant chunks and asks the model backend for
    /// an answer grounded in them.
    Ask {
        /// The question to answer.
        question: String,

        /// Number of context chunks to retrieve (overrides config).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Synthesize a full multi-section handbook on a topic.
    ///
    /// Retrieves context for the topic, generates each planned section in
    /// order (a failed section is marked and skipped, never fatal), and
    /// writes the assembled markdown under the output directory. This is a
    /// multi-minute operation: one model call per section.
    Generate {
        /// The handbook topic.
        topic: String,

        /// Number of context chunks to retrieve (overrides config).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Show indexed documents and chunk counts.
    Status,

    /// Drop all indexed chunks and reset document ids.
    ///
    /// The store is left ready to accept new adds; the next document gets
    /// ordinal 0 again.
    Clear,
}

/// Result block printed after a handbook is written. The `generate "…"`
/// header is printed once, before synthesis starts; this block only reports
/// the outcome.
fn generate_summary(handbook: &Handbook, path: &Path) -> String {
    format!(
        "  sections: {}\n  total words: {}\n  references: {}\n  written: {}\nok\n",
        handbook.sections.len(),
        handbook.total_word_count,
        handbook.references.len(),
        path.display()
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Init => {
            if cfg.store.backend == "sqlite" {
                let pool = handbook_forge::db::connect(&cfg.store.path).await?;
                handbook_forge::db::run_migrations(&pool).await?;
                pool.close().await;
            }
            println!("Database initialized successfully.");
        }
        Commands::Add { paths } => {
            let indexer = Indexer::from_config(&cfg).await?;
            let extractor = Extractor::default();
            let outcomes = ingest::ingest_paths(&cfg, &indexer, &extractor, &paths).await?;
            ingest::print_summary(&outcomes);
        }
        Commands::Ask { question, k } => {
            let indexer = Indexer::from_config(&cfg).await?;
            let k = k.unwrap_or(cfg.retrieval.answer_k);
            let context = select_context(&indexer, &question, k).await;
            let synth = Synthesizer::new(backend::create_backend(&cfg.backend)?);
            let reply = synth.answer(&question, &context).await;
            println!("{}", reply);
        }
        Commands::Generate { topic, k } => {
            let indexer = Indexer::from_config(&cfg).await?;
            let k = k.unwrap_or(cfg.retrieval.handbook_k);
            let context = select_context(&indexer, &topic, k).await;
            if context.is_empty() {
                eprintln!("warning: no context retrieved; the handbook will be generated from the topic alone");
            }

            let synth = Synthesizer::new(backend::create_backend(&cfg.backend)?);
            println!("generate \"{}\"", topic);
            println!("  context entries: {}", context.len());
            let handbook = synth.generate_handbook(&topic, &context).await;

            let path = output::save_handbook(&cfg.output.dir, &handbook)?;
            print!("{}", generate_summary(&handbook, &path));
        }
        Commands::Status => {
            let indexer = Indexer::from_config(&cfg).await?;
            let docs = indexer.list_documents().await?;
            let chunks = indexer.chunk_count().await?;
            println!("status");
            println!("  documents: {}", docs.len());
            println!("  chunks: {}", chunks);
            for doc in docs {
                println!("  doc {}: {} ({} chunks)", doc.ordinal, doc.source, doc.chunk_count);
            }
            println!("ok");
        }
        Commands::Clear => {
            let indexer = Indexer::from_config(&cfg).await?;
            indexer.clear().await?;
            println!("Index cleared.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use handbook_forge::assemble;
    use handbook_forge::models::GeneratedSection;

    #[test]
    fn generate_summary_does_not_repeat_the_header() {
        let handbook = assemble::assemble(
            "Rust",
            vec![GeneratedSection::ok("Introduction", "some body text".to_string())],
            &[],
        );
        let summary = generate_summary(&handbook, Path::new("handbooks/Rust_handbook.md"));

        assert!(!summary.contains("generate \""));
        assert!(summary.contains("sections: 1"));
        assert!(summary.contains("total words: 3"));
        assert!(summary.contains("written: handbooks/Rust_handbook.md"));
        assert!(summary.ends_with("ok\n"));
    }
}
