//! # Handbook Forge
//!
//! A retrieval-augmented handbook synthesis pipeline: PDFs are chunked and
//! embedded into a vector store, and a language-model backend answers
//! questions or synthesizes long multi-section "handbook" documents from
//! retrieved context.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌───────────┐
//! │   PDFs   │──▶│ Extract+Chunk │──▶│  SQLite   │
//! │          │   │   + Embed     │   │  vectors  │
//! └──────────┘   └───────────────┘   └─────┬─────┘
//!                                          │
//!                              topic ──▶ select context
//!                                          │
//!                                ┌─────────▼─────────┐
//!                                │ section-by-section │
//!                                │    synthesizer     │
//!                                └─────────┬─────────┘
//!                                          ▼
//!                                  assembled handbook
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! hbk init                          # create database
//! hbk add paper.pdf notes/          # extract, chunk, embed, index
//! hbk ask "what is the main claim?" # answer from retrieved context
//! hbk generate "AI Safety"          # synthesize a full handbook
//! hbk clear                         # drop the index
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`models`] | Core data types |
//! | [`extract`] | PDF text extraction with strategy fallback |
//! | [`chunk`] | Overlapping word-window chunking |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`store`] | Vector store trait + in-memory backend |
//! | [`db`] | SQLite vector store |
//! | [`index`] | Indexer: chunk store lifecycle owner |
//! | [`retrieve`] | Context selection (dedup + rank) |
//! | [`plan`] | Fixed handbook section plan |
//! | [`backend`] | Model backend abstraction (Gemini) |
//! | [`synth`] | Iterative section synthesizer + QA |
//! | [`assemble`] | Handbook assembly and rendering |
//! | [`output`] | Filename derivation and persistence |
//! | [`ingest`] | Batch ingestion pipeline |

pub mod assemble;
pub mod backend;
pub mod chunk;
pub mod config;
pub mod db;
pub mod embedding;
pub mod extract;
pub mod index;
pub mod ingest;
pub mod models;
pub mod output;
pub mod plan;
pub mod retrieve;
pub mod store;
pub mod synth;
