//! The iterative handbook synthesizer and question answering.
//!
//! The synthesizer walks the fixed [section plan](crate::plan::SECTION_PLAN)
//! strictly forward, one backend round trip per section, sequentially — the
//! same accumulated context is reused across calls, which keeps prompt cost
//! predictable and avoids rate-limit contention at the price of total
//! latency. Sections do not retry here; bounded retry with backoff lives in
//! the backend itself.
//!
//! A failed section records a placeholder and the loop continues: a single
//! section failure never aborts the whole document. After the last section,
//! control passes to the [assembler](crate::assemble) regardless of how many
//! sections failed.

use crate::assemble;
use crate::backend::{BackendError, ModelBackend};
use crate::models::{ContextEntry, GeneratedSection, Handbook};
use crate::plan::SECTION_PLAN;

pub struct Synthesizer {
    backend: Box<dyn ModelBackend>,
}

impl Synthesizer {
    pub fn new(backend: Box<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    /// Generate a full handbook on `topic` from the selected context.
    ///
    /// Infallible by design: backend failures are recorded per section and
    /// the assembled handbook carries visible failure markers instead.
    pub async fn generate_handbook(&self, topic: &str, context: &[ContextEntry]) -> Handbook {
        // Built once, re-sent with every section prompt.
        let context_text = source_materials(context);

        let mut sections: Vec<GeneratedSection> = Vec::with_capacity(SECTION_PLAN.len());
        let mut total_words = 0usize;

        for spec in SECTION_PLAN {
            println!("generating: {}", spec.title);
            let prompt = section_prompt(spec.title, spec.brief, &context_text);

            match self.backend.complete(&prompt).await {
                Ok(body) => {
                    let section = GeneratedSection::ok(spec.title, body);
                    total_words += section.word_count;
                    println!("  ok: {} words (total: {})", section.word_count, total_words);
                    sections.push(section);
                }
                Err(e) => {
                    eprintln!("  failed: {}", e);
                    sections.push(GeneratedSection::failed(spec.title, &e.to_string()));
                }
            }
        }

        assemble::assemble(topic, sections, context)
    }

    /// Answer a question from the retrieved context.
    ///
    /// Rate-limit failures get quota guidance the user can act on; all other
    /// failures get uniform error text.
    pub async fn answer(&self, question: &str, context: &[ContextEntry]) -> String {
        if context.is_empty() {
            return "No relevant context found in the indexed documents. \
                    Add some PDFs first with `hbk add`."
                .to_string();
        }

        let prompt = answer_prompt(question, context);
        match self.backend.complete(&prompt).await {
            Ok(text) => text,
            Err(BackendError::RateLimited(details)) => format!(
                "API quota exceeded.\n\n\
                 The model backend reported a rate limit. Options:\n\
                 - Wait: free-tier quotas typically reset every 24 hours.\n\
                 - Use a different API key and retry.\n\n\
                 Error details: {}",
                details
            ),
            Err(e) => format!("Error: {}", e),
        }
    }
}

/// Concatenated context text, each chunk tagged with its source.
fn source_materials(context: &[ContextEntry]) -> String {
    if context.is_empty() {
        return "No context available.".to_string();
    }
    context
        .iter()
        .map(|entry| format!("[{}]\n{}", entry.source, entry.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn section_prompt(title: &str, brief: &str, context_text: &str) -> String {
    format!(
        "Write a detailed section for a professional handbook.\n\n\
         SECTION: {}\n\
         REQUIREMENTS: {}\n\n\
         SOURCE MATERIALS:\n{}\n\n\
         Write the complete section with proper markdown formatting. \
         Be comprehensive and detailed.",
        title, brief, context_text
    )
}

fn answer_prompt(question: &str, context: &[ContextEntry]) -> String {
    let context_text = context
        .iter()
        .map(|entry| format!("[From {}]\n{}", entry.source, entry.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Based on the following context from uploaded documents, please answer the question.\n\n\
         Context:\n{}\n\n\
         Question: {}\n\n\
         Please provide a clear, accurate answer based on the context provided. \
         If the context doesn't contain relevant information, say so.",
        context_text, question
    )
}
