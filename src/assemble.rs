//! Handbook assembly: table of contents, section bodies, references.
//!
//! Pure functions, no I/O. The reference list is deduplicated
//! order-preserving on first occurrence of each source name; the total word
//! count sums only successfully generated sections.

use crate::models::{ContextEntry, GeneratedSection, Handbook};

/// Assemble the final [`Handbook`] from generated sections and the context
/// that informed them.
pub fn assemble(topic: &str, sections: Vec<GeneratedSection>, context: &[ContextEntry]) -> Handbook {
    let table_of_contents = sections.iter().map(|s| s.title.clone()).collect();
    let references = dedup_sources(context);
    let total_word_count = sections.iter().map(|s| s.word_count).sum();

    Handbook {
        topic: topic.to_string(),
        table_of_contents,
        sections,
        references,
        total_word_count,
    }
}

/// Distinct source names, order-preserving on first occurrence.
fn dedup_sources(context: &[ContextEntry]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut sources = Vec::new();
    for entry in context {
        if seen.insert(entry.source.as_str()) {
            sources.push(entry.source.clone());
        }
    }
    sources
}

/// Render the handbook as a markdown document.
pub fn render(handbook: &Handbook) -> String {
    let mut parts = Vec::new();

    parts.push(format!("# Handbook: {}\n\n## Table of Contents\n\n", handbook.topic));
    for (i, title) in handbook.table_of_contents.iter().enumerate() {
        parts.push(format!("{}. {}\n", i + 1, title));
    }
    parts.push("\n---\n\n".to_string());

    for (i, section) in handbook.sections.iter().enumerate() {
        parts.push(format!("\n## {}. {}\n\n{}\n", i + 1, section.title, section.body));
    }

    parts.push("\n## References\n\nBased on:\n".to_string());
    for source in &handbook.references {
        parts.push(format!("- {}\n", source));
    }

    parts.concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenerationStatus;

    fn entry(source: &str) -> ContextEntry {
        ContextEntry {
            text: "text".to_string(),
            source: source.to_string(),
            relevance_rank: 0,
        }
    }

    #[test]
    fn references_deduplicated_order_preserving() {
        let context = vec![entry("a.pdf"), entry("a.pdf"), entry("b.pdf")];
        let handbook = assemble("T", vec![], &context);
        assert_eq!(handbook.references, vec!["a.pdf".to_string(), "b.pdf".to_string()]);
    }

    #[test]
    fn total_excludes_failed_sections() {
        let sections = vec![
            GeneratedSection::ok("Introduction", "one two three".to_string()),
            GeneratedSection::failed("Challenges", "boom"),
            GeneratedSection::ok("Conclusion", "four five".to_string()),
        ];
        let handbook = assemble("T", sections, &[]);
        assert_eq!(handbook.total_word_count, 5);
        assert_eq!(handbook.sections[1].status, GenerationStatus::Failed);
    }

    #[test]
    fn toc_follows_section_emission_order() {
        let sections = vec![
            GeneratedSection::ok("Introduction", "a".to_string()),
            GeneratedSection::ok("Conclusion", "b".to_string()),
        ];
        let handbook = assemble("T", sections, &[]);
        assert_eq!(handbook.table_of_contents, vec!["Introduction", "Conclusion"]);
    }

    #[test]
    fn render_numbers_headings_and_lists_references() {
        let sections = vec![
            GeneratedSection::ok("Introduction", "Body text.".to_string()),
            GeneratedSection::failed("Challenges", "backend unavailable: x"),
        ];
        let context = vec![entry("src.pdf")];
        let doc = render(&assemble("AI Safety", sections, &context));

        assert!(doc.starts_with("# Handbook: AI Safety"));
        assert!(doc.contains("1. Introduction\n"));
        assert!(doc.contains("## 1. Introduction"));
        assert!(doc.contains("## 2. Challenges"));
        assert!(doc.contains("[generation failed: backend unavailable: x]"));
        assert!(doc.contains("## References"));
        assert!(doc.contains("- src.pdf"));
    }
}
