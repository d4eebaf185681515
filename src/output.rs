//! Handbook persistence and the filename derivation contract.
//!
//! The filename rule is bit-exact and worth preserving: strip characters
//! that are not alphanumeric, space, hyphen, or underscore; trim; convert
//! spaces to underscores; truncate to 50 characters; suffix `_handbook.md`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::Handbook;

/// Derive the output filename (without directory) for a topic.
///
/// `"AI Safety: 2024!"` → `"AI_Safety_2024_handbook.md"`.
pub fn derive_filename(topic: &str) -> String {
    let safe: String = topic
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe = safe.trim().replace(' ', "_");
    let truncated: String = safe.chars().take(50).collect();
    format!("{}_handbook.md", truncated)
}

/// Render and write a handbook under `dir`, creating the directory if
/// needed. Returns the written path.
pub fn save_handbook(dir: &Path, handbook: &Handbook) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let path = dir.join(derive_filename(&handbook.topic));
    let rendered = crate::assemble::render(handbook);
    std::fs::write(&path, rendered)
        .with_context(|| format!("Failed to write handbook: {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeneratedSection;

    #[test]
    fn strips_punctuation_and_underscores_spaces() {
        assert_eq!(derive_filename("AI Safety: 2024!"), "AI_Safety_2024_handbook.md");
    }

    #[test]
    fn keeps_hyphen_and_underscore() {
        assert_eq!(derive_filename("pre-trained_models"), "pre-trained_models_handbook.md");
    }

    #[test]
    fn truncates_to_fifty_chars_before_suffix() {
        let topic = "x".repeat(80);
        let name = derive_filename(&topic);
        assert_eq!(name, format!("{}_handbook.md", "x".repeat(50)));
    }

    #[test]
    fn consecutive_spaces_become_consecutive_underscores() {
        assert_eq!(derive_filename("a  b"), "a__b_handbook.md");
    }

    #[test]
    fn save_writes_rendered_markdown() {
        let tmp = tempfile::TempDir::new().unwrap();
        let handbook = crate::assemble::assemble(
            "Test Topic",
            vec![GeneratedSection::ok("Introduction", "Hello.".to_string())],
            &[],
        );
        let path = save_handbook(tmp.path(), &handbook).unwrap();
        assert!(path.ends_with("Test_Topic_handbook.md"));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("# Handbook: Test Topic"));
    }
}
