//! The fixed handbook skeleton.
//!
//! A static ordered table of section specs; the table order is the emission
//! order and is not re-orderable per request. Target word counts are
//! advisory guidance embedded in the generation prompt, not enforced
//! lengths.

use crate::models::SectionSpec;

pub const SECTION_PLAN: &[SectionSpec] = &[
    SectionSpec {
        title: "Introduction",
        target_words: 1500,
        brief: "Comprehensive introduction with background, scope, and importance. 1500+ words.",
    },
    SectionSpec {
        title: "Historical Development",
        target_words: 2500,
        brief: "Evolution, milestones, and key developments over time. 2500+ words.",
    },
    SectionSpec {
        title: "Theoretical Foundations",
        target_words: 4000,
        brief: "Core theories, concepts, and principles in detail. 4000+ words.",
    },
    SectionSpec {
        title: "Practical Applications",
        target_words: 3000,
        brief: "Real-world uses, implementations, and examples. 3000+ words.",
    },
    SectionSpec {
        title: "Current State",
        target_words: 3000,
        brief: "Recent developments, trends, and current landscape. 3000+ words.",
    },
    SectionSpec {
        title: "Challenges",
        target_words: 2500,
        brief: "Limitations, difficulties, and open problems. 2500+ words.",
    },
    SectionSpec {
        title: "Future Directions",
        target_words: 2000,
        brief: "Predictions, trends, and where field is heading. 2000+ words.",
    },
    SectionSpec {
        title: "Case Studies",
        target_words: 2500,
        brief: "Detailed examples and demonstrations. 2500+ words.",
    },
    SectionSpec {
        title: "Conclusion",
        target_words: 1000,
        brief: "Summary and synthesis of key points. 1000+ words.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_has_nine_sections_in_fixed_order() {
        assert_eq!(SECTION_PLAN.len(), 9);
        assert_eq!(SECTION_PLAN[0].title, "Introduction");
        assert_eq!(SECTION_PLAN[8].title, "Conclusion");
    }

    #[test]
    fn briefs_carry_the_word_target() {
        for spec in SECTION_PLAN {
            assert!(spec.brief.contains(&format!("{}+", spec.target_words)));
        }
    }
}
