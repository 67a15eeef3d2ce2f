//! Intermediate artifacts produced by the generation pipeline.
//!
//! Each stage consumes the previous stage's artifact exactly once.
//! Validation helpers here enforce the structural invariants the
//! pipeline relies on: exactly three search terms, three positionally
//! aligned enrichment slots, and a complete draft.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of search terms extracted from a summary, and of enrichment
/// slots returned for them.
pub const SEARCH_TERM_COUNT: usize = 3;

/// Output of the transcript-summarization stage.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SummaryArtifact {
    pub summary: String,
}

impl SummaryArtifact {
    pub fn is_empty(&self) -> bool {
        self.summary.trim().is_empty()
    }
}

/// The three web-search terms derived from a summary.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchTermSet {
    pub search_terms: Vec<String>,
}

impl SearchTermSet {
    /// Whether the set satisfies the exactly-three, all-non-empty invariant.
    pub fn is_valid(&self) -> bool {
        self.search_terms.len() == SEARCH_TERM_COUNT
            && self.search_terms.iter().all(|t| !t.trim().is_empty())
    }
}

/// Web enrichment for a [`SearchTermSet`].
///
/// Slots correspond to the term set by position: `term1` enriches the
/// first term, and so on. Key names carry no meaning beyond ordering.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchEnrichment {
    pub term1: String,
    pub term2: String,
    pub term3: String,
}

impl SearchEnrichment {
    /// Slots in positional order.
    pub fn slots(&self) -> [&str; SEARCH_TERM_COUNT] {
        [&self.term1, &self.term2, &self.term3]
    }

    /// Whether all three slots carry content.
    pub fn is_complete(&self) -> bool {
        self.slots().iter().all(|s| !s.trim().is_empty())
    }
}

/// The composed blog post, prior to persistence.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
}

impl BlogDraft {
    /// A draft is usable only when both fields are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }
}

/// Raw output of the image-generation branch.
///
/// `data` is the transport-encoded payload (base64, with or without a
/// data-URI prefix). Decoding and upload happen after the join point;
/// an absent or undecodable artifact is a normal outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageArtifact {
    /// Transport-encoded image bytes.
    pub data: String,
    /// MIME type reported by the model, when present.
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_set_requires_exactly_three() {
        let two = SearchTermSet {
            search_terms: vec!["a".into(), "b".into()],
        };
        assert!(!two.is_valid());

        let four = SearchTermSet {
            search_terms: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        };
        assert!(!four.is_valid());

        let three = SearchTermSet {
            search_terms: vec!["a".into(), "b".into(), "c".into()],
        };
        assert!(three.is_valid());
    }

    #[test]
    fn test_term_set_rejects_blank_entries() {
        let set = SearchTermSet {
            search_terms: vec!["a".into(), "  ".into(), "c".into()],
        };
        assert!(!set.is_valid());
    }

    #[test]
    fn test_enrichment_completeness() {
        let full = SearchEnrichment {
            term1: "x".into(),
            term2: "y".into(),
            term3: "z".into(),
        };
        assert!(full.is_complete());
        assert_eq!(full.slots(), ["x", "y", "z"]);

        let hole = SearchEnrichment {
            term1: "x".into(),
            term2: String::new(),
            term3: "z".into(),
        };
        assert!(!hole.is_complete());
    }

    #[test]
    fn test_draft_completeness() {
        let ok = BlogDraft {
            title: "A title".into(),
            content: "Body".into(),
        };
        assert!(ok.is_complete());

        let no_title = BlogDraft {
            title: " ".into(),
            content: "Body".into(),
        };
        assert!(!no_title.is_complete());

        let no_content = BlogDraft {
            title: "A title".into(),
            content: String::new(),
        };
        assert!(!no_content.is_complete());
    }
}
