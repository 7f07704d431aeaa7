//! Keyword relevance selector
//!
//! Binary inclusion only: a document is relevant when its content contains
//! any question keyword as a case-insensitive substring. There is no ranking,
//! every match scores 1.0.

use crate::config::PipelineLimits;
use crate::types::{Document, SourceCitation};

/// Score assigned to every selected document
pub const MATCH_SCORE: f32 = 1.0;

/// A document chosen as prompt context
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedDocument {
    /// Citation reported with the assistant reply
    pub citation: SourceCitation,
    /// Leading slice of the document content quoted into the prompt
    pub excerpt: String,
}

/// Keyword-overlap document selector
#[derive(Debug, Clone)]
pub struct RelevanceSelector {
    scan_limit: usize,
    excerpt_chars: usize,
    min_keyword_len: usize,
}

impl RelevanceSelector {
    pub fn new(scan_limit: usize, excerpt_chars: usize, min_keyword_len: usize) -> Self {
        Self {
            scan_limit,
            excerpt_chars,
            min_keyword_len,
        }
    }

    pub fn from_limits(limits: &PipelineLimits) -> Self {
        Self::new(
            limits.document_scan_limit,
            limits.context_truncation_chars,
            limits.min_keyword_len,
        )
    }

    /// Documents the caller should fetch before selecting
    pub fn scan_limit(&self) -> usize {
        self.scan_limit
    }

    /// Lower-cased whitespace tokens longer than the minimum keyword length
    pub fn keywords(&self, question: &str) -> Vec<String> {
        question
            .split_whitespace()
            .map(str::to_lowercase)
            .filter(|token| token.chars().count() > self.min_keyword_len)
            .collect()
    }

    /// Select relevant documents.
    ///
    /// `documents` must be ordered most recently updated first; only the
    /// first `scan_limit` documents with content are considered.
    pub fn select(&self, question: &str, documents: &[Document]) -> Vec<SelectedDocument> {
        let keywords = self.keywords(question);
        if keywords.is_empty() {
            return Vec::new();
        }

        documents
            .iter()
            .filter_map(|doc| doc.content.as_deref().map(|content| (doc, content)))
            .take(self.scan_limit)
            .filter(|(_, content)| {
                let haystack = content.to_lowercase();
                keywords.iter().any(|keyword| haystack.contains(keyword.as_str()))
            })
            .map(|(doc, content)| SelectedDocument {
                citation: SourceCitation {
                    document_id: doc.id,
                    document_title: doc.filename.clone(),
                    page: None,
                    relevance_score: MATCH_SCORE,
                },
                excerpt: truncate_chars(content, self.excerpt_chars).to_string(),
            })
            .collect()
    }
}

/// Leading `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn selector() -> RelevanceSelector {
        RelevanceSelector::from_limits(&PipelineLimits::default())
    }

    fn doc(name: &str, content: &str) -> Document {
        let mut doc = Document::new(Uuid::new_v4(), name, "text/plain", content.len() as u64, name);
        doc.content = Some(content.to_string());
        doc
    }

    #[test]
    fn test_keywords_filter_short_tokens() {
        assert_eq!(
            selector().keywords("What is PHOTOSYNTHESIS and how"),
            vec!["what", "photosynthesis"]
        );
        assert!(selector().keywords("is it a cat?").is_empty());
    }

    #[test]
    fn test_selects_matching_document() {
        let docs = vec![
            doc("biology.txt", "Photosynthesis converts light into chemical energy."),
            doc("recipes.txt", "Mix flour and water."),
        ];

        let selected = selector().select("what is photosynthesis", &docs);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].citation.document_id, docs[0].id);
        assert_eq!(selected[0].citation.document_title, "biology.txt");
        assert_eq!(selected[0].citation.relevance_score, 1.0);
        assert_eq!(selected[0].citation.page, None);
    }

    #[test]
    fn test_substring_match_keeps_punctuation() {
        let docs = vec![doc("a.txt", "it rains in spain")];
        // the token keeps its trailing '?', so it does not occur in the content
        assert!(selector().select("spain?", &docs).is_empty());
        assert_eq!(selector().select("rains", &docs).len(), 1);
        // substring, not whole word
        assert_eq!(selector().select("rain!", &[doc("b.txt", "rain!!")]).len(), 1);
    }

    #[test]
    fn test_no_keywords_selects_nothing() {
        let docs = vec![doc("a.txt", "the cat sat")];
        assert!(selector().select("the cat", &docs).is_empty());
        assert!(selector().select("", &docs).is_empty());
    }

    #[test]
    fn test_scan_limit_applies_before_filtering() {
        let mut docs: Vec<_> = (0..5).map(|i| doc(&format!("{}.txt", i), "nothing here")).collect();
        docs.push(doc("old.txt", "photosynthesis"));
        assert!(selector().select("photosynthesis", &docs).is_empty());

        let narrow = RelevanceSelector::new(6, 1000, 3);
        assert_eq!(narrow.select("photosynthesis", &docs).len(), 1);
    }

    #[test]
    fn test_unprocessed_documents_skipped() {
        let mut pending = doc("pending.txt", "");
        pending.content = None;
        let docs = vec![pending, doc("ready.txt", "photosynthesis")];
        let selected = selector().select("photosynthesis", &docs);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].citation.document_title, "ready.txt");
    }

    #[test]
    fn test_excerpt_truncated_positionally() {
        let long = format!("keyword {}", "x".repeat(2000));
        let selected = selector().select("keyword", &[doc("long.txt", &long)]);
        assert_eq!(selected[0].excerpt.chars().count(), 1000);
        assert!(long.starts_with(&selected[0].excerpt));
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("héllo", 10), "héllo");
        assert_eq!(truncate_chars("", 3), "");
    }

    mod proptest_relevance {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn selection_matches_keyword_containment(
                question in "[a-zA-Z ]{0,60}",
                content in "[a-zA-Z ]{0,200}",
            ) {
                let selector = selector();
                let document = doc("p.txt", &content);
                let selected = selector.select(&question, std::slice::from_ref(&document));

                let lowered = content.to_lowercase();
                let expected = question
                    .split_whitespace()
                    .filter(|t| t.chars().count() > 3)
                    .any(|t| lowered.contains(&t.to_lowercase()));
                prop_assert_eq!(!selected.is_empty(), expected);
            }
        }
    }
}
