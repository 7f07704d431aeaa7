//! Prompt templates for document-aware chat

use crate::retrieval::SelectedDocument;
use crate::types::Message;

/// Heading that introduces quoted document excerpts
pub const DOCUMENTS_HEADING: &str = "DOCUMENT EXCERPTS:";
/// Heading that introduces the conversation so far
pub const HISTORY_HEADING: &str = "CONVERSATION SO FAR:";

/// Prompt builder for chat turns
pub struct PromptBuilder;

impl PromptBuilder {
    /// Format history as `"User: ..."` / `"Assistant: ..."` blocks separated by blank lines
    pub fn format_history(messages: &[Message]) -> String {
        messages
            .iter()
            .map(|m| format!("{}: {}", m.role.label(), m.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Quote each selected document under a numbered source header
    pub fn build_context(documents: &[SelectedDocument]) -> String {
        documents
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                format!(
                    "[{}] {}\n{}",
                    i + 1,
                    doc.citation.document_title,
                    doc.excerpt
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }

    /// Prompt grounded in document excerpts
    pub fn build_document_prompt(
        question: &str,
        documents: &[SelectedDocument],
        history: &str,
    ) -> String {
        format!(
            r#"You are a helpful assistant answering questions about the user's uploaded documents.

RULES:
1. Base your answer on the document excerpts below
2. Cite the documents you use by name, e.g. [Source: notes.pdf]
3. If the excerpts do not contain enough information to answer, say so plainly instead of guessing

{documents_heading}
{context}
{history_section}
QUESTION: {question}

Answer:"#,
            documents_heading = DOCUMENTS_HEADING,
            context = Self::build_context(documents),
            history_section = Self::history_section(history),
            question = question
        )
    }

    /// Prompt used when no document matched the question
    pub fn build_history_prompt(question: &str, history: &str) -> String {
        format!(
            r#"You are a helpful assistant. None of the user's uploaded documents matched this question, so answer from general knowledge and the conversation so far.
If a precise answer would depend on specific material, suggest that the user upload the relevant documents.
{history_section}
QUESTION: {question}

Answer:"#,
            history_section = Self::history_section(history),
            question = question
        )
    }

    fn history_section(history: &str) -> String {
        if history.is_empty() {
            String::new()
        } else {
            format!("\n{}\n{}\n", HISTORY_HEADING, history)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceCitation;
    use uuid::Uuid;

    fn selected(title: &str, excerpt: &str) -> SelectedDocument {
        SelectedDocument {
            citation: SourceCitation {
                document_id: Uuid::new_v4(),
                document_title: title.to_string(),
                page: None,
                relevance_score: 1.0,
            },
            excerpt: excerpt.to_string(),
        }
    }

    #[test]
    fn test_format_history() {
        let conversation = Uuid::new_v4();
        let history = vec![
            Message::user(conversation, "What is ATP?", Vec::new()),
            Message::assistant(conversation, "An energy carrier.", Vec::new(), false),
        ];
        assert_eq!(
            PromptBuilder::format_history(&history),
            "User: What is ATP?\n\nAssistant: An energy carrier."
        );
        assert_eq!(PromptBuilder::format_history(&[]), "");
    }

    #[test]
    fn test_document_prompt_contents() {
        let docs = vec![selected("biology.txt", "Photosynthesis converts light.")];
        let prompt = PromptBuilder::build_document_prompt(
            "what is photosynthesis",
            &docs,
            "User: hi\n\nAssistant: hello",
        );

        assert!(prompt.contains(DOCUMENTS_HEADING));
        assert!(prompt.contains("[1] biology.txt\nPhotosynthesis converts light."));
        assert!(prompt.contains(HISTORY_HEADING));
        assert!(prompt.contains("User: hi\n\nAssistant: hello"));
        assert!(prompt.contains("QUESTION: what is photosynthesis"));
        assert!(prompt.contains("Cite"));
        assert!(prompt.contains("not contain enough information"));
    }

    #[test]
    fn test_history_prompt_omits_documents() {
        let prompt = PromptBuilder::build_history_prompt("tell me a joke", "");
        assert!(!prompt.contains(DOCUMENTS_HEADING));
        assert!(!prompt.contains(HISTORY_HEADING));
        assert!(prompt.contains("upload"));
        assert!(prompt.contains("QUESTION: tell me a joke"));
    }

    #[test]
    fn test_context_numbering() {
        let docs = vec![selected("a.txt", "alpha"), selected("b.txt", "beta")];
        assert_eq!(
            PromptBuilder::build_context(&docs),
            "[1] a.txt\nalpha\n\n---\n\n[2] b.txt\nbeta"
        );
    }
}
