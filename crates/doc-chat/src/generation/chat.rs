//! Chat orchestration: history, context selection, completion, persistence

use std::sync::Arc;
use uuid::Uuid;

use crate::config::PipelineLimits;
use crate::error::{Error, Result};
use crate::providers::{CompletionProvider, GenerationParams, RecordStore};
use crate::retrieval::RelevanceSelector;
use crate::types::{ChatRequest, ChatResponse, ChatResponseMetadata, Conversation, Message};

use super::prompt::PromptBuilder;

/// Runs one chat turn end to end
pub struct ChatOrchestrator {
    records: Arc<dyn RecordStore>,
    llm: Arc<dyn CompletionProvider>,
    selector: RelevanceSelector,
    params: GenerationParams,
    history_limit: usize,
    title_chars: usize,
}

impl ChatOrchestrator {
    pub fn new(
        records: Arc<dyn RecordStore>,
        llm: Arc<dyn CompletionProvider>,
        limits: &PipelineLimits,
        params: GenerationParams,
    ) -> Self {
        Self {
            records,
            llm,
            selector: RelevanceSelector::from_limits(limits),
            params,
            history_limit: limits.history_limit,
            title_chars: limits.conversation_title_chars,
        }
    }

    /// Answer `request` on behalf of `user_id`.
    ///
    /// The user turn is persisted before the completion call, so a backend
    /// failure leaves the question recorded without an answer.
    pub async fn respond(&self, user_id: Uuid, request: ChatRequest) -> Result<ChatResponse> {
        let message = request.message.as_str();
        if message.trim().is_empty() {
            return Err(Error::validation("Message must not be empty"));
        }

        let conversation = self
            .resolve_conversation(user_id, request.conversation_id, message)
            .await?;

        // read before appending so the new turn is not duplicated in the prompt
        let history = self
            .records
            .recent_messages(conversation.id, self.history_limit)
            .await?;
        let history = PromptBuilder::format_history(&history);

        self.records
            .append_message(&Message::user(conversation.id, message, request.files))
            .await?;

        let documents = self
            .records
            .list_processed_documents(user_id, self.selector.scan_limit())
            .await?;
        let selected = self.selector.select(message, &documents);
        let has_document_context = !selected.is_empty();

        tracing::info!(
            "Chat turn in {}: {} of {} documents selected",
            conversation.id,
            selected.len(),
            documents.len()
        );

        let prompt = if has_document_context {
            PromptBuilder::build_document_prompt(message, &selected, &history)
        } else {
            PromptBuilder::build_history_prompt(message, &history)
        };

        let answer = self.llm.complete(&prompt, &self.params).await?;

        let sources: Vec<_> = selected.into_iter().map(|s| s.citation).collect();
        self.records
            .append_message(&Message::assistant(
                conversation.id,
                answer.clone(),
                sources.clone(),
                has_document_context,
            ))
            .await?;

        Ok(ChatResponse {
            response: answer,
            metadata: ChatResponseMetadata {
                sources,
                has_document_context,
                conversation_id: conversation.id,
            },
        })
    }

    async fn resolve_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Option<Uuid>,
        first_message: &str,
    ) -> Result<Conversation> {
        if let Some(id) = conversation_id {
            return self
                .records
                .get_conversation(user_id, id)
                .await?
                .ok_or_else(|| Error::not_found("Conversation", id));
        }

        let conversation = Conversation::from_first_message(user_id, first_message, self.title_chars);
        self.records.create_conversation(&conversation).await?;
        tracing::info!("Created conversation {} for user {}", conversation.id, user_id);
        Ok(conversation)
    }
}
