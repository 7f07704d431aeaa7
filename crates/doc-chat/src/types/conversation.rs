//! Conversation and message records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chat thread owned by one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Start a conversation titled after its first message
    pub fn from_first_message(user_id: Uuid, message: &str, title_chars: usize) -> Self {
        let now = Utc::now();
        let trimmed = message.trim();
        let mut title: String = trimmed.chars().take(title_chars).collect();
        if trimmed.chars().count() > title_chars {
            title.push_str("...");
        }
        if title.is_empty() {
            title = "New conversation".to_string();
        }

        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Author of a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Database / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Label used in prompt history
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }

    /// Parse the database representation
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// File attached to a user turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttachedFile {
    /// Document the file was stored as, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Document cited by an assistant turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceCitation {
    pub document_id: Uuid,
    pub document_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub relevance_score: f32,
}

/// Role-specific message metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum MessageMetadata {
    User {
        #[serde(default)]
        files: Vec<AttachedFile>,
    },
    Assistant {
        #[serde(default)]
        sources: Vec<SourceCitation>,
        #[serde(default)]
        has_document_context: bool,
    },
}

impl MessageMetadata {
    /// Role implied by the metadata variant
    pub fn role(&self) -> MessageRole {
        match self {
            Self::User { .. } => MessageRole::User,
            Self::Assistant { .. } => MessageRole::Assistant,
        }
    }
}

/// One turn of a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub metadata: MessageMetadata,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// User turn with its attached files
    pub fn user(conversation_id: Uuid, content: impl Into<String>, files: Vec<AttachedFile>) -> Self {
        Self::with_metadata(conversation_id, content, MessageMetadata::User { files })
    }

    /// Assistant turn with the documents it drew on
    pub fn assistant(
        conversation_id: Uuid,
        content: impl Into<String>,
        sources: Vec<SourceCitation>,
        has_document_context: bool,
    ) -> Self {
        Self::with_metadata(
            conversation_id,
            content,
            MessageMetadata::Assistant {
                sources,
                has_document_context,
            },
        )
    }

    fn with_metadata(
        conversation_id: Uuid,
        content: impl Into<String>,
        metadata: MessageMetadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            role: metadata.role(),
            content: content.into(),
            metadata,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_truncation() {
        let user = Uuid::new_v4();
        let long = "a".repeat(80);
        let conv = Conversation::from_first_message(user, &long, 50);
        assert_eq!(conv.title, format!("{}...", "a".repeat(50)));

        let conv = Conversation::from_first_message(user, "  hi  ", 50);
        assert_eq!(conv.title, "hi");
    }

    #[test]
    fn test_role_follows_metadata() {
        let conv = Uuid::new_v4();
        assert_eq!(Message::user(conv, "q", vec![]).role, MessageRole::User);
        assert_eq!(
            Message::assistant(conv, "a", vec![], false).role,
            MessageRole::Assistant
        );
    }

    #[test]
    fn test_attached_file_wire_format() {
        let file: AttachedFile =
            serde_json::from_str(r#"{"name":"notes.txt","type":"text/plain","size":12}"#).unwrap();
        assert_eq!(file.file_type.as_deref(), Some("text/plain"));
        assert_eq!(file.size, Some(12));
        assert!(file.id.is_none());
    }
}
