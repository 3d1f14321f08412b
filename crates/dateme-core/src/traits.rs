//! Core trait definitions for LLM providers and conversation stores.
//!
//! These async traits are implemented by the `dateme-providers` and
//! `dateme-store` crates respectively.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Conversation, Message, Sender, UserPreferences};

// ---------------------------------------------------------------------------
// Chat provider trait
// ---------------------------------------------------------------------------

/// Trait for LLM backends that produce the assistant's replies.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Request one completion for the running conversation.
    async fn complete(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse>;

    /// List models this provider is known to serve.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Role of a message on the provider wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A message as sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    /// Image URL or data URL to attach alongside the text.
    #[serde(default)]
    pub image: Option<String>,
}

/// Text sent with an image when the user typed nothing.
pub const DEFAULT_IMAGE_PROMPT: &str = "What do you think about this image?";

impl ChatMessage {
    pub fn from_message(message: &Message) -> Self {
        let role = match message.sender {
            Sender::User => Role::User,
            Sender::Assistant => Role::Assistant,
        };
        let text = if message.image.is_some() && message.text.trim().is_empty() {
            DEFAULT_IMAGE_PROMPT.to_string()
        } else {
            message.text.clone()
        };
        Self {
            role,
            text,
            image: message.image.clone(),
        }
    }
}

/// Build the provider message list from a conversation's history.
pub fn history_to_chat(messages: &[Message]) -> Vec<ChatMessage> {
    messages.iter().map(ChatMessage::from_message).collect()
}

/// Request for one assistant reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier (e.g. "gpt-4o-mini").
    pub model: String,
    /// Mood- and profile-conditioned instruction.
    pub system_prompt: String,
    /// Running message list, oldest first.
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Response from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The reply text.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
    /// Whether image parts are accepted.
    pub vision: bool,
}

// ---------------------------------------------------------------------------
// Conversation store trait
// ---------------------------------------------------------------------------

/// Trait for the hosted backend that keeps conversations durable.
///
/// Every call is scoped to the authenticated user; implementations fail with
/// [`StoreError::Unauthenticated`](crate::error::StoreError) when there is
/// none.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Identifier of the authenticated user.
    async fn current_user_id(&self) -> anyhow::Result<String>;

    /// The user's conversations, most recently updated first, without messages.
    async fn list_conversations(&self) -> anyhow::Result<Vec<Conversation>>;

    async fn insert_conversation(&self, conversation: &Conversation) -> anyhow::Result<()>;

    /// Set title and preview, bumping `updated_at`.
    async fn update_conversation(&self, id: Uuid, title: &str, preview: &str)
        -> anyhow::Result<()>;

    /// Replace the conversation's preferences, bumping `updated_at`.
    async fn update_preferences(
        &self,
        id: Uuid,
        preferences: &UserPreferences,
    ) -> anyhow::Result<()>;

    /// Messages of a conversation, oldest first.
    async fn list_messages(&self, conversation_id: Uuid) -> anyhow::Result<Vec<Message>>;

    async fn insert_message(&self, conversation_id: Uuid, message: &Message)
        -> anyhow::Result<()>;
}

/// Fallback text when the provider returns no choices.
pub const EMPTY_REPLY: &str = "I apologize, but I couldn't generate a response right now.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mood;

    #[test]
    fn image_without_text_gets_default_prompt() {
        let msg = Message::user("  ", Some("https://img.example/a.png".into()), Mood::Romantic);
        let chat = ChatMessage::from_message(&msg);
        assert_eq!(chat.role, Role::User);
        assert_eq!(chat.text, DEFAULT_IMAGE_PROMPT);
        assert_eq!(chat.image.as_deref(), Some("https://img.example/a.png"));
    }

    #[test]
    fn text_is_kept_verbatim() {
        let msg = Message::user("I miss her", None, Mood::Romantic);
        assert_eq!(ChatMessage::from_message(&msg).text, "I miss her");
    }

    #[test]
    fn history_maps_roles_in_order() {
        let history = vec![
            Message::assistant("Hi!", Mood::Supportive),
            Message::user("Hello", None, Mood::Romantic),
        ];
        let chat = history_to_chat(&history);
        assert_eq!(chat.len(), 2);
        assert_eq!(chat[0].role, Role::Assistant);
        assert_eq!(chat[1].role, Role::User);
    }
}
