//! Chat session orchestrator.
//!
//! Owns the in-memory view of the user's conversations and drives one
//! interaction at a time: send a message, switch conversation, start a new
//! one, change preferences. Local state is updated optimistically and the
//! store is written afterwards; preference writes are reverted locally when
//! the store rejects them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::error::SessionError;
use crate::mbti::PersonalityCode;
use crate::model::{summarize, Conversation, Message, Mood, Subject, UserPreferences};
use crate::prompt::system_prompt_for;
use crate::traits::{history_to_chat, ChatProvider, ChatRequest, ConversationStore, EMPTY_REPLY};

/// Reply shown when the provider could not be reached.
pub const FALLBACK_REPLY: &str =
    "I'm having trouble connecting right now. Please try again in a moment.";

const TITLE_CHARS: usize = 50;
const PREVIEW_CHARS: usize = 100;

/// Generation settings applied to every request.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 500,
            temperature: 0.8,
        }
    }
}

impl From<&crate::config::OpenAiSettings> for SessionConfig {
    fn from(settings: &crate::config::OpenAiSettings) -> Self {
        Self {
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }
}

/// Result of sending one message.
#[derive(Debug)]
pub struct SendOutcome {
    /// The assistant message appended to the conversation.
    pub reply: Message,
    /// `true` when the provider failed and `reply` is [`FALLBACK_REPLY`].
    pub fallback: bool,
    /// Set when the exchange could not be persisted. The messages stay in
    /// local state either way.
    pub save_error: Option<anyhow::Error>,
}

/// The chat session.
pub struct ChatSession {
    provider: Option<Arc<dyn ChatProvider>>,
    store: Arc<dyn ConversationStore>,
    config: SessionConfig,
    conversations: HashMap<Uuid, Conversation>,
    current: Option<Uuid>,
    typing: bool,
}

impl ChatSession {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        store: Arc<dyn ConversationStore>,
        config: SessionConfig,
    ) -> Self {
        Self {
            provider: Some(provider),
            store,
            config,
            conversations: HashMap::new(),
            current: None,
            typing: false,
        }
    }

    /// A session that can browse conversations and edit their preferences
    /// but cannot send messages.
    ///
    /// [`send_message`](Self::send_message) fails with
    /// [`SessionError::NoProvider`] before touching any state.
    pub fn store_only(store: Arc<dyn ConversationStore>) -> Self {
        Self {
            provider: None,
            store,
            config: SessionConfig::default(),
            conversations: HashMap::new(),
            current: None,
            typing: false,
        }
    }

    /// Whether this session can generate replies.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Whether a reply is currently being generated.
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn current(&self) -> Option<&Conversation> {
        self.current.and_then(|id| self.conversations.get(&id))
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.current
    }

    pub fn conversation(&self, id: Uuid) -> Option<&Conversation> {
        self.conversations.get(&id)
    }

    /// Known conversations, most recently updated first.
    pub fn conversations(&self) -> Vec<&Conversation> {
        let mut list: Vec<&Conversation> = self.conversations.values().collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        list
    }

    /// System prompt for the current conversation.
    pub fn system_prompt(&self) -> Option<String> {
        self.current()
            .map(|conv| system_prompt_for(&conv.user_preferences))
    }

    /// Refresh the conversation list from the store.
    ///
    /// Messages already loaded for a conversation are kept.
    pub async fn load_conversations(&mut self) -> Result<Vec<&Conversation>> {
        let fetched = self.store.list_conversations().await.map_err(|e| {
            tracing::error!("failed to load conversations: {e:#}");
            e
        })?;
        tracing::debug!(count = fetched.len(), "loaded conversations");

        for mut conv in fetched {
            if let Some(existing) = self.conversations.remove(&conv.id) {
                conv.messages = existing.messages;
            }
            self.conversations.insert(conv.id, conv);
        }
        Ok(self.conversations())
    }

    /// Load a conversation's messages and make it current.
    pub async fn select_conversation(&mut self, id: Uuid) -> Result<&Conversation> {
        if !self.conversations.contains_key(&id) {
            tracing::error!(%id, "conversation not found in state");
            return Err(SessionError::UnknownConversation(id.to_string()).into());
        }

        let messages = self.store.list_messages(id).await.map_err(|e| {
            tracing::error!(%id, "failed to load conversation messages: {e:#}");
            e
        })?;

        let conv = self
            .conversations
            .get_mut(&id)
            .ok_or_else(|| SessionError::UnknownConversation(id.to_string()))?;
        conv.messages = messages;
        self.current = Some(id);
        Ok(&*conv)
    }

    /// Start a new conversation with the greeting and make it current.
    ///
    /// If the store rejects it, the conversation is dropped from local state
    /// and the previous selection is restored.
    pub async fn new_conversation(&mut self) -> Result<Uuid> {
        let conv = Conversation::new();
        let id = conv.id;
        let greeting = conv.messages[0].clone();
        let previous = self.current;

        self.conversations.insert(id, conv.clone());
        self.current = Some(id);
        self.typing = false;

        let saved = async {
            self.store.insert_conversation(&conv).await?;
            self.store.insert_message(id, &greeting).await
        }
        .await;

        if let Err(e) = saved {
            tracing::error!(%id, "failed to create new conversation: {e:#}");
            self.conversations.remove(&id);
            self.current = previous;
            return Err(e);
        }

        tracing::info!(%id, "created conversation");
        Ok(id)
    }

    /// Send a user message and append the assistant's reply.
    ///
    /// Returns `Ok(None)` when there is neither text nor an image. Provider
    /// failures never surface as errors: the reply becomes
    /// [`FALLBACK_REPLY`] and the typing flag is cleared.
    pub async fn send_message(
        &mut self,
        text: &str,
        image: Option<String>,
    ) -> Result<Option<SendOutcome>> {
        let image = image.filter(|i| !i.trim().is_empty());
        if text.trim().is_empty() && image.is_none() {
            return Ok(None);
        }

        let provider = self.provider.clone().ok_or(SessionError::NoProvider)?;
        let id = self.current.ok_or(SessionError::NoConversation)?;
        let conv = self
            .conversations
            .get_mut(&id)
            .ok_or_else(|| SessionError::UnknownConversation(id.to_string()))?;

        let mood = conv.user_preferences.mood;
        let user_message = Message::user(text, image, mood);
        conv.messages.push(user_message.clone());
        self.typing = true;

        let request = ChatRequest {
            model: self.config.model.clone(),
            system_prompt: system_prompt_for(&conv.user_preferences),
            messages: history_to_chat(&conv.messages),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let start = Instant::now();
        let (reply_text, fallback) = match provider.complete(&request).await {
            Ok(response) if response.content.trim().is_empty() => (EMPTY_REPLY.to_string(), false),
            Ok(response) => {
                tracing::debug!(
                    model = %response.model,
                    tokens = response.token_usage.total_tokens,
                    latency_ms = response.latency_ms,
                    "reply received"
                );
                (response.content, false)
            }
            Err(e) => {
                tracing::error!(
                    provider = provider.name(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "completion failed: {e:#}"
                );
                (FALLBACK_REPLY.to_string(), true)
            }
        };

        let reply = Message::assistant(reply_text, mood);
        let title = summarize(&user_message.text, TITLE_CHARS);
        let preview = summarize(&reply.text, PREVIEW_CHARS);

        if let Some(conv) = self.conversations.get_mut(&id) {
            conv.messages.push(reply.clone());
            conv.title = title.clone();
            conv.preview = preview.clone();
            conv.updated_at = Utc::now();
        }
        self.typing = false;

        let saved = async {
            self.store.insert_message(id, &user_message).await?;
            self.store.insert_message(id, &reply).await?;
            self.store.update_conversation(id, &title, &preview).await
        }
        .await;

        let save_error = saved.err().map(|e| {
            tracing::error!(%id, "failed to save exchange: {e:#}");
            e
        });

        Ok(Some(SendOutcome {
            reply,
            fallback,
            save_error,
        }))
    }

    /// Change the current conversation's mood.
    pub async fn set_mood(&mut self, mood: Mood) -> Result<()> {
        let prefs = self.current_preferences()?;
        let updated = UserPreferences { mood, ..prefs };
        self.update_preferences(updated).await
    }

    /// Set or clear the MBTI type for the user or their partner.
    pub async fn set_mbti(&mut self, subject: Subject, code: Option<PersonalityCode>) -> Result<()> {
        let updated = self.current_preferences()?.with_mbti(subject, code);
        self.update_preferences(updated).await
    }

    /// Store a finished quiz's result in the current conversation.
    pub async fn apply_quiz_result(&mut self, subject: Subject, code: PersonalityCode) -> Result<()> {
        tracing::info!(%subject, %code, "saving quiz result");
        self.set_mbti(subject, Some(code)).await
    }

    fn current_preferences(&self) -> Result<UserPreferences> {
        self.current()
            .map(|c| c.user_preferences.clone())
            .ok_or_else(|| SessionError::NoConversation.into())
    }

    async fn update_preferences(&mut self, updated: UserPreferences) -> Result<()> {
        let id = self.current.ok_or(SessionError::NoConversation)?;
        let conv = self
            .conversations
            .get_mut(&id)
            .ok_or_else(|| SessionError::UnknownConversation(id.to_string()))?;

        let previous = std::mem::replace(&mut conv.user_preferences, updated.clone());

        if let Err(e) = self.store.update_preferences(id, &updated).await {
            tracing::error!(%id, "failed to save preferences: {e:#}");
            if let Some(conv) = self.conversations.get_mut(&id) {
                conv.user_preferences = previous;
            }
            return Err(e);
        }

        if let Some(conv) = self.conversations.get_mut(&id) {
            conv.updated_at = Utc::now();
        }
        Ok(())
    }
}
