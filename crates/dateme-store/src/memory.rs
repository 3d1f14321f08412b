//! In-process conversation store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use dateme_core::error::StoreError;
use dateme_core::model::{Conversation, Message, UserPreferences};
use dateme_core::traits::ConversationStore;

#[derive(Default)]
struct Tables {
    conversations: HashMap<Uuid, Conversation>,
    messages: HashMap<Uuid, Vec<Message>>,
}

/// A store that keeps rows in memory.
///
/// Writes can be made to fail, and the store can be signed out, so callers
/// can exercise their rollback paths.
pub struct MemoryStore {
    user_id: Option<String>,
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// A store signed in as `user_id`.
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            tables: Mutex::new(Tables::default()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// A store with no signed-in user; every call fails.
    pub fn signed_out() -> Self {
        Self {
            user_id: None,
            ..Self::new("")
        }
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Seed a conversation together with its messages.
    pub fn with_conversation(self, conversation: Conversation) -> Self {
        {
            let mut tables = self.tables.lock().unwrap();
            let mut conversation = conversation;
            let messages = std::mem::take(&mut conversation.messages);
            tables.messages.insert(conversation.id, messages);
            tables.conversations.insert(conversation.id, conversation);
        }
        self
    }

    /// Stored copy of a conversation, without messages.
    pub fn stored_conversation(&self, id: Uuid) -> Option<Conversation> {
        self.tables.lock().unwrap().conversations.get(&id).cloned()
    }

    /// Number of stored messages for a conversation.
    pub fn message_count(&self, id: Uuid) -> usize {
        self.tables
            .lock()
            .unwrap()
            .messages
            .get(&id)
            .map_or(0, Vec::len)
    }

    fn check_auth(&self) -> Result<&str, StoreError> {
        self.user_id
            .as_deref()
            .ok_or_else(|| StoreError::Unauthenticated("no session".into()))
    }

    fn check_write(&self) -> Result<(), StoreError> {
        self.check_auth()?;
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::ApiError {
                status: 500,
                message: "write rejected".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn current_user_id(&self) -> anyhow::Result<String> {
        Ok(self.check_auth()?.to_string())
    }

    async fn list_conversations(&self) -> anyhow::Result<Vec<Conversation>> {
        self.check_auth()?;
        let tables = self.tables.lock().unwrap();
        let mut list: Vec<Conversation> = tables.conversations.values().cloned().collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(list)
    }

    async fn insert_conversation(&self, conversation: &Conversation) -> anyhow::Result<()> {
        self.check_write()?;
        let mut row = conversation.clone();
        row.messages.clear();
        let mut tables = self.tables.lock().unwrap();
        tables.messages.entry(row.id).or_default();
        tables.conversations.insert(row.id, row);
        Ok(())
    }

    async fn update_conversation(
        &self,
        id: Uuid,
        title: &str,
        preview: &str,
    ) -> anyhow::Result<()> {
        self.check_write()?;
        let mut tables = self.tables.lock().unwrap();
        let conv = tables
            .conversations
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        conv.title = title.to_string();
        conv.preview = preview.to_string();
        conv.updated_at = Utc::now();
        Ok(())
    }

    async fn update_preferences(
        &self,
        id: Uuid,
        preferences: &UserPreferences,
    ) -> anyhow::Result<()> {
        self.check_write()?;
        let mut tables = self.tables.lock().unwrap();
        let conv = tables
            .conversations
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        conv.user_preferences = preferences.clone();
        conv.updated_at = Utc::now();
        Ok(())
    }

    async fn list_messages(&self, conversation_id: Uuid) -> anyhow::Result<Vec<Message>> {
        self.check_auth()?;
        let tables = self.tables.lock().unwrap();
        let mut messages = tables
            .messages
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default();
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(messages)
    }

    async fn insert_message(&self, conversation_id: Uuid, message: &Message) -> anyhow::Result<()> {
        self.check_write()?;
        self.tables
            .lock()
            .unwrap()
            .messages
            .entry(conversation_id)
            .or_default()
            .push(message.clone());
        Ok(())
    }
}
