//! Subcommand implementations and the wiring they share.

pub mod chat;
pub mod conversations;
pub mod history;
pub mod init;
pub mod mbti;
pub mod models;
pub mod mood;
pub mod prompt;
pub mod quiz;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use dateme_core::config::{load_config_from, DatemeConfig};
use dateme_core::error::user_notice;
use dateme_core::session::{ChatSession, SessionConfig};
use dateme_core::traits::ConversationStore;
use dateme_providers::create_provider;
use dateme_store::SupabaseStore;

pub(crate) fn load(config_path: Option<&Path>) -> Result<DatemeConfig> {
    load_config_from(config_path)
}

/// The persistence backend for the signed-in user.
pub(crate) fn open_store(config: &DatemeConfig) -> Result<Arc<dyn ConversationStore>> {
    let settings = config.require_supabase()?;
    Ok(Arc::new(SupabaseStore::from_settings(settings)?))
}

/// A chat session with its conversation list loaded.
///
/// Needs both the OpenAI and the Supabase settings.
pub(crate) async fn open_session(config: &DatemeConfig) -> Result<ChatSession> {
    let settings = config.require_openai()?;
    let provider = create_provider(settings)?;
    let store = open_store(config)?;

    let session = ChatSession::new(provider, store, SessionConfig::from(settings));
    load_conversations(session).await
}

/// Open a store-only session and make `id` the current conversation.
///
/// Preference commands never call the model, so only the Supabase settings
/// are required.
pub(crate) async fn open_conversation(config: &DatemeConfig, id: Uuid) -> Result<ChatSession> {
    let store = open_store(config)?;
    let mut session = load_conversations(ChatSession::store_only(store)).await?;
    with_notice(session.select_conversation(id).await.map(|_| ()))?;
    Ok(session)
}

async fn load_conversations(mut session: ChatSession) -> Result<ChatSession> {
    with_notice(session.load_conversations().await.map(|_| ()))?;
    tracing::debug!(
        conversations = session.conversations().len(),
        provider = session.has_provider(),
        "session opened"
    );
    Ok(session)
}

/// Print the generic notice for a failed backend operation, then pass the
/// error on unchanged.
pub(crate) fn with_notice<T>(result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        eprintln!("{}", user_notice(e));
    }
    result
}
