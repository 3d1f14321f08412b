//! Supabase (PostgREST) conversation store.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::instrument;
use uuid::Uuid;

use dateme_core::config::SupabaseSettings;
use dateme_core::error::StoreError;
use dateme_core::model::{Conversation, Message, Mood, Sender, UserPreferences};
use dateme_core::traits::ConversationStore;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Store backed by the `conversations` and `messages` tables.
///
/// Requests carry the project's anon key and the user's session token, so
/// row-level security scopes every query to that user.
pub struct SupabaseStore {
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    client: reqwest::Client,
    user_id: OnceCell<String>,
}

impl SupabaseStore {
    pub fn new(
        url: &str,
        anon_key: &str,
        access_token: Option<String>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: access_token.filter(|t| !t.is_empty()),
            client,
            user_id: OnceCell::new(),
        })
    }

    pub fn from_settings(settings: &SupabaseSettings) -> anyhow::Result<Self> {
        Self::new(
            &settings.url,
            &settings.anon_key,
            settings.access_token.clone(),
        )
    }

    fn token(&self) -> Result<&str, StoreError> {
        self.access_token
            .as_deref()
            .ok_or_else(|| StoreError::Unauthenticated("no session token".into()))
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, StoreError> {
        let token = self.token()?;
        Ok(self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {token}")))
    }

    /// Send a request and map transport and HTTP failures to [`StoreError`].
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::ApiError { status, message });
        }
        Ok(response)
    }

    async fn write(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &impl Serialize,
    ) -> anyhow::Result<()> {
        let builder = self
            .request(method, path)?
            .header("Prefer", "return=minimal")
            .json(body);
        self.send(builder).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
}

#[derive(Serialize, Deserialize)]
struct ConversationRow {
    id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    title: String,
    preview: String,
    #[serde(default)]
    user_preferences: Option<UserPreferences>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            preview: row.preview,
            user_preferences: row.user_preferences.unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            messages: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct MessageRow {
    id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    conversation_id: Option<Uuid>,
    sender_type: Sender,
    content: String,
    #[serde(default)]
    image_url: Option<String>,
    /// Stored as the mood label; unrecognised labels load as `None`.
    #[serde(default)]
    mood: Option<String>,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn from_message(conversation_id: Uuid, message: &Message) -> Self {
        Self {
            id: message.id,
            conversation_id: Some(conversation_id),
            sender_type: message.sender,
            content: message.text.clone(),
            image_url: message.image.clone(),
            mood: message.mood.map(|m| m.label().to_string()),
            created_at: message.timestamp,
        }
    }
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            text: row.content,
            sender: row.sender_type,
            timestamp: row.created_at,
            image: row.image_url.filter(|u| !u.is_empty()),
            mood: row.mood.as_deref().and_then(Mood::from_label),
        }
    }
}

#[derive(Serialize)]
struct SummaryPatch<'a> {
    title: &'a str,
    preview: &'a str,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct PreferencesPatch<'a> {
    user_preferences: &'a UserPreferences,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl ConversationStore for SupabaseStore {
    async fn current_user_id(&self) -> anyhow::Result<String> {
        let id = self
            .user_id
            .get_or_try_init(|| async {
                let builder = self.request(reqwest::Method::GET, "/auth/v1/user")?;
                let response = self.send(builder).await.map_err(|e| match e {
                    StoreError::ApiError { status, message } if status == 401 || status == 403 => {
                        StoreError::Unauthenticated(message)
                    }
                    other => other,
                })?;
                let user: AuthUser = response.json().await.map_err(|e| StoreError::Decode {
                    what: "auth user",
                    message: e.to_string(),
                })?;
                tracing::debug!(user_id = %user.id, "resolved session user");
                Ok::<_, StoreError>(user.id)
            })
            .await?;
        Ok(id.clone())
    }

    #[instrument(skip(self))]
    async fn list_conversations(&self) -> anyhow::Result<Vec<Conversation>> {
        let user_id = self.current_user_id().await?;
        let path = format!(
            "/rest/v1/conversations?select=id,title,preview,user_preferences,created_at,updated_at&user_id=eq.{user_id}&order=updated_at.desc"
        );
        let response = self.send(self.request(reqwest::Method::GET, &path)?).await?;
        let rows: Vec<ConversationRow> =
            response.json().await.map_err(|e| StoreError::Decode {
                what: "conversations",
                message: e.to_string(),
            })?;
        Ok(rows.into_iter().map(Conversation::from).collect())
    }

    #[instrument(skip(self, conversation), fields(id = %conversation.id))]
    async fn insert_conversation(&self, conversation: &Conversation) -> anyhow::Result<()> {
        let user_id = self.current_user_id().await?;
        let row = ConversationRow {
            id: conversation.id,
            user_id: Some(user_id),
            title: conversation.title.clone(),
            preview: conversation.preview.clone(),
            user_preferences: Some(conversation.user_preferences.clone()),
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        };
        self.write(reqwest::Method::POST, "/rest/v1/conversations", &row)
            .await
            .context("saving new conversation")
    }

    #[instrument(skip(self, title, preview))]
    async fn update_conversation(
        &self,
        id: Uuid,
        title: &str,
        preview: &str,
    ) -> anyhow::Result<()> {
        let patch = SummaryPatch {
            title,
            preview,
            updated_at: Utc::now(),
        };
        self.write(
            reqwest::Method::PATCH,
            &format!("/rest/v1/conversations?id=eq.{id}"),
            &patch,
        )
        .await
        .context("updating conversation")
    }

    #[instrument(skip(self, preferences))]
    async fn update_preferences(
        &self,
        id: Uuid,
        preferences: &UserPreferences,
    ) -> anyhow::Result<()> {
        let patch = PreferencesPatch {
            user_preferences: preferences,
            updated_at: Utc::now(),
        };
        self.write(
            reqwest::Method::PATCH,
            &format!("/rest/v1/conversations?id=eq.{id}"),
            &patch,
        )
        .await
        .context("updating conversation preferences")
    }

    #[instrument(skip(self))]
    async fn list_messages(&self, conversation_id: Uuid) -> anyhow::Result<Vec<Message>> {
        // Fail the same way as writes when signed out.
        self.current_user_id().await?;
        let path = format!(
            "/rest/v1/messages?select=id,content,sender_type,image_url,mood,created_at&conversation_id=eq.{conversation_id}&order=created_at.asc"
        );
        let response = self.send(self.request(reqwest::Method::GET, &path)?).await?;
        let rows: Vec<MessageRow> = response.json().await.map_err(|e| StoreError::Decode {
            what: "messages",
            message: e.to_string(),
        })?;
        Ok(rows.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn insert_message(&self, conversation_id: Uuid, message: &Message) -> anyhow::Result<()> {
        self.current_user_id().await?;
        let row = MessageRow::from_message(conversation_id, message);
        self.write(reqwest::Method::POST, "/rest/v1/messages", &row)
            .await
            .context("saving message")
    }
}
