//! Core data model types for dateme.
//!
//! Conversations, messages, and the per-conversation preferences that
//! drive prompt assembly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mbti::PersonalityCode;

/// Greeting placed at the start of every new conversation.
pub const GREETING: &str =
    "Hi there! I'm your AI dating assistant. How can I help you strengthen your relationship today?";

/// Title given to a conversation before its first exchange.
pub const NEW_CONVERSATION_TITLE: &str = "New Chat";

/// Preview text given to a conversation before its first exchange.
pub const NEW_CONVERSATION_PREVIEW: &str = "Start a new conversation!";

/// The tone the assistant adopts for a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mood {
    #[default]
    Romantic,
    Playful,
    Serious,
    Supportive,
    Flirty,
    #[serde(rename = "Trust-Builder")]
    TrustBuilder,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Romantic,
        Mood::Playful,
        Mood::Serious,
        Mood::Supportive,
        Mood::Flirty,
        Mood::TrustBuilder,
    ];

    /// The label used on the wire and in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Romantic => "Romantic",
            Mood::Playful => "Playful",
            Mood::Serious => "Serious",
            Mood::Supportive => "Supportive",
            Mood::Flirty => "Flirty",
            Mood::TrustBuilder => "Trust-Builder",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Romantic => "💕",
            Mood::Playful => "😄",
            Mood::Serious => "🤔",
            Mood::Supportive => "🤗",
            Mood::Flirty => "😉",
            Mood::TrustBuilder => "🤝",
        }
    }

    /// Exact-match lookup by label. Returns `None` for anything else.
    pub fn from_label(label: &str) -> Option<Mood> {
        Mood::ALL.into_iter().find(|m| m.label() == label)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mood {
    type Err = String;

    /// Lenient parse for user input: case-insensitive, accepts
    /// `trust-builder`, `trust_builder` and `trustbuilder`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "romantic" => Ok(Mood::Romantic),
            "playful" => Ok(Mood::Playful),
            "serious" => Ok(Mood::Serious),
            "supportive" => Ok(Mood::Supportive),
            "flirty" => Ok(Mood::Flirty),
            "trust-builder" | "trustbuilder" => Ok(Mood::TrustBuilder),
            other => Err(format!("unknown mood: {other}")),
        }
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    /// Attached image, as a URL or data URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Mood that was active when the message was written.
    #[serde(default)]
    pub mood: Option<Mood>,
}

impl Message {
    pub fn user(text: impl Into<String>, image: Option<String>, mood: Mood) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            image,
            mood: Some(mood),
        }
    }

    pub fn assistant(text: impl Into<String>, mood: Mood) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::Assistant,
            timestamp: Utc::now(),
            image: None,
            mood: Some(mood),
        }
    }
}

/// Per-conversation personalisation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_partner_name")]
    pub partner_name: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default)]
    pub mood: Mood,
    #[serde(default = "default_love_language")]
    pub love_language: String,
    /// The user's own MBTI type.
    #[serde(default)]
    pub mbti_type: Option<PersonalityCode>,
    #[serde(default)]
    pub partner_mbti_type: Option<PersonalityCode>,
}

fn default_name() -> String {
    "You".to_string()
}
fn default_partner_name() -> String {
    "Your Partner".to_string()
}
fn default_tone() -> String {
    "romantic".to_string()
}
fn default_love_language() -> String {
    "Words of Affirmation".to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            name: default_name(),
            partner_name: default_partner_name(),
            tone: default_tone(),
            mood: Mood::default(),
            love_language: default_love_language(),
            mbti_type: None,
            partner_mbti_type: None,
        }
    }
}

/// Whose personality a quiz result or MBTI setting describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    #[default]
    User,
    Partner,
}

impl UserPreferences {
    /// Returns a copy with the MBTI type for `subject` replaced.
    pub fn with_mbti(&self, subject: Subject, code: Option<PersonalityCode>) -> Self {
        let mut prefs = self.clone();
        match subject {
            Subject::User => prefs.mbti_type = code,
            Subject::Partner => prefs.partner_mbti_type = code,
        }
        prefs
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::User => write!(f, "user"),
            Subject::Partner => write!(f, "partner"),
        }
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" | "me" | "self" => Ok(Subject::User),
            "partner" => Ok(Subject::Partner),
            other => Err(format!("unknown subject: {other} (expected user or partner)")),
        }
    }
}

/// A conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub title: String,
    pub preview: String,
    pub user_preferences: UserPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Loaded lazily; empty when fetched from a conversation listing.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// A fresh conversation with default preferences and the greeting.
    pub fn new() -> Self {
        let now = Utc::now();
        let mut greeting = Message::assistant(GREETING, Mood::Supportive);
        greeting.timestamp = now;
        Self {
            id: Uuid::new_v4(),
            title: NEW_CONVERSATION_TITLE.to_string(),
            preview: NEW_CONVERSATION_PREVIEW.to_string(),
            user_preferences: UserPreferences::default(),
            created_at: now,
            updated_at: now,
            messages: vec![greeting],
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate to `max` characters and append an ellipsis.
///
/// Used for conversation titles and previews.
pub fn summarize(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_labels_and_parse() {
        assert_eq!(Mood::TrustBuilder.to_string(), "Trust-Builder");
        assert_eq!(Mood::from_label("Playful"), Some(Mood::Playful));
        assert_eq!(Mood::from_label("playful"), None);
        assert_eq!("playful".parse::<Mood>().unwrap(), Mood::Playful);
        assert_eq!("trust_builder".parse::<Mood>().unwrap(), Mood::TrustBuilder);
        assert!("grumpy".parse::<Mood>().is_err());
    }

    #[test]
    fn mood_serde_uses_labels() {
        let json = serde_json::to_string(&Mood::TrustBuilder).unwrap();
        assert_eq!(json, "\"Trust-Builder\"");
        let mood: Mood = serde_json::from_str("\"Flirty\"").unwrap();
        assert_eq!(mood, Mood::Flirty);
    }

    #[test]
    fn preferences_defaults() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.name, "You");
        assert_eq!(prefs.partner_name, "Your Partner");
        assert_eq!(prefs.mood, Mood::Romantic);
        assert!(prefs.mbti_type.is_none());
    }

    #[test]
    fn preferences_json_shape() {
        let json = serde_json::json!({
            "name": "Sam",
            "partnerName": "Alex",
            "tone": "gentle",
            "mood": "Serious",
            "loveLanguage": "Quality Time",
            "mbtiType": "INFP",
            "partnerMbtiType": null
        });
        let prefs: UserPreferences = serde_json::from_value(json).unwrap();
        assert_eq!(prefs.partner_name, "Alex");
        assert_eq!(prefs.mbti_type.unwrap().to_string(), "INFP");
        assert!(prefs.partner_mbti_type.is_none());

        // Rows written before the MBTI fields existed still load.
        let old: UserPreferences = serde_json::from_value(serde_json::json!({
            "name": "Sam", "partnerName": "Alex", "tone": "romantic",
            "mood": "Romantic", "loveLanguage": "Gifts"
        }))
        .unwrap();
        assert!(old.mbti_type.is_none());
    }

    #[test]
    fn new_conversation_has_greeting() {
        let conv = Conversation::new();
        assert_eq!(conv.title, "New Chat");
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.messages[0].sender, Sender::Assistant);
        assert_eq!(conv.messages[0].mood, Some(Mood::Supportive));
    }

    #[test]
    fn summarize_counts_chars() {
        assert_eq!(summarize("hello", 3), "hel...");
        assert_eq!(summarize("hi", 50), "hi...");
        assert_eq!(summarize("💕💕💕", 2), "💕💕...");
    }

    #[test]
    fn with_mbti_targets_subject() {
        let code: PersonalityCode = "ENFJ".parse().unwrap();
        let prefs = UserPreferences::default().with_mbti(Subject::Partner, Some(code));
        assert_eq!(prefs.partner_mbti_type, Some(code));
        assert!(prefs.mbti_type.is_none());
    }
}
