//! System prompt assembly.
//!
//! Every outbound completion request carries one system instruction: the
//! fixed persona paragraph, a clause for the conversation's mood, and
//! whatever profile details the user has filled in.

use crate::mbti::PersonalityCode;
use crate::model::{Mood, UserPreferences};

/// Persona, mission and guidelines shared by every mood.
pub const BASE_PROMPT: &str = "You are Dateme.ai, an emotionally intelligent AI assistant dedicated to helping people maintain and strengthen long-distance romantic relationships. You provide personalized conversations, thoughtful advice, and loving emotional support.

Core mission:
- Help couples nurture love, trust, and emotional intimacy across distance
- Reinforce loyalty, communication, and reassurance
- Provide meaningful interactions that bring partners closer

Your personality traits:
- Empathetic and understanding
- Romantic and caring
- Supportive and encouraging
- Insightful about relationships
- Warm and genuine

Guidelines:
- Always reinforce love, trust, and commitment
- Keep responses concise but meaningful (2–3 sentences max)
- Be emotionally supportive and encouraging
- Offer practical relationship advice when appropriate
- Match the user's emotional tone
- Be romantic but respectful
- Help bridge the distance in long-distance relationships";

/// Appended when at least one MBTI type is known.
pub const PERSONALIZATION_CLAUSE: &str = "Use these personality types to personalize your advice: adapt your communication style to the user's type, and explain how their partner's type may shape the way they give and receive love.";

impl Mood {
    /// The behaviour clause for this mood.
    pub fn instruction(&self) -> &'static str {
        match self {
            Mood::Romantic => "Respond in a romantic, loving tone. Use gentle, affectionate language and focus on emotional connection.",
            Mood::Playful => "Be lighthearted, fun, and slightly flirty. Use humor and playful banter while staying supportive.",
            Mood::Serious => "Be thoughtful and mature. Provide deeper insights and more substantial relationship advice.",
            Mood::Supportive => "Focus on emotional support and encouragement. Be a caring listener and offer comfort.",
            Mood::Flirty => "Be charming and mildly flirtatious while maintaining respect and appropriateness.",
            Mood::TrustBuilder => "Focus on building or restoring trust. Speak with clarity, empathy, and honesty. Encourage open communication, reassure loyalty, and acknowledge emotional vulnerability without judgment.",
        }
    }
}

/// Profile details that personalise the prompt. Absent fields are skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub name: Option<String>,
    pub partner_name: Option<String>,
    pub tone: Option<String>,
    pub love_language: Option<String>,
    pub mbti_type: Option<PersonalityCode>,
    pub partner_mbti_type: Option<PersonalityCode>,
}

impl Profile {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.partner_name.is_none()
            && self.tone.is_none()
            && self.love_language.is_none()
            && self.mbti_type.is_none()
            && self.partner_mbti_type.is_none()
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl From<&UserPreferences> for Profile {
    fn from(prefs: &UserPreferences) -> Self {
        Self {
            name: non_blank(&prefs.name),
            partner_name: non_blank(&prefs.partner_name),
            tone: non_blank(&prefs.tone),
            love_language: non_blank(&prefs.love_language),
            mbti_type: prefs.mbti_type,
            partner_mbti_type: prefs.partner_mbti_type,
        }
    }
}

/// Build the system instruction for `mood`.
///
/// `mood` is matched exactly against the mood labels; anything else gets
/// the Romantic clause while the raw tag is still echoed.
pub fn build_system_prompt(mood: &str, profile: Option<&Profile>) -> String {
    let clause = Mood::from_label(mood)
        .unwrap_or(Mood::Romantic)
        .instruction();

    let mut prompt = format!("{BASE_PROMPT}\n\nCurrent mood: {mood}\n{clause}");

    let Some(profile) = profile.filter(|p| !p.is_empty()) else {
        return prompt;
    };

    prompt.push_str("\n\nAbout the people in this conversation:");
    if let Some(name) = &profile.name {
        prompt.push_str(&format!("\n- The user's name is {name}."));
    }
    if let Some(partner) = &profile.partner_name {
        prompt.push_str(&format!("\n- Their partner's name is {partner}."));
    }
    if let Some(tone) = &profile.tone {
        prompt.push_str(&format!("\n- Preferred conversational tone: {tone}."));
    }
    if let Some(language) = &profile.love_language {
        prompt.push_str(&format!("\n- The user's love language: {language}."));
    }
    if let Some(code) = profile.mbti_type {
        prompt.push_str(&format!("\n- The user's MBTI type: {code}."));
    }
    if let Some(code) = profile.partner_mbti_type {
        prompt.push_str(&format!("\n- The partner's MBTI type: {code}."));
    }
    if profile.mbti_type.is_some() || profile.partner_mbti_type.is_some() {
        prompt.push_str("\n\n");
        prompt.push_str(PERSONALIZATION_CLAUSE);
    }

    prompt
}

/// Convenience for the common case of building from stored preferences.
pub fn system_prompt_for(prefs: &UserPreferences) -> String {
    build_system_prompt(prefs.mood.label(), Some(&Profile::from(prefs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> PersonalityCode {
        s.parse().unwrap()
    }

    #[test]
    fn mood_clause_selected_by_exact_match() {
        let prompt = build_system_prompt("Serious", None);
        assert!(prompt.starts_with("You are Dateme.ai"));
        assert!(prompt.contains("Current mood: Serious\n"));
        assert!(prompt.ends_with(Mood::Serious.instruction()));
    }

    #[test]
    fn trust_builder_clause() {
        let prompt = build_system_prompt("Trust-Builder", None);
        assert!(prompt.contains("restoring trust"));
    }

    #[test]
    fn unknown_mood_falls_back_to_romantic() {
        let prompt = build_system_prompt("Grumpy", None);
        assert!(prompt.contains("Current mood: Grumpy\n"));
        assert!(prompt.ends_with(Mood::Romantic.instruction()));

        // Matching is exact, so a lowercase label is unrecognised too.
        let prompt = build_system_prompt("playful", None);
        assert!(prompt.ends_with(Mood::Romantic.instruction()));
    }

    #[test]
    fn both_mbti_fields_add_personalization() {
        let profile = Profile {
            mbti_type: Some(code("INFJ")),
            partner_mbti_type: Some(code("ESTP")),
            ..Default::default()
        };
        let prompt = build_system_prompt("Romantic", Some(&profile));
        assert!(prompt.contains("INFJ"));
        assert!(prompt.contains("ESTP"));
        assert!(prompt.contains(PERSONALIZATION_CLAUSE));
    }

    #[test]
    fn no_mbti_fields_omit_personalization() {
        let profile = Profile {
            name: Some("Sam".into()),
            love_language: Some("Quality Time".into()),
            ..Default::default()
        };
        let prompt = build_system_prompt("Romantic", Some(&profile));
        assert!(prompt.contains("The user's name is Sam."));
        assert!(prompt.contains("Quality Time"));
        assert!(!prompt.contains(PERSONALIZATION_CLAUSE));
        assert!(!prompt.contains("Their partner's name"));
    }

    #[test]
    fn empty_profile_is_same_as_none() {
        assert_eq!(
            build_system_prompt("Flirty", Some(&Profile::default())),
            build_system_prompt("Flirty", None)
        );
    }

    #[test]
    fn from_preferences_skips_blank_fields() {
        let prefs = UserPreferences {
            tone: "   ".into(),
            partner_mbti_type: Some(code("ISFJ")),
            ..Default::default()
        };
        let profile = Profile::from(&prefs);
        assert!(profile.tone.is_none());
        assert_eq!(profile.name.as_deref(), Some("You"));

        let prompt = system_prompt_for(&prefs);
        assert!(prompt.contains("Current mood: Romantic"));
        assert!(prompt.contains("The partner's MBTI type: ISFJ."));
        assert!(prompt.contains(PERSONALIZATION_CLAUSE));
    }
}
