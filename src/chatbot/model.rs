use super::matcher::Intent;
use crate::pagination::Page;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ChatConversation {
    pub id: i64,
    pub user_id: Option<i64>,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    User,
    Bot,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::User => "user",
            MessageType::Bot => "bot",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub message_type: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub response_time: Option<f64>,
    pub confidence_score: Option<f64>,
    pub knowledge_base_match: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct KnowledgeBaseEntry {
    pub id: i64,
    pub category: String,
    pub language: String,
    pub examples: Vec<String>,
    pub responses: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Intent for KnowledgeBaseEntry {
    fn category(&self) -> &str {
        &self.category
    }

    fn examples(&self) -> Vec<&str> {
        self.examples.iter().map(String::as_str).collect()
    }

    fn responses(&self) -> Vec<&str> {
        self.responses.iter().map(String::as_str).collect()
    }
}

// region:    --- Settings

pub const SETTING_CONFIDENCE_THRESHOLD: &str = "confidence_threshold";
pub const SETTING_MAX_RESPONSE_LENGTH: &str = "max_response_length";
pub const SETTING_ENABLE_AI_FALLBACK: &str = "enable_ai_fallback";
pub const SETTING_DEFAULT_LANGUAGE: &str = "default_language";

/// Effective runtime settings from the active `chatbot_settings` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatbotSettings {
    pub confidence_threshold: f64,
    pub max_response_length: Option<usize>,
    pub enable_ai_fallback: bool,
    pub default_language: String,
}

impl ChatbotSettings {
    /// Rows override `default_threshold`; unparsable values are ignored.
    pub fn from_rows(rows: &[(String, String)], default_threshold: f64) -> Self {
        let values: HashMap<&str, &str> = rows
            .iter()
            .map(|(k, v)| (k.as_str(), v.trim()))
            .collect();

        let confidence_threshold = values
            .get(SETTING_CONFIDENCE_THRESHOLD)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|t| (0.0..=1.0).contains(t))
            .unwrap_or(default_threshold);
        let max_response_length = values
            .get(SETTING_MAX_RESPONSE_LENGTH)
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0);
        let enable_ai_fallback = values
            .get(SETTING_ENABLE_AI_FALLBACK)
            .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no" | "off"))
            .unwrap_or(true);
        let default_language = match values.get(SETTING_DEFAULT_LANGUAGE) {
            Some(&"en") => "en",
            _ => "ar",
        }
        .to_string();

        Self {
            confidence_threshold,
            max_response_length,
            enable_ai_fallback,
            default_language,
        }
    }

    /// Cut model output to `max_response_length` characters.
    pub fn clip<'a>(&self, text: &'a str) -> &'a str {
        match self.max_response_length {
            Some(max) => match text.char_indices().nth(max) {
                Some((cut, _)) => &text[..cut],
                None => text,
            },
            None => text,
        }
    }
}

// endregion: --- Settings

// region:    --- Views

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub confidence: f64,
    pub response_time: f64,
    pub language: String,
    pub source: &'static str,
    pub category: Option<String>,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryView {
    pub conversations: Page<ChatConversation>,
}

#[derive(Debug, Serialize)]
pub struct ConversationDetail {
    pub conversation: ChatConversation,
    pub messages: Vec<ChatMessage>,
}

// endregion: --- Views

#[cfg(test)]
mod tests {
    use super::*;

    fn row(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_settings_defaults() {
        let settings = ChatbotSettings::from_rows(&[], 0.4);
        assert_eq!(settings.confidence_threshold, 0.4);
        assert!(settings.enable_ai_fallback);
        assert_eq!(settings.max_response_length, None);
        assert_eq!(settings.default_language, "ar");
    }

    #[test]
    fn test_settings_overrides() {
        let settings = ChatbotSettings::from_rows(
            &[
                row(SETTING_CONFIDENCE_THRESHOLD, "0.6"),
                row(SETTING_ENABLE_AI_FALLBACK, "False"),
                row(SETTING_MAX_RESPONSE_LENGTH, "5"),
                row(SETTING_DEFAULT_LANGUAGE, "en"),
            ],
            0.4,
        );
        assert_eq!(settings.confidence_threshold, 0.6);
        assert!(!settings.enable_ai_fallback);
        assert_eq!(settings.clip("مرحبا بكم"), "مرحبا");
        assert_eq!(settings.clip("hey"), "hey");
        assert_eq!(settings.default_language, "en");
    }

    #[test]
    fn test_bad_threshold_is_ignored() {
        let settings =
            ChatbotSettings::from_rows(&[row(SETTING_CONFIDENCE_THRESHOLD, "high")], 0.4);
        assert_eq!(settings.confidence_threshold, 0.4);
        let settings = ChatbotSettings::from_rows(&[row(SETTING_CONFIDENCE_THRESHOLD, "7")], 0.4);
        assert_eq!(settings.confidence_threshold, 0.4);
    }
}
