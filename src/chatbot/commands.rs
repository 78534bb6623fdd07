// region:    --- Imports
use super::model::{ChatConversation, ChatHistoryView, ChatMessage, ConversationDetail, KnowledgeBaseEntry};
use super::queries;
use crate::accounts::model::User;
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::pagination::PageWindow;
use serde::Deserialize;
use tracing::info;
// endregion: --- Imports

pub const CONVERSATIONS_PER_PAGE: i64 = 10;
const CATEGORY_MAX_LENGTH: usize = 100;

// region:    --- Commands

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCommand {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackCommand {
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntryCommand {
    pub category: String,
    pub language: String,
    pub examples: Vec<String>,
    pub responses: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEntryCommand {
    pub examples: Option<Vec<String>>,
    pub responses: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryFilter {
    pub language: Option<String>,
}

// endregion: --- Commands

// region:    --- Validation

/// Feedback must name a message and be `helpful` or `not_helpful`.
pub fn validate_feedback(cmd: &FeedbackCommand) -> AppResult<(i64, &str)> {
    match (cmd.message_id, cmd.feedback.as_deref()) {
        (Some(id), Some(feedback @ ("helpful" | "not_helpful"))) => Ok((id, feedback)),
        _ => Err(AppError::Validation("Invalid feedback data".to_string())),
    }
}

fn validate_language(language: &str) -> AppResult<()> {
    match language {
        "ar" | "en" => Ok(()),
        _ => Err(AppError::Validation(
            "Language must be 'ar' or 'en'.".to_string(),
        )),
    }
}

/// Trimmed, non-empty phrases.
fn clean_phrases(phrases: Vec<String>, field: &str) -> AppResult<Vec<String>> {
    let cleaned: Vec<String> = phrases
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if cleaned.is_empty() {
        return Err(AppError::Validation(format!(
            "At least one {} is required.",
            field
        )));
    }
    Ok(cleaned)
}

pub fn validate_new_entry(cmd: CreateEntryCommand) -> AppResult<CreateEntryCommand> {
    let category = cmd.category.trim().to_string();
    if category.is_empty() || category.chars().count() > CATEGORY_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "Category must be between 1 and {} characters.",
            CATEGORY_MAX_LENGTH
        )));
    }
    validate_language(&cmd.language)?;
    Ok(CreateEntryCommand {
        category,
        language: cmd.language,
        examples: clean_phrases(cmd.examples, "example")?,
        responses: clean_phrases(cmd.responses, "response")?,
        is_active: cmd.is_active,
    })
}

fn require_staff(user: &User) -> AppResult<()> {
    if user.is_staff {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only staff can manage the knowledge base.".to_string(),
        ))
    }
}

// endregion: --- Validation

/// Feedback is only logged.
pub async fn record_feedback(db_manager: &DatabaseManager, cmd: &FeedbackCommand) -> AppResult<()> {
    let (message_id, feedback) = validate_feedback(cmd)?;
    let exists = sqlx::query_scalar::<_, bool>(queries::CHAT_MESSAGE_EXISTS)
        .bind(message_id)
        .fetch_one(db_manager.pool())
        .await?;
    if !exists {
        return Err(AppError::NotFound("Message not found.".to_string()));
    }
    info!(
        "{:<12} --> Feedback received for message {}: {}",
        "Chatbot", message_id, feedback
    );
    Ok(())
}

pub async fn history(
    db_manager: &DatabaseManager,
    user_id: i64,
    raw_page: Option<&str>,
) -> AppResult<ChatHistoryView> {
    let pool = db_manager.pool();
    let count = sqlx::query_scalar::<_, i64>(queries::COUNT_USER_CONVERSATIONS)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    let window = PageWindow::resolve(raw_page, count, CONVERSATIONS_PER_PAGE);
    let conversations = sqlx::query_as::<_, ChatConversation>(queries::LIST_USER_CONVERSATIONS)
        .bind(user_id)
        .bind(window.limit())
        .bind(window.offset())
        .fetch_all(pool)
        .await?;
    Ok(ChatHistoryView {
        conversations: window.into_page(conversations),
    })
}

pub async fn conversation_detail(
    db_manager: &DatabaseManager,
    user_id: i64,
    conversation_id: i64,
) -> AppResult<ConversationDetail> {
    let pool = db_manager.pool();
    let conversation = sqlx::query_as::<_, ChatConversation>(queries::GET_USER_CONVERSATION)
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))?;
    let messages = sqlx::query_as::<_, ChatMessage>(queries::LIST_CONVERSATION_MESSAGES)
        .bind(conversation.id)
        .fetch_all(pool)
        .await?;
    Ok(ConversationDetail {
        conversation,
        messages,
    })
}

// region:    --- Knowledge Base Management

pub async fn list_entries(
    db_manager: &DatabaseManager,
    user: &User,
    filter: EntryFilter,
) -> AppResult<Vec<KnowledgeBaseEntry>> {
    require_staff(user)?;
    if let Some(language) = &filter.language {
        validate_language(language)?;
    }
    let entries = sqlx::query_as::<_, KnowledgeBaseEntry>(queries::LIST_ENTRIES)
        .bind(filter.language)
        .fetch_all(db_manager.pool())
        .await?;
    Ok(entries)
}

pub async fn create_entry(
    db_manager: &DatabaseManager,
    user: &User,
    cmd: CreateEntryCommand,
) -> AppResult<KnowledgeBaseEntry> {
    require_staff(user)?;
    let cmd = validate_new_entry(cmd)?;
    let entry = sqlx::query_as::<_, KnowledgeBaseEntry>(queries::INSERT_ENTRY)
        .bind(&cmd.category)
        .bind(&cmd.language)
        .bind(&cmd.examples)
        .bind(&cmd.responses)
        .bind(cmd.is_active)
        .fetch_one(db_manager.pool())
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict { .. } => AppError::conflict(
                "DUPLICATE_ENTRY",
                "An entry for this category and language already exists.",
            ),
            other => other,
        })?;
    info!(
        "{:<12} --> Knowledge base entry {} ({}) created",
        "Chatbot", entry.category, entry.language
    );
    Ok(entry)
}

pub async fn update_entry(
    db_manager: &DatabaseManager,
    user: &User,
    entry_id: i64,
    cmd: UpdateEntryCommand,
) -> AppResult<KnowledgeBaseEntry> {
    require_staff(user)?;
    let examples = cmd
        .examples
        .map(|e| clean_phrases(e, "example"))
        .transpose()?;
    let responses = cmd
        .responses
        .map(|r| clean_phrases(r, "response"))
        .transpose()?;

    sqlx::query_as::<_, KnowledgeBaseEntry>(queries::UPDATE_ENTRY)
        .bind(entry_id)
        .bind(examples)
        .bind(responses)
        .bind(cmd.is_active)
        .fetch_optional(db_manager.pool())
        .await?
        .ok_or_else(|| AppError::NotFound("Knowledge base entry not found.".to_string()))
}

// endregion: --- Knowledge Base Management

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(category: &str, language: &str) -> CreateEntryCommand {
        CreateEntryCommand {
            category: category.to_string(),
            language: language.to_string(),
            examples: vec![" opening hours ".to_string(), "  ".to_string()],
            responses: vec!["We never close.".to_string()],
            is_active: true,
        }
    }

    #[test]
    fn test_feedback_validation() {
        let ok = FeedbackCommand {
            message_id: Some(3),
            feedback: Some("helpful".to_string()),
        };
        assert_eq!(validate_feedback(&ok).unwrap(), (3, "helpful"));

        let bad_value = FeedbackCommand {
            message_id: Some(3),
            feedback: Some("meh".to_string()),
        };
        assert!(validate_feedback(&bad_value).is_err());

        let no_id = FeedbackCommand {
            message_id: None,
            feedback: Some("not_helpful".to_string()),
        };
        assert!(validate_feedback(&no_id).is_err());
    }

    #[test]
    fn test_new_entry_is_cleaned() {
        let cmd = validate_new_entry(entry("  hours ", "en")).unwrap();
        assert_eq!(cmd.category, "hours");
        assert_eq!(cmd.examples, vec!["opening hours"]);
    }

    #[test]
    fn test_new_entry_rejects_bad_input() {
        assert!(validate_new_entry(entry("hours", "fr")).is_err());
        assert!(validate_new_entry(entry("   ", "en")).is_err());

        let mut no_responses = entry("hours", "en");
        no_responses.responses = vec![" ".to_string()];
        assert!(validate_new_entry(no_responses).is_err());
    }
}
