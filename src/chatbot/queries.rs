/// Conversation by session id, created when missing
pub const UPSERT_CONVERSATION: &str = r#"
    INSERT INTO chat_conversations (session_id, user_id, language)
    VALUES ($1, $2, $3)
    ON CONFLICT (session_id) DO UPDATE SET updated_at = NOW()
    RETURNING *
"#;

/// Change a conversation's language
pub const UPDATE_CONVERSATION_LANGUAGE: &str = r#"
    UPDATE chat_conversations SET language = $2, updated_at = NOW()
    WHERE id = $1
"#;

/// Store one chat message
pub const INSERT_CHAT_MESSAGE: &str = r#"
    INSERT INTO chat_messages
        (conversation_id, message_type, content, response_time, confidence_score, knowledge_base_match)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING *
"#;

/// Active conversations of a user
pub const COUNT_USER_CONVERSATIONS: &str =
    "SELECT COUNT(*) FROM chat_conversations WHERE user_id = $1 AND is_active = TRUE";

/// Page of active conversations, most recently updated first
pub const LIST_USER_CONVERSATIONS: &str = r#"
    SELECT * FROM chat_conversations
    WHERE user_id = $1 AND is_active = TRUE
    ORDER BY updated_at DESC
    LIMIT $2 OFFSET $3
"#;

/// Conversation owned by a user
pub const GET_USER_CONVERSATION: &str =
    "SELECT * FROM chat_conversations WHERE id = $1 AND user_id = $2";

/// Messages of a conversation, oldest first
pub const LIST_CONVERSATION_MESSAGES: &str = r#"
    SELECT * FROM chat_messages WHERE conversation_id = $1
    ORDER BY timestamp ASC, id ASC
"#;

/// Chat message existence
pub const CHAT_MESSAGE_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM chat_messages WHERE id = $1)";

// region:    --- Knowledge Base

/// Active entries for a language
pub const LIST_ACTIVE_ENTRIES: &str = r#"
    SELECT * FROM chatbot_knowledge_base
    WHERE language = $1 AND is_active = TRUE
    ORDER BY id
"#;

/// Every entry, optionally filtered by language
pub const LIST_ENTRIES: &str = r#"
    SELECT * FROM chatbot_knowledge_base
    WHERE ($1::VARCHAR IS NULL OR language = $1)
    ORDER BY language, category
"#;

/// New entry
pub const INSERT_ENTRY: &str = r#"
    INSERT INTO chatbot_knowledge_base (category, language, examples, responses, is_active)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING *
"#;

/// Partial entry update
pub const UPDATE_ENTRY: &str = r#"
    UPDATE chatbot_knowledge_base SET
        examples = COALESCE($2, examples),
        responses = COALESCE($3, responses),
        is_active = COALESCE($4, is_active),
        updated_at = NOW()
    WHERE id = $1
    RETURNING *
"#;

/// Seed upsert; `created` is true for new rows
pub const UPSERT_ENTRY: &str = r#"
    INSERT INTO chatbot_knowledge_base (category, language, examples, responses, is_active)
    VALUES ($1, $2, $3, $4, TRUE)
    ON CONFLICT (category, language) DO UPDATE SET
        examples = EXCLUDED.examples,
        responses = EXCLUDED.responses,
        updated_at = NOW()
    RETURNING (xmax = 0) AS created
"#;

/// Remove every entry
pub const DELETE_ALL_ENTRIES: &str = "DELETE FROM chatbot_knowledge_base";

// endregion: --- Knowledge Base

// region:    --- Settings

/// Active settings as key/value pairs
pub const LIST_ACTIVE_SETTINGS: &str =
    "SELECT key, value FROM chatbot_settings WHERE is_active = TRUE";

/// Setting created only when missing
pub const INSERT_SETTING_IF_MISSING: &str = r#"
    INSERT INTO chatbot_settings (key, value, description)
    VALUES ($1, $2, $3)
    ON CONFLICT (key) DO NOTHING
"#;

// endregion: --- Settings
