use super::knowledge_base::{KNOWLEDGE_BASE_AR, KNOWLEDGE_BASE_EN};
use super::model::{
    SETTING_CONFIDENCE_THRESHOLD, SETTING_DEFAULT_LANGUAGE, SETTING_ENABLE_AI_FALLBACK,
    SETTING_MAX_RESPONSE_LENGTH,
};
use super::queries;
use super::text::Language;
use crate::database::DatabaseManager;
use crate::error::AppResult;
use tracing::info;

const DEFAULT_SETTINGS: &[(&str, &str, &str)] = &[
    (
        SETTING_CONFIDENCE_THRESHOLD,
        "0.4",
        "Minimum confidence score for knowledge base matches",
    ),
    (
        SETTING_MAX_RESPONSE_LENGTH,
        "500",
        "Maximum length of chatbot responses",
    ),
    (
        SETTING_ENABLE_AI_FALLBACK,
        "true",
        "Enable AI model fallback when no knowledge base match found",
    ),
    (
        SETTING_DEFAULT_LANGUAGE,
        "ar",
        "Default language for new conversations",
    ),
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub cleared: u64,
    pub created: usize,
    pub updated: usize,
    pub settings_created: u64,
}

/// Copy the built-in intents into `chatbot_knowledge_base` and add missing settings.
pub async fn populate_knowledge_base(db_manager: &DatabaseManager, clear: bool) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();
    let mut tx = db_manager.pool().begin().await?;

    if clear {
        report.cleared = sqlx::query(queries::DELETE_ALL_ENTRIES)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        info!("{:<12} --> Knowledge base cleared ({} rows)", "Seed", report.cleared);
    }

    for (language, table) in [
        (Language::Arabic, KNOWLEDGE_BASE_AR),
        (Language::English, KNOWLEDGE_BASE_EN),
    ] {
        for intent in table {
            let created = sqlx::query_scalar::<_, bool>(queries::UPSERT_ENTRY)
                .bind(intent.category)
                .bind(language.code())
                .bind(intent.examples)
                .bind(intent.responses)
                .fetch_one(&mut *tx)
                .await?;
            if created {
                report.created += 1;
            } else {
                report.updated += 1;
            }
            info!(
                "{:<12} --> {}: {} ({})",
                "Seed",
                if created { "Created" } else { "Updated" },
                intent.category,
                language.code()
            );
        }
    }

    for (key, value, description) in DEFAULT_SETTINGS {
        report.settings_created += sqlx::query(queries::INSERT_SETTING_IF_MISSING)
            .bind(*key)
            .bind(*value)
            .bind(*description)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }
    tx.commit().await?;

    info!(
        "{:<12} --> Populated knowledge base with {} Arabic and {} English categories",
        "Seed",
        KNOWLEDGE_BASE_AR.len(),
        KNOWLEDGE_BASE_EN.len()
    );
    Ok(report)
}
