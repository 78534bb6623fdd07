// region:    --- Imports
use super::bot::SmartChatBot;
use super::commands::{self, ChatCommand, CreateEntryCommand, EntryFilter, FeedbackCommand, UpdateEntryCommand};
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::{AppError, AppResult};
use crate::pagination::PageQuery;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::json;
// endregion: --- Imports

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|_| AppError::rejected("INVALID_JSON", "Invalid JSON data"))
}

/// Chat message
pub async fn handle_chat(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let cmd: ChatCommand = parse_body(&body)?;
    if cmd.message.trim().is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }

    let bot = SmartChatBot::new(&state.db, &state.chat_models);
    let reply = bot
        .respond(
            cmd.session_id.as_deref(),
            viewer.as_ref().map(AuthUser::id),
            &cmd.message,
        )
        .await;

    Ok(Json(json!({
        "success": true,
        "response": reply.response,
        "confidence": reply.confidence,
        "response_time": reply.response_time,
        "language": reply.language,
        "source": reply.source,
        "category": reply.category,
        "session_id": reply.session_id,
    })))
}

/// Feedback on a bot message
pub async fn handle_feedback(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let cmd: FeedbackCommand = parse_body(&body)?;
    commands::record_feedback(&state.db, &cmd).await?;
    Ok(Json(json!({ "success": true, "message": "Feedback received" })))
}

/// Caller's conversations
pub async fn handle_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(
        commands::history(&state.db, auth.id(), params.page.as_deref()).await?,
    ))
}

/// One conversation with its messages
pub async fn handle_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(
        commands::conversation_detail(&state.db, auth.id(), conversation_id).await?,
    ))
}

/// Knowledge base entries
pub async fn handle_list_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<EntryFilter>,
) -> AppResult<impl IntoResponse> {
    let entries = commands::list_entries(&state.db, &auth.user, filter).await?;
    Ok(Json(json!({ "entries": entries })))
}

/// New knowledge base entry
pub async fn handle_create_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(cmd): Json<CreateEntryCommand>,
) -> AppResult<impl IntoResponse> {
    let entry = commands::create_entry(&state.db, &auth.user, cmd).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Edit a knowledge base entry
pub async fn handle_update_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<i64>,
    Json(cmd): Json<UpdateEntryCommand>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(
        commands::update_entry(&state.db, &auth.user, entry_id, cmd).await?,
    ))
}
