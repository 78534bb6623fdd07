use super::commands::{self, SendMessageCommand};
use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Messages of a payment thread
pub async fn handle_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(payment_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(commands::thread(&state.db, auth.id(), payment_id).await?))
}

/// Send a message in a payment thread
pub async fn handle_send(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(payment_id): Path<i64>,
    Json(cmd): Json<SendMessageCommand>,
) -> AppResult<impl IntoResponse> {
    let message = commands::send(&state.db, auth.id(), payment_id, cmd).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": message }))))
}

/// Threads the caller takes part in
pub async fn handle_inbox(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let threads = commands::inbox(&state.db, auth.id()).await?;
    Ok(Json(json!({ "title": "Message Inbox", "threads": threads })))
}
