// region:    --- Imports
use super::commands;
use super::model::PreferencesUpdate;
use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::pagination::PageQuery;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

// endregion: --- Imports

/// Notifications, paginated
pub async fn handle_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(
        commands::list(&state.db, auth.id(), params.page.as_deref()).await?,
    ))
}

/// One notification, marked read
pub async fn handle_detail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(
        commands::detail(&state.db, auth.id(), notification_id).await?,
    ))
}

/// Mark read
pub async fn handle_mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let unread_count = commands::set_read(&state.db, auth.id(), notification_id, true).await?;
    Ok(Json(json!({ "success": true, "unread_count": unread_count })))
}

/// Mark unread
pub async fn handle_mark_unread(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let unread_count = commands::set_read(&state.db, auth.id(), notification_id, false).await?;
    Ok(Json(json!({ "success": true, "unread_count": unread_count })))
}

/// Delete a notification
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let unread_count = commands::delete(&state.db, auth.id(), notification_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Notification deleted successfully.",
        "unread_count": unread_count,
    })))
}

/// Mark all read
pub async fn handle_mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    commands::mark_all_read(&state.db, auth.id()).await?;
    Ok(Json(json!({
        "success": true,
        "message": "All notifications marked as read.",
        "unread_count": 0,
    })))
}

/// Notification preferences
pub async fn handle_get_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    Ok(Json(commands::preferences(&state.db, auth.id()).await?))
}

/// Update notification preferences
pub async fn handle_update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(update): Json<PreferencesUpdate>,
) -> AppResult<impl IntoResponse> {
    let preferences = commands::update_preferences(&state.db, auth.id(), update).await?;
    Ok(Json(json!({
        "message": "Notification preferences updated successfully.",
        "preferences": preferences,
    })))
}

/// Unread count and latest unread
pub async fn handle_dropdown(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    Ok(Json(commands::dropdown(&state.db, auth.id()).await?))
}
