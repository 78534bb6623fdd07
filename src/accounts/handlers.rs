// region:    --- Imports
use super::commands::{
    self, ChangePasswordCommand, EditProfileCommand, LoginCommand, RegisterCommand,
    SecurityQuestionsCommand, SubmitRatingCommand,
};
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::AppResult;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::info;

// endregion: --- Imports

// region:    --- Session Handlers

/// Sign up and log in
pub async fn handle_register(
    State(state): State<AppState>,
    Json(cmd): Json<RegisterCommand>,
) -> AppResult<impl IntoResponse> {
    let grant = commands::register(&state.db, cmd, state.config.session.ttl_hours).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful! Welcome to Mazadi.",
            "token": grant.token,
            "expires_at": grant.expires_at,
            "user": grant.user,
        })),
    ))
}

/// Log in with username and password
pub async fn handle_login(
    State(state): State<AppState>,
    Json(cmd): Json<LoginCommand>,
) -> AppResult<impl IntoResponse> {
    let grant = commands::login(&state.db, cmd, state.config.session.ttl_hours).await?;
    Ok(Json(json!({
        "message": format!("Welcome back, {}!", grant.user.username),
        "token": grant.token,
        "expires_at": grant.expires_at,
        "user": grant.user,
    })))
}

/// End the current session
pub async fn handle_logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    commands::logout(&state.db, &auth.token).await?;
    info!("{:<12} --> User {} logged out", "Handler", auth.user.username);
    Ok(Json(json!({ "message": "You have been logged out successfully." })))
}

// endregion: --- Session Handlers

// region:    --- Profile Handlers

/// Own profile
pub async fn handle_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    Ok(Json(commands::profile(&state.db, &auth.user).await?))
}

/// Edit own profile
pub async fn handle_edit_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(cmd): Json<EditProfileCommand>,
) -> AppResult<impl IntoResponse> {
    let profile = commands::edit_profile(&state.db, &auth.user, cmd).await?;
    Ok(Json(json!({
        "message": "Your profile has been updated successfully.",
        "profile": profile,
    })))
}

/// Change password
pub async fn handle_change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(cmd): Json<ChangePasswordCommand>,
) -> AppResult<impl IntoResponse> {
    let revoked = commands::change_password(&state.db, &auth.user, &auth.token, cmd).await?;
    Ok(Json(json!({
        "message": "Your password has been changed successfully.",
        "revoked_sessions": revoked,
    })))
}

/// Own security questions
pub async fn handle_get_security_questions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    Ok(Json(commands::get_security_questions(&state.db, auth.id()).await?))
}

/// Replace own security answers
pub async fn handle_set_security_questions(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(cmd): Json<SecurityQuestionsCommand>,
) -> AppResult<impl IntoResponse> {
    commands::set_security_questions(&state.db, auth.id(), cmd).await?;
    Ok(Json(json!({
        "message": "Your security questions have been updated successfully.",
    })))
}

/// Every selectable security question
pub async fn handle_list_security_questions(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(commands::list_security_questions(state.db.pool()).await?))
}

// endregion: --- Profile Handlers

// region:    --- Rating Handlers

/// Public profile by username
pub async fn handle_public_profile(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let viewer_id = viewer.as_ref().map(AuthUser::id);
    Ok(Json(
        commands::public_profile(&state.db, viewer_id, &username).await?,
    ))
}

/// Rate a user
pub async fn handle_submit_rating(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
    Json(cmd): Json<SubmitRatingCommand>,
) -> AppResult<impl IntoResponse> {
    let outcome = commands::submit_rating(&state.db, &auth.user, &username, cmd).await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

/// Ratings a user received
pub async fn handle_user_ratings(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(commands::user_ratings(&state.db, &username).await?))
}

// endregion: --- Rating Handlers
