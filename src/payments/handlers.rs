// region:    --- Imports
use super::commands::{self, Checkout};
use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::info;
// endregion: --- Imports

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Start checkout for a won auction
pub async fn handle_process(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(auction_id): Path<i64>,
) -> AppResult<Response> {
    info!("{:<12} --> Checkout for auction {}", "Handler", auction_id);
    let checkout = commands::process(
        &state.db,
        state.payments.as_ref(),
        &state.config.stripe,
        auth.id(),
        auction_id,
    )
    .await?;

    let response = match checkout {
        Checkout::Ready(view) => Json(view).into_response(),
        Checkout::AlreadyPaid(payment) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "You have already paid for this auction.",
                "code": "ALREADY_PAID",
                "payment_id": payment.id,
            })),
        )
            .into_response(),
    };
    Ok(response)
}

/// Payment success page
pub async fn handle_success(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(payment_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(
        commands::payment_page(&state.db, auth.id(), payment_id).await?,
    ))
}

/// Payment canceled page
pub async fn handle_canceled(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(payment_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let view = commands::payment_page(&state.db, auth.id(), payment_id).await?;
    Ok(Json(json!({
        "message": "Your payment was canceled.",
        "payment": view.payment,
        "auction": view.auction,
    })))
}

/// Stripe calls this without a session; the raw body is needed for the signature.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    commands::handle_webhook(&state.db, &state.config.stripe, &body, signature).await?;
    Ok(StatusCode::OK)
}

/// Payments made by the caller
pub async fn handle_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    Ok(Json(commands::history(&state.db, auth.id()).await?))
}

/// Payments received by the caller
pub async fn handle_seller_payments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    Ok(Json(commands::seller_payments(&state.db, auth.id()).await?))
}

/// Receipt of a completed payment
pub async fn handle_receipt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(payment_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(commands::receipt(&state.db, auth.id(), payment_id).await?))
}
