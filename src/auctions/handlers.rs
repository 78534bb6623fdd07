// region:    --- Imports
use super::commands::{
    self, CommentCommand, CreateAuctionCommand, PlaceBidCommand, WatchlistCommand,
};
use super::reads;
use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::media::MediaKind;
use crate::pagination::PageQuery;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// Home page listings
pub async fn handle_home(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(reads::home(&state.db).await?))
}

/// Open auctions, paginated
pub async fn handle_index(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(reads::index(&state.db, params.page.as_deref()).await?))
}

/// Auction detail
pub async fn handle_get_auction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(auction_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(reads::auction_detail(&state.db, auth.id(), auction_id).await?))
}

/// Bid history of an auction
pub async fn handle_get_bid_history(
    State(state): State<AppState>,
    Path(auction_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(reads::get_bid_history(&state.db, auction_id).await?))
}

/// Categories with open counts
pub async fn handle_categories(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(reads::categories(&state.db).await?))
}

/// Open auctions in one category
pub async fn handle_category_page(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(reads::category_page(&state.db, &category).await?))
}

/// Caller's own auctions
pub async fn handle_my_auctions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    Ok(Json(reads::my_auctions(&state.db, auth.id()).await?))
}

/// Caller's watchlist
pub async fn handle_watchlist(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    Ok(Json(reads::watchlist(&state.db, auth.id()).await?))
}

// endregion: --- Query Handlers

// region:    --- Command Handlers

/// Create an auction
pub async fn handle_create_auction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(cmd): Json<CreateAuctionCommand>,
) -> AppResult<impl IntoResponse> {
    let image_prefix = state.media.public_prefix(MediaKind::AuctionImage);
    let auction = commands::create_auction(&state.db, auth.id(), cmd, &image_prefix).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Auction Created Successfully",
            "auction": auction,
        })),
    ))
}

/// Bid request
pub async fn handle_bid(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(cmd): Json<PlaceBidCommand>,
) -> AppResult<impl IntoResponse> {
    info!("{:<12} --> Bid request: {:?}", "Handler", cmd);
    let outcome = commands::place_bid(&state.db, auth.id(), cmd).await?;
    Ok(Json(json!({
        "message": outcome.message,
        "current_bid": outcome.bid.amount,
        "bid": outcome.bid,
    })))
}

/// Comment on an auction
pub async fn handle_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(cmd): Json<CommentCommand>,
) -> AppResult<impl IntoResponse> {
    let comment = commands::add_comment(&state.db, auth.id(), cmd).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Close an auction
pub async fn handle_close(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(auction_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let auction = commands::close_auction(&state.db, auth.id(), auction_id).await?;
    Ok(Json(json!({
        "message": "Auction closed.",
        "auction": auction,
    })))
}

/// Delete an auction
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(auction_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let message = commands::delete_auction(&state.db, auth.id(), auction_id).await?;
    Ok(Json(json!({ "message": message })))
}

/// Add to watchlist
pub async fn handle_watchlist_add(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(cmd): Json<WatchlistCommand>,
) -> AppResult<impl IntoResponse> {
    commands::watchlist_add(&state.db, auth.id(), cmd.auction_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Auction added to watchlist" })),
    ))
}

/// Remove from watchlist
pub async fn handle_watchlist_remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(auction_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    commands::watchlist_remove(&state.db, auth.id(), auction_id).await?;
    Ok(Json(json!({ "message": "Auction removed from your watchlist" })))
}

// endregion: --- Command Handlers
