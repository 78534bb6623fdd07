// region:    --- Imports
use crate::state::AppState;
use crate::{accounts, auctions, chatbot, media, messaging, notifications, payments};
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
// endregion: --- Imports

/// Request bodies above this size are rejected before reaching a handler.
const BODY_LIMIT: usize = 1024 * 1024 * 20;

fn account_routes() -> Router<AppState> {
    use accounts::handlers::*;
    Router::new()
        .route("/accounts/register", post(handle_register))
        .route("/accounts/login", post(handle_login))
        .route("/accounts/logout", post(handle_logout))
        .route("/accounts/profile", get(handle_profile).put(handle_edit_profile))
        .route("/accounts/profile/picture", post(media::handle_upload_profile_picture))
        .route("/accounts/password", put(handle_change_password))
        .route(
            "/accounts/security-questions",
            get(handle_get_security_questions).put(handle_set_security_questions),
        )
        .route("/accounts/security-questions/all", get(handle_list_security_questions))
        .route("/profile/:username", get(handle_public_profile))
        .route("/profile/:username/rate", post(handle_submit_rating))
        .route("/profile/:username/ratings", get(handle_user_ratings))
}

fn auction_routes() -> Router<AppState> {
    use auctions::handlers::*;
    Router::new()
        .route("/", get(handle_home))
        .route("/auctions", get(handle_index).post(handle_create_auction))
        .route("/auctions/mine", get(handle_my_auctions))
        .route("/auctions/images", post(media::handle_upload_auction_image))
        .route("/auction/:id", get(handle_get_auction).delete(handle_delete))
        .route("/auction/:id/bids", get(handle_get_bid_history))
        .route("/auction/:id/close", post(handle_close))
        .route("/bid", post(handle_bid))
        .route("/comment", post(handle_comment))
        .route("/categories", get(handle_categories))
        .route("/categories/:category", get(handle_category_page))
        .route("/watchlist", get(handle_watchlist).post(handle_watchlist_add))
        .route("/watchlist/:id", delete(handle_watchlist_remove))
}

fn notification_routes() -> Router<AppState> {
    use notifications::handlers::*;
    Router::new()
        .route("/notifications", get(handle_list))
        .route("/notifications/dropdown", get(handle_dropdown))
        .route("/notifications/read-all", post(handle_mark_all_read))
        .route(
            "/notifications/preferences",
            get(handle_get_preferences).put(handle_update_preferences),
        )
        .route("/notifications/:id", get(handle_detail).delete(handle_delete))
        .route("/notifications/:id/read", post(handle_mark_read))
        .route("/notifications/:id/unread", post(handle_mark_unread))
}

fn messaging_routes() -> Router<AppState> {
    use messaging::handlers::*;
    Router::new()
        .route("/messages/inbox", get(handle_inbox))
        .route("/messages/thread/:payment_id", get(handle_thread).post(handle_send))
}

fn payment_routes() -> Router<AppState> {
    use payments::handlers::*;
    Router::new()
        .route("/payments/process/:auction_id", post(handle_process))
        .route("/payments/success/:id", get(handle_success))
        .route("/payments/canceled/:id", get(handle_canceled))
        .route("/payments/webhook", post(handle_webhook))
        .route("/payments/history", get(handle_history))
        .route("/payments/seller", get(handle_seller_payments))
        .route("/payments/receipt/:id", get(handle_receipt))
}

fn chatbot_routes() -> Router<AppState> {
    use chatbot::handlers::*;
    Router::new()
        .route("/chatbot/api/chat", post(handle_chat))
        .route("/chatbot/api/feedback", post(handle_feedback))
        .route("/chatbot/history", get(handle_history))
        .route("/chatbot/conversation/:id", get(handle_conversation))
        .route(
            "/chatbot/knowledge-base",
            get(handle_list_entries).post(handle_create_entry),
        )
        .route("/chatbot/knowledge-base/:id", put(handle_update_entry))
}

/// Every HTTP route of the service, with uploaded media served under its prefix.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let media = ServeDir::new(&state.media.config().root);
    let media_prefix = format!("/{}", state.media.config().url_prefix.trim_matches('/'));

    Router::new()
        .merge(account_routes())
        .merge(auction_routes())
        .merge(notification_routes())
        .merge(messaging_routes())
        .merge(payment_routes())
        .merge(chatbot_routes())
        .nest_service(&media_prefix, media)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
