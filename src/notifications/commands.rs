// region:    --- Imports
use super::model::{
    DropdownView, Notification, NotificationListView, NotificationPreference, NotificationView,
    PreferencesUpdate,
};
use super::queries;
use super::service::get_or_create_preferences;
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::pagination::PageWindow;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
// endregion: --- Imports

pub const NOTIFICATIONS_PER_PAGE: i64 = 10;
const DROPDOWN_LIMIT: i64 = 5;

fn not_found() -> AppError {
    AppError::NotFound("Notification not found.".to_string())
}

pub async fn unread_count(pool: &PgPool, user_id: i64) -> AppResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(queries::COUNT_UNREAD)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn list(
    db_manager: &DatabaseManager,
    user_id: i64,
    raw_page: Option<&str>,
) -> AppResult<NotificationListView> {
    let pool = db_manager.pool();
    let count = sqlx::query_scalar::<_, i64>(queries::COUNT_NOTIFICATIONS)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    let window = PageWindow::resolve(raw_page, count, NOTIFICATIONS_PER_PAGE);

    let rows = sqlx::query_as::<_, Notification>(queries::LIST_NOTIFICATIONS_PAGE)
        .bind(user_id)
        .bind(window.limit())
        .bind(window.offset())
        .fetch_all(pool)
        .await?;
    let now = Utc::now();
    let items = rows
        .into_iter()
        .map(|n| NotificationView::at(n, now))
        .collect();

    let mut conn = pool.acquire().await?;
    let preferences = get_or_create_preferences(&mut conn, user_id).await?;
    drop(conn);

    Ok(NotificationListView {
        notifications: window.into_page(items),
        unread_count: unread_count(pool, user_id).await?,
        preferences,
    })
}

/// Opening a notification marks it read.
pub async fn detail(
    db_manager: &DatabaseManager,
    user_id: i64,
    notification_id: i64,
) -> AppResult<NotificationView> {
    let pool = db_manager.pool();
    let notification = sqlx::query_as::<_, Notification>(queries::GET_NOTIFICATION)
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)?;

    let notification = if notification.is_read {
        notification
    } else {
        sqlx::query_as::<_, Notification>(queries::SET_READ)
            .bind(notification_id)
            .bind(user_id)
            .bind(true)
            .fetch_one(pool)
            .await?
    };
    Ok(NotificationView::at(notification, Utc::now()))
}

/// Set the read flag; returns the new unread count.
pub async fn set_read(
    db_manager: &DatabaseManager,
    user_id: i64,
    notification_id: i64,
    is_read: bool,
) -> AppResult<i64> {
    let pool = db_manager.pool();
    sqlx::query_as::<_, Notification>(queries::SET_READ)
        .bind(notification_id)
        .bind(user_id)
        .bind(is_read)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)?;
    unread_count(pool, user_id).await
}

/// Soft delete; returns the new unread count.
pub async fn delete(
    db_manager: &DatabaseManager,
    user_id: i64,
    notification_id: i64,
) -> AppResult<i64> {
    let pool = db_manager.pool();
    sqlx::query_as::<_, Notification>(queries::SOFT_DELETE)
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)?;
    info!(
        "{:<12} --> Notification {} deleted by user id: {}",
        "Command", notification_id, user_id
    );
    unread_count(pool, user_id).await
}

pub async fn mark_all_read(db_manager: &DatabaseManager, user_id: i64) -> AppResult<u64> {
    let updated = sqlx::query(queries::MARK_ALL_READ)
        .bind(user_id)
        .execute(db_manager.pool())
        .await?
        .rows_affected();
    Ok(updated)
}

pub async fn preferences(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> AppResult<NotificationPreference> {
    let mut conn = db_manager.pool().acquire().await?;
    get_or_create_preferences(&mut conn, user_id).await
}

pub async fn update_preferences(
    db_manager: &DatabaseManager,
    user_id: i64,
    update: PreferencesUpdate,
) -> AppResult<NotificationPreference> {
    let mut tx = db_manager.pool().begin().await?;
    get_or_create_preferences(&mut tx, user_id).await?;
    let prefs = sqlx::query_as::<_, NotificationPreference>(queries::UPDATE_PREFERENCES)
        .bind(user_id)
        .bind(update.email_bid)
        .bind(update.email_outbid)
        .bind(update.email_auction_won)
        .bind(update.email_auction_ended)
        .bind(update.email_comment)
        .bind(update.email_rating)
        .bind(update.email_message)
        .bind(update.email_system)
        .bind(update.app_bid)
        .bind(update.app_outbid)
        .bind(update.app_auction_won)
        .bind(update.app_auction_ended)
        .bind(update.app_comment)
        .bind(update.app_rating)
        .bind(update.app_message)
        .bind(update.app_system)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(prefs)
}

/// Five newest unread notifications
pub async fn dropdown(db_manager: &DatabaseManager, user_id: i64) -> AppResult<DropdownView> {
    let pool = db_manager.pool();
    let rows = sqlx::query_as::<_, Notification>(queries::LIST_RECENT_UNREAD)
        .bind(user_id)
        .bind(DROPDOWN_LIMIT)
        .fetch_all(pool)
        .await?;
    let now = Utc::now();
    Ok(DropdownView {
        notifications: rows.into_iter().map(|n| NotificationView::at(n, now)).collect(),
        unread_count: unread_count(pool, user_id).await?,
    })
}
