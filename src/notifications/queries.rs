/// Default preferences for a user
pub const INSERT_PREFERENCES: &str =
    "INSERT INTO notification_preferences (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING";

/// Preferences of a user
pub const GET_PREFERENCES: &str = "SELECT * FROM notification_preferences WHERE user_id = $1";

/// Partial preference update
pub const UPDATE_PREFERENCES: &str = r#"
    UPDATE notification_preferences SET
        email_bid = COALESCE($2, email_bid),
        email_outbid = COALESCE($3, email_outbid),
        email_auction_won = COALESCE($4, email_auction_won),
        email_auction_ended = COALESCE($5, email_auction_ended),
        email_comment = COALESCE($6, email_comment),
        email_rating = COALESCE($7, email_rating),
        email_message = COALESCE($8, email_message),
        email_system = COALESCE($9, email_system),
        app_bid = COALESCE($10, app_bid),
        app_outbid = COALESCE($11, app_outbid),
        app_auction_won = COALESCE($12, app_auction_won),
        app_auction_ended = COALESCE($13, app_auction_ended),
        app_comment = COALESCE($14, app_comment),
        app_rating = COALESCE($15, app_rating),
        app_message = COALESCE($16, app_message),
        app_system = COALESCE($17, app_system),
        updated_at = NOW()
    WHERE user_id = $1
    RETURNING *
"#;

/// New notification
pub const INSERT_NOTIFICATION: &str = r#"
    INSERT INTO notifications (user_id, title, message, notification_type, level, link, object_type, object_id)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    RETURNING *
"#;

/// Visible notifications of a user
pub const COUNT_NOTIFICATIONS: &str =
    "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_deleted = FALSE";

/// One page of visible notifications, newest first
pub const LIST_NOTIFICATIONS_PAGE: &str = r#"
    SELECT * FROM notifications
    WHERE user_id = $1 AND is_deleted = FALSE
    ORDER BY created_at DESC, id DESC
    LIMIT $2 OFFSET $3
"#;

/// Unread visible notifications of a user
pub const COUNT_UNREAD: &str =
    "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE AND is_deleted = FALSE";

/// Newest unread notifications
pub const LIST_RECENT_UNREAD: &str = r#"
    SELECT * FROM notifications
    WHERE user_id = $1 AND is_read = FALSE AND is_deleted = FALSE
    ORDER BY created_at DESC, id DESC
    LIMIT $2
"#;

/// Notification owned by a user
pub const GET_NOTIFICATION: &str = "SELECT * FROM notifications WHERE id = $1 AND user_id = $2";

/// Read flag of an owned notification
pub const SET_READ: &str = r#"
    UPDATE notifications SET is_read = $3, updated_at = NOW()
    WHERE id = $1 AND user_id = $2
    RETURNING *
"#;

/// Soft delete of an owned notification
pub const SOFT_DELETE: &str = r#"
    UPDATE notifications SET is_deleted = TRUE, updated_at = NOW()
    WHERE id = $1 AND user_id = $2
    RETURNING *
"#;

/// Mark everything read
pub const MARK_ALL_READ: &str = r#"
    UPDATE notifications SET is_read = TRUE, updated_at = NOW()
    WHERE user_id = $1 AND is_read = FALSE
"#;
