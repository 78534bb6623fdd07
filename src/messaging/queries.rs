/// Messages of a payment thread, oldest first
pub const LIST_THREAD_MESSAGES: &str =
    "SELECT * FROM messages WHERE payment_id = $1 ORDER BY created_at ASC, id ASC";

/// Mark messages addressed to a user as read
pub const MARK_THREAD_READ: &str = r#"
    UPDATE messages SET is_read = TRUE
    WHERE payment_id = $1 AND receiver_id = $2 AND is_read = FALSE
"#;

/// New message
pub const INSERT_MESSAGE: &str = r#"
    INSERT INTO messages (payment_id, sender_id, receiver_id, content)
    VALUES ($1, $2, $3, $4)
    RETURNING *
"#;

/// Completed payments where the user is buyer or seller
pub const LIST_INBOX_PAYMENTS: &str = r#"
    SELECT p.*, a.title AS auction_title, a.user_id AS seller_id
    FROM payments p
    JOIN auctions a ON a.id = p.auction_id
    WHERE p.status = 'completed' AND (p.user_id = $1 OR a.user_id = $1)
"#;

/// Newest message of a thread
pub const LATEST_MESSAGE: &str = r#"
    SELECT * FROM messages WHERE payment_id = $1
    ORDER BY created_at DESC, id DESC
    LIMIT 1
"#;

/// Unread messages addressed to a user in a thread
pub const COUNT_UNREAD_IN_THREAD: &str = r#"
    SELECT COUNT(*) FROM messages
    WHERE payment_id = $1 AND receiver_id = $2 AND is_read = FALSE
"#;
