/// Payment by id
pub const GET_PAYMENT: &str = "SELECT * FROM payments WHERE id = $1";

/// Payment by Stripe intent, locked for the webhook transaction
pub const GET_PAYMENT_BY_INTENT_FOR_UPDATE: &str =
    "SELECT * FROM payments WHERE stripe_payment_intent_id = $1 FOR UPDATE";

/// Completed or pending payment of a buyer for an auction, completed first
pub const FIND_OPEN_PAYMENT: &str = r#"
    SELECT * FROM payments
    WHERE user_id = $1 AND auction_id = $2 AND status IN ('completed', 'pending')
    ORDER BY (status = 'completed') DESC, created_at DESC
    LIMIT 1
"#;

/// New pending payment
pub const INSERT_PAYMENT: &str = r#"
    INSERT INTO payments (user_id, auction_id, amount, status)
    VALUES ($1, $2, $3, 'pending')
    RETURNING *
"#;

/// Store the Stripe intent id
pub const SET_PAYMENT_INTENT: &str = r#"
    UPDATE payments SET stripe_payment_intent_id = $2, updated_at = NOW()
    WHERE id = $1
    RETURNING *
"#;

/// Move a payment to a new status
pub const SET_PAYMENT_STATUS: &str = r#"
    UPDATE payments SET status = $2, updated_at = NOW()
    WHERE id = $1
    RETURNING *
"#;

/// Buyer's payments, newest first
pub const LIST_BUYER_PAYMENTS: &str = r#"
    SELECT p.id, p.user_id, p.auction_id, a.title AS auction_title, p.amount, p.status, p.created_at
    FROM payments p
    JOIN auctions a ON a.id = p.auction_id
    WHERE p.user_id = $1
    ORDER BY p.created_at DESC
"#;

/// Payments for a seller's auctions, newest first
pub const LIST_SELLER_PAYMENTS: &str = r#"
    SELECT p.id, p.user_id, p.auction_id, a.title AS auction_title, p.amount, p.status, p.created_at
    FROM payments p
    JOIN auctions a ON a.id = p.auction_id
    WHERE a.user_id = $1
    ORDER BY p.created_at DESC
"#;

/// Public user by id
pub const GET_PUBLIC_USER: &str =
    "SELECT id, username, first_name, last_name, date_joined FROM users WHERE id = $1";
