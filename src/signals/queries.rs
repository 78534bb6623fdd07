/// Auction id, title and owner
pub const GET_AUCTION_REF: &str = "SELECT id, title, user_id FROM auctions WHERE id = $1";

/// Username by id
pub const GET_USERNAME: &str = "SELECT username FROM users WHERE id = $1";

/// Top bidder before a given bid, ignoring the new bidder
pub const GET_PREVIOUS_TOP_BIDDER: &str = r#"
    SELECT user_id FROM bids
    WHERE auction_id = $1 AND id <> $2 AND user_id <> $3
    ORDER BY amount DESC, created_at ASC
    LIMIT 1
"#;

/// Highest bid with its bidder
pub const GET_HIGHEST_BID: &str = r#"
    SELECT user_id, amount FROM bids
    WHERE auction_id = $1
    ORDER BY amount DESC, created_at ASC
    LIMIT 1
"#;

/// Buyer, seller, amount and auction title of a payment
pub const GET_PAYMENT_PARTIES: &str = r#"
    SELECT p.user_id, a.user_id, p.amount, a.title
    FROM payments p
    JOIN auctions a ON a.id = p.auction_id
    WHERE p.id = $1
"#;
