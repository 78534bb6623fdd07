/// Auction by id
pub const GET_AUCTION: &str = r#"
    SELECT id, title, description, price, category, created_at, image, image_url, is_close, user_id
    FROM auctions WHERE id = $1
"#;

/// Auction by id, row locked until the transaction ends
pub const GET_AUCTION_FOR_UPDATE: &str = r#"
    SELECT id, title, description, price, category, created_at, image, image_url, is_close, user_id
    FROM auctions WHERE id = $1
    FOR UPDATE
"#;

/// Total number of auctions
pub const COUNT_AUCTIONS: &str = "SELECT COUNT(*) FROM auctions";

/// One page of auctions, newest first
pub const LIST_AUCTIONS_PAGE: &str = r#"
    SELECT id, title, description, price, category, created_at, image, image_url, is_close, user_id
    FROM auctions
    ORDER BY created_at DESC, id DESC
    LIMIT $1 OFFSET $2
"#;

/// Open auctions with the highest price
pub const FEATURED_AUCTIONS: &str = r#"
    SELECT id, title, description, price, category, created_at, image, image_url, is_close, user_id
    FROM auctions
    WHERE is_close = FALSE
    ORDER BY price DESC, id DESC
    LIMIT $1
"#;

/// Categories by auction count
pub const TOP_CATEGORIES: &str = r#"
    SELECT category, COUNT(*) AS count
    FROM auctions
    GROUP BY category
    ORDER BY count DESC, category
    LIMIT $1
"#;

/// Categories in use, by name
pub const CATEGORY_COUNTS: &str = r#"
    SELECT category, COUNT(*) AS count
    FROM auctions
    GROUP BY category
    ORDER BY category
"#;

/// Auctions of one category, newest first
pub const LIST_CATEGORY_AUCTIONS: &str = r#"
    SELECT id, title, description, price, category, created_at, image, image_url, is_close, user_id
    FROM auctions
    WHERE category = $1
    ORDER BY created_at DESC, id DESC
"#;

/// Auctions of one owner, newest first
pub const LIST_USER_AUCTIONS: &str = r#"
    SELECT id, title, description, price, category, created_at, image, image_url, is_close, user_id
    FROM auctions
    WHERE user_id = $1
    ORDER BY created_at DESC, id DESC
"#;

/// Open auctions in the same category, excluding one
pub const RELATED_AUCTIONS: &str = r#"
    SELECT id, title, description, price, category, created_at, image, image_url, is_close, user_id
    FROM auctions
    WHERE category = $1 AND is_close = FALSE AND id <> $2
    ORDER BY created_at DESC, id DESC
    LIMIT $3
"#;

/// New auction
pub const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (title, description, price, category, image, image_url, user_id)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING id, title, description, price, category, created_at, image, image_url, is_close, user_id
"#;

/// Mark an auction closed
pub const CLOSE_AUCTION: &str = "UPDATE auctions SET is_close = TRUE WHERE id = $1 AND is_close = FALSE";

/// Remove an auction (bids, comments and watchlist entries cascade)
pub const DELETE_AUCTION: &str = "DELETE FROM auctions WHERE id = $1";

/// Highest bid of an auction
pub const GET_HIGHEST_BID: &str = r#"
    SELECT b.id, b.amount, b.user_id, u.username, b.created_at
    FROM bids b
    JOIN users u ON u.id = b.user_id
    WHERE b.auction_id = $1
    ORDER BY b.amount DESC, b.created_at ASC
    LIMIT 1
"#;

/// Highest bid amount, NULL without bids
pub const GET_HIGHEST_BID_AMOUNT: &str = "SELECT MAX(amount) FROM bids WHERE auction_id = $1";

/// Bid history, newest first
pub const GET_BID_HISTORY: &str = r#"
    SELECT b.id, b.amount, b.user_id, u.username, b.created_at
    FROM bids b
    JOIN users u ON u.id = b.user_id
    WHERE b.auction_id = $1
    ORDER BY b.created_at DESC, b.id DESC
"#;

/// New bid
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (amount, auction_id, user_id)
    VALUES ($1, $2, $3)
    RETURNING id, amount, auction_id, user_id, created_at
"#;

/// Comments of an auction, oldest first
pub const LIST_COMMENTS: &str = r#"
    SELECT c.id, c.message, c.created_at, c.user_id, u.username
    FROM comments c
    JOIN users u ON u.id = c.user_id
    WHERE c.auction_id = $1
    ORDER BY c.created_at ASC, c.id ASC
"#;

/// New comment
pub const INSERT_COMMENT: &str = r#"
    INSERT INTO comments (message, user_id, auction_id)
    VALUES ($1, $2, $3)
    RETURNING id, message, created_at, user_id, auction_id
"#;

/// Whether an auction is on a user's watchlist
pub const IS_WATCHLISTED: &str =
    "SELECT EXISTS (SELECT 1 FROM watchlist_entries WHERE user_id = $1 AND auction_id = $2)";

/// Add to watchlist
pub const INSERT_WATCHLIST_ENTRY: &str =
    "INSERT INTO watchlist_entries (user_id, auction_id) VALUES ($1, $2)";

/// Remove from watchlist
pub const DELETE_WATCHLIST_ENTRY: &str =
    "DELETE FROM watchlist_entries WHERE user_id = $1 AND auction_id = $2";

/// Watchlisted auctions, most recently added first
pub const LIST_WATCHLIST: &str = r#"
    SELECT a.id, a.title, a.description, a.price, a.category, a.created_at,
           a.image, a.image_url, a.is_close, a.user_id
    FROM watchlist_entries w
    JOIN auctions a ON a.id = w.auction_id
    WHERE w.user_id = $1
    ORDER BY w.created_at DESC
"#;

/// Id of an auction, for existence checks
pub const AUCTION_EXISTS: &str = "SELECT id FROM auctions WHERE id = $1";

/// User holding the highest bid
pub const GET_HIGHEST_BIDDER: &str = r#"
    SELECT user_id FROM bids
    WHERE auction_id = $1
    ORDER BY amount DESC, created_at ASC
    LIMIT 1
"#;
