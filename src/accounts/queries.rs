/// User by id
pub const GET_USER_BY_ID: &str = "SELECT id, username, email, first_name, last_name, password_hash, is_staff, is_active, date_joined, last_login FROM users WHERE id = $1";

/// User by username
pub const GET_USER_BY_USERNAME: &str = "SELECT id, username, email, first_name, last_name, password_hash, is_staff, is_active, date_joined, last_login FROM users WHERE username = $1";

/// Public user fields by username
pub const GET_PUBLIC_USER_BY_USERNAME: &str =
    "SELECT id, username, first_name, last_name, date_joined FROM users WHERE username = $1";

/// New user
pub const INSERT_USER: &str = r#"
    INSERT INTO users (username, email, first_name, last_name, password_hash)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id, username, email, first_name, last_name, password_hash, is_staff, is_active, date_joined, last_login
"#;

/// Last login timestamp
pub const UPDATE_LAST_LOGIN: &str = "UPDATE users SET last_login = NOW() WHERE id = $1";

/// Name and email
pub const UPDATE_USER_DETAILS: &str =
    "UPDATE users SET first_name = $2, last_name = $3, email = $4 WHERE id = $1";

/// Password hash
pub const UPDATE_PASSWORD: &str = "UPDATE users SET password_hash = $2 WHERE id = $1";

/// Empty profile for a new user
pub const INSERT_PROFILE: &str =
    "INSERT INTO user_profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING";

/// Profile by user id
pub const GET_PROFILE: &str = "SELECT * FROM user_profiles WHERE user_id = $1";

/// Editable profile fields
pub const UPDATE_PROFILE: &str = r#"
    UPDATE user_profiles SET
        bio = $2, phone_number = $3, address_line1 = $4, address_line2 = $5,
        city = $6, state = $7, postal_code = $8, country = $9,
        two_factor_enabled = $10, two_factor_method = $11, updated_at = NOW()
    WHERE user_id = $1
    RETURNING *
"#;

/// Profile picture path
pub const UPDATE_PROFILE_PICTURE: &str = r#"
    UPDATE user_profiles SET profile_picture = $2, updated_at = NOW()
    WHERE user_id = $1
    RETURNING *
"#;

/// Refresh the stored auction count
pub const REFRESH_AUCTIONS_CREATED: &str = r#"
    UPDATE user_profiles SET
        auctions_created = (SELECT COUNT(*) FROM auctions WHERE user_id = $1),
        updated_at = NOW()
    WHERE user_id = $1
    RETURNING auctions_created
"#;

/// Payment totals as buyer and as seller
pub const GET_PAYMENT_STATS: &str = r#"
    SELECT
        (SELECT COUNT(*) FROM payments WHERE user_id = $1) AS payments_made,
        (SELECT COUNT(*) FROM payments p JOIN auctions a ON a.id = p.auction_id
            WHERE a.user_id = $1) AS payments_received,
        (SELECT COALESCE(SUM(amount), 0) FROM payments
            WHERE user_id = $1 AND status = 'completed') AS total_spent,
        (SELECT COALESCE(SUM(p.amount), 0) FROM payments p JOIN auctions a ON a.id = p.auction_id
            WHERE a.user_id = $1 AND p.status = 'completed') AS total_earned
"#;

/// Auctions created by a user
pub const COUNT_USER_AUCTIONS: &str = "SELECT COUNT(*) FROM auctions WHERE user_id = $1";

/// Seeded security questions
pub const LIST_SECURITY_QUESTIONS: &str = "SELECT id, question FROM security_questions ORDER BY id";

/// Security question by id
pub const GET_SECURITY_QUESTION: &str = "SELECT id, question FROM security_questions WHERE id = $1";

/// Seed one question
pub const INSERT_SECURITY_QUESTION: &str =
    "INSERT INTO security_questions (question) VALUES ($1) ON CONFLICT (question) DO NOTHING";

/// Chosen questions and hashed answers
pub const UPDATE_SECURITY_QUESTIONS: &str = r#"
    UPDATE user_profiles SET
        security_question1 = $2, security_answer1 = $3,
        security_question2 = $4, security_answer2 = $5,
        updated_at = NOW()
    WHERE user_id = $1
"#;

/// Ratings received, newest first
pub const LIST_RATINGS_FOR_USER: &str = r#"
    SELECT r.id, r.rater_id, u.username AS rater_username, r.auction_id, r.score, r.comment,
           r.as_seller, r.as_buyer, r.created_at
    FROM ratings r
    JOIN users u ON u.id = r.rater_id
    WHERE r.rated_user_id = $1
    ORDER BY r.created_at DESC
"#;

/// Existing rating for a (rater, rated user, auction) triple
pub const FIND_RATING: &str = r#"
    SELECT * FROM ratings
    WHERE rater_id = $1 AND rated_user_id = $2 AND auction_id IS NOT DISTINCT FROM $3
"#;

/// New rating
pub const INSERT_RATING: &str = r#"
    INSERT INTO ratings (rated_user_id, rater_id, auction_id, score, comment, as_seller, as_buyer)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING *
"#;

/// Overwrite an existing rating
pub const UPDATE_RATING: &str = r#"
    UPDATE ratings SET score = $2, comment = $3, as_seller = $4, as_buyer = $5, updated_at = NOW()
    WHERE id = $1
    RETURNING *
"#;

/// Inputs for the rated user's aggregates
pub const RATING_SCORES_FOR_USER: &str =
    "SELECT score, as_seller, as_buyer FROM ratings WHERE rated_user_id = $1";

/// Store aggregates; NULL averages keep the current value
pub const UPDATE_RATING_STATS: &str = r#"
    UPDATE user_profiles SET
        total_ratings_count = $2,
        seller_rating_avg = COALESCE($3, seller_rating_avg),
        buyer_rating_avg = COALESCE($4, buyer_rating_avg),
        positive_ratings = $5,
        updated_at = NOW()
    WHERE user_id = $1
"#;

/// Closed auctions where one user sold and the other bid
pub const COMMON_CLOSED_AUCTIONS: &str = r#"
    SELECT DISTINCT a.id, a.title, a.description, a.price, a.category, a.created_at,
           a.image, a.image_url, a.is_close, a.user_id
    FROM auctions a
    JOIN bids b ON b.auction_id = a.id
    WHERE a.is_close = TRUE
      AND ((a.user_id = $1 AND b.user_id = $2) OR (a.user_id = $2 AND b.user_id = $1))
    ORDER BY a.created_at DESC
"#;

/// Whether a user bid on an auction
pub const HAS_BID_ON_AUCTION: &str =
    "SELECT EXISTS (SELECT 1 FROM bids WHERE auction_id = $1 AND user_id = $2)";

/// Count one more auction won
pub const INCREMENT_AUCTIONS_WON: &str =
    "UPDATE user_profiles SET auctions_won = auctions_won + 1, updated_at = NOW() WHERE user_id = $1";
