use crate::auctions::model::Auction;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// User account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

// Extended profile, one per user
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub user_id: i64,
    pub profile_picture: Option<String>,
    pub bio: String,
    pub phone_number: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub two_factor_enabled: bool,
    pub two_factor_method: String,
    pub security_question1: String,
    #[serde(skip_serializing)]
    pub security_answer1: String,
    pub security_question2: String,
    #[serde(skip_serializing)]
    pub security_answer2: String,
    pub auctions_won: i32,
    pub auctions_created: i32,
    pub positive_ratings: i32,
    pub seller_rating_avg: Decimal,
    pub buyer_rating_avg: Decimal,
    pub total_ratings_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SecurityQuestion {
    pub id: i64,
    pub question: String,
}

// Rating left by `rater_id` for `rated_user_id`
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Rating {
    pub id: i64,
    pub rated_user_id: i64,
    pub rater_id: i64,
    pub auction_id: Option<i64>,
    pub score: i32,
    pub comment: String,
    pub as_seller: bool,
    pub as_buyer: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Rating joined with the rater's username for listings
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RatingView {
    pub id: i64,
    pub rater_id: i64,
    pub rater_username: String,
    pub auction_id: Option<i64>,
    pub score: i32,
    pub comment: String,
    pub as_seller: bool,
    pub as_buyer: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields of another user that anyone may see
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct PaymentStats {
    pub payments_made: i64,
    pub payments_received: i64,
    pub total_spent: Decimal,
    pub total_earned: Decimal,
}

/// A freshly issued session
#[derive(Debug, Serialize)]
pub struct SessionGrant {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub user: User,
    pub profile: UserProfile,
    #[serde(flatten)]
    pub stats: PaymentStats,
}

#[derive(Debug, Serialize)]
pub struct SecurityQuestionsView {
    pub configured: bool,
    pub security_question1: String,
    pub security_question2: String,
    pub questions: Vec<SecurityQuestion>,
}

#[derive(Debug, Serialize)]
pub struct PublicProfileView {
    pub user: PublicUser,
    pub profile: UserProfile,
    pub auctions_created: i64,
    pub ratings: Vec<RatingView>,
    pub can_rate: bool,
    pub common_auctions: Vec<Auction>,
}

#[derive(Debug, Serialize)]
pub struct UserRatingsView {
    pub user: PublicUser,
    pub ratings: Vec<RatingView>,
    pub seller_ratings: Vec<RatingView>,
    pub buyer_ratings: Vec<RatingView>,
}

#[derive(Debug, Serialize)]
pub struct RatingOutcome {
    pub message: String,
    pub created: bool,
    pub rating: Rating,
}

/// Aggregates stored on the rated user's profile.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingStats {
    pub total_ratings_count: i32,
    pub seller_rating_avg: Option<Decimal>,
    pub buyer_rating_avg: Option<Decimal>,
    pub positive_ratings: i32,
}

impl RatingStats {
    /// `(score, as_seller, as_buyer)` per rating. A role average is `None`
    /// when no rating carries that role, so the stored value is kept.
    pub fn compute(ratings: &[(i32, bool, bool)]) -> Self {
        fn average(scores: impl Iterator<Item = i32>) -> Option<Decimal> {
            let (sum, count) = scores.fold((0i64, 0i64), |(s, c), x| (s + x as i64, c + 1));
            (count > 0).then(|| (Decimal::from(sum) / Decimal::from(count)).round_dp(2))
        }

        Self {
            total_ratings_count: ratings.len() as i32,
            seller_rating_avg: average(ratings.iter().filter(|r| r.1).map(|r| r.0)),
            buyer_rating_avg: average(ratings.iter().filter(|r| r.2).map(|r| r.0)),
            positive_ratings: ratings.iter().filter(|r| r.0 >= 4).count() as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rating_stats() {
        let stats = RatingStats::compute(&[(5, true, false), (4, true, false), (2, false, true)]);
        assert_eq!(stats.total_ratings_count, 3);
        assert_eq!(stats.seller_rating_avg, Some(dec!(4.5)));
        assert_eq!(stats.buyer_rating_avg, Some(dec!(2)));
        assert_eq!(stats.positive_ratings, 2);
    }

    #[test]
    fn test_rating_stats_rounds_and_skips_missing_roles() {
        let stats = RatingStats::compute(&[(5, false, true), (4, false, true), (4, false, true)]);
        assert_eq!(stats.buyer_rating_avg, Some(dec!(4.33)));
        assert_eq!(stats.seller_rating_avg, None);

        let empty = RatingStats::compute(&[]);
        assert_eq!(empty.total_ratings_count, 0);
        assert_eq!(empty.positive_ratings, 0);
    }
}
