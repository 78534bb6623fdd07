/// Account and rating commands
/// 1. Registration and sessions
/// 2. Profile and password
/// 3. Security questions
/// 4. Public profiles and ratings
// region:    --- Imports
use super::model::{
    PaymentStats, ProfileView, PublicProfileView, PublicUser, Rating, RatingOutcome, RatingStats,
    RatingView, SecurityQuestion, SecurityQuestionsView, SessionGrant, User, UserProfile,
    UserRatingsView,
};
use super::queries;
use crate::auctions::model::Auction;
use crate::auctions::queries as auction_queries;
use crate::auth::{password, session};
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::notifications::queries as notification_queries;
use crate::signals::{self, DomainEvent};
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Commands

#[derive(Debug, Deserialize)]
pub struct RegisterCommand {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
}

/// Full replacement of the editable profile fields
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EditProfileCommand {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
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
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordCommand {
    pub old_password: String,
    pub new_password1: String,
    pub new_password2: String,
}

#[derive(Debug, Deserialize)]
pub struct SecurityQuestionsCommand {
    pub security_question1: i64,
    pub security_answer1: String,
    pub security_question2: i64,
    pub security_answer2: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRatingCommand {
    #[serde(default)]
    pub auction_id: Option<i64>,
    pub score: i32,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub as_seller: bool,
    #[serde(default)]
    pub as_buyer: bool,
}

/// Rating row about to be inserted
#[derive(Debug, Clone)]
pub struct NewRating {
    pub rated_user_id: i64,
    pub rater_id: i64,
    pub auction_id: Option<i64>,
    pub score: i32,
    pub comment: String,
    pub as_seller: bool,
    pub as_buyer: bool,
}

// endregion: --- Commands

pub const DEFAULT_SECURITY_QUESTIONS: [&str; 15] = [
    "What was the name of your first pet?",
    "What was the name of your first school?",
    "What is your mother's maiden name?",
    "In what city were you born?",
    "What was your childhood nickname?",
    "What is the name of your favorite childhood friend?",
    "What street did you live on in third grade?",
    "What is the middle name of your oldest child?",
    "What is your oldest sibling's birthday month and year? (e.g., January 1990)",
    "What is the make and model of your first car?",
    "What was your favorite food as a child?",
    "Where did you meet your spouse/significant other?",
    "What is your favorite movie?",
    "What is your favorite book?",
    "What is the name of the hospital where you were born?",
];

const NAME_MAX_LENGTH: usize = 30;
const USERNAME_MAX_LENGTH: usize = 150;
const BIO_MAX_LENGTH: usize = 500;
const MAX_RATING_SCORE: i32 = 5;
const MIN_RATING_SCORE: i32 = 1;

// region:    --- Validation

fn required(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required.", field)));
    }
    Ok(())
}

fn max_length(value: &str, limit: usize, field: &str) -> AppResult<()> {
    if value.chars().count() > limit {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters.",
            field, limit
        )));
    }
    Ok(())
}

/// Letters, digits and `@.+-_`
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= USERNAME_MAX_LENGTH
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn validate_profile(cmd: &EditProfileCommand) -> AppResult<()> {
    max_length(&cmd.first_name, NAME_MAX_LENGTH, "First name")?;
    max_length(&cmd.last_name, NAME_MAX_LENGTH, "Last name")?;
    required(&cmd.email, "Email")?;
    if !is_valid_email(cmd.email.trim()) {
        return Err(AppError::Validation("Enter a valid email address.".to_string()));
    }
    max_length(&cmd.bio, BIO_MAX_LENGTH, "Bio")?;
    max_length(&cmd.phone_number, 20, "Phone number")?;
    max_length(&cmd.address_line1, 100, "Address line 1")?;
    max_length(&cmd.address_line2, 100, "Address line 2")?;
    max_length(&cmd.city, 50, "City")?;
    max_length(&cmd.state, 50, "State")?;
    max_length(&cmd.postal_code, 20, "Postal code")?;
    max_length(&cmd.country, 50, "Country")?;
    if !matches!(cmd.two_factor_method.as_str(), "" | "sms" | "app") {
        return Err(AppError::Validation(
            "Two-factor method must be one of: sms, app.".to_string(),
        ));
    }
    Ok(())
}

/// Answers are compared case-insensitively.
fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Defaults to a buyer rating when no role was chosen.
pub fn normalize_roles(as_seller: bool, as_buyer: bool) -> (bool, bool) {
    if !as_seller && !as_buyer {
        (false, true)
    } else {
        (as_seller, as_buyer)
    }
}

// endregion: --- Validation

// region:    --- Lookups

pub async fn get_user_by_username(pool: &PgPool, username: &str) -> AppResult<User> {
    sqlx::query_as::<_, User>(queries::GET_USER_BY_USERNAME)
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
}

async fn get_public_user(pool: &PgPool, username: &str) -> AppResult<PublicUser> {
    sqlx::query_as::<_, PublicUser>(queries::GET_PUBLIC_USER_BY_USERNAME)
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
}

/// Profile of `user_id`, created on the fly for users that predate profiles.
pub async fn get_or_create_profile(conn: &mut PgConnection, user_id: i64) -> AppResult<UserProfile> {
    sqlx::query(queries::INSERT_PROFILE)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    let profile = sqlx::query_as::<_, UserProfile>(queries::GET_PROFILE)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(profile)
}

pub async fn list_ratings_for_user(pool: &PgPool, user_id: i64) -> AppResult<Vec<RatingView>> {
    let ratings = sqlx::query_as::<_, RatingView>(queries::LIST_RATINGS_FOR_USER)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(ratings)
}

pub async fn common_closed_auctions(
    pool: &PgPool,
    user_a: i64,
    user_b: i64,
) -> AppResult<Vec<Auction>> {
    let auctions = sqlx::query_as::<_, Auction>(queries::COMMON_CLOSED_AUCTIONS)
        .bind(user_a)
        .bind(user_b)
        .fetch_all(pool)
        .await?;
    Ok(auctions)
}

async fn has_bid_on(pool: &PgPool, auction_id: i64, user_id: i64) -> AppResult<bool> {
    let exists = sqlx::query_scalar::<_, bool>(queries::HAS_BID_ON_AUCTION)
        .bind(auction_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

// endregion: --- Lookups

// region:    --- Registration and Sessions

/// 1. Registration: user, profile and notification preferences in one transaction
pub async fn register(
    db_manager: &DatabaseManager,
    cmd: RegisterCommand,
    session_ttl_hours: i64,
) -> AppResult<SessionGrant> {
    info!("{:<12} --> Registering user {}", "Command", cmd.username);
    let username = cmd.username.trim();
    required(username, "Username")?;
    if !is_valid_username(username) {
        return Err(AppError::Validation(
            "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        ));
    }
    required(&cmd.first_name, "First name")?;
    required(&cmd.last_name, "Last name")?;
    required(&cmd.email, "Email")?;
    max_length(&cmd.first_name, NAME_MAX_LENGTH, "First name")?;
    max_length(&cmd.last_name, NAME_MAX_LENGTH, "Last name")?;
    if !is_valid_email(cmd.email.trim()) {
        return Err(AppError::Validation("Enter a valid email address.".to_string()));
    }
    password::validate_new_password(&cmd.password1, &cmd.password2, username)?;
    let password_hash = password::hash_secret(&cmd.password1)?;

    let mut tx = db_manager.pool().begin().await?;

    let user = sqlx::query_as::<_, User>(queries::INSERT_USER)
        .bind(username)
        .bind(cmd.email.trim())
        .bind(cmd.first_name.trim())
        .bind(cmd.last_name.trim())
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict { .. } => {
                AppError::conflict("USERNAME_TAKEN", "Username already taken.")
            }
            other => other,
        })?;

    sqlx::query(queries::INSERT_PROFILE)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(notification_queries::INSERT_PREFERENCES)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    let (token, expires_at) = session::create_session(&mut tx, user.id, session_ttl_hours).await?;
    sqlx::query(queries::UPDATE_LAST_LOGIN)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!("{:<12} --> Registered user id: {}", "Command", user.id);

    Ok(SessionGrant {
        token,
        expires_at,
        user,
    })
}

pub async fn login(
    db_manager: &DatabaseManager,
    cmd: LoginCommand,
    session_ttl_hours: i64,
) -> AppResult<SessionGrant> {
    let invalid = || AppError::Unauthorized("Invalid username and/or password.".to_string());

    let user = sqlx::query_as::<_, User>(queries::GET_USER_BY_USERNAME)
        .bind(cmd.username.trim())
        .fetch_optional(db_manager.pool())
        .await?
        .ok_or_else(invalid)?;

    if !user.is_active || !password::verify_secret(&cmd.password, &user.password_hash) {
        warn!("{:<12} --> Failed login for {}", "Command", cmd.username);
        return Err(invalid());
    }

    let mut tx = db_manager.pool().begin().await?;
    let (token, expires_at) = session::create_session(&mut tx, user.id, session_ttl_hours).await?;
    sqlx::query(queries::UPDATE_LAST_LOGIN)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!("{:<12} --> User {} logged in", "Command", user.username);
    Ok(SessionGrant {
        token,
        expires_at,
        user,
    })
}

pub async fn logout(db_manager: &DatabaseManager, token: &str) -> AppResult<()> {
    session::delete_session(db_manager.pool(), token).await?;
    Ok(())
}

// endregion: --- Registration and Sessions

// region:    --- Profile

/// 2. Own profile with refreshed auction count and payment totals
pub async fn profile(db_manager: &DatabaseManager, user: &User) -> AppResult<ProfileView> {
    let mut conn = db_manager.pool().acquire().await?;
    get_or_create_profile(&mut conn, user.id).await?;

    sqlx::query_scalar::<_, i32>(queries::REFRESH_AUCTIONS_CREATED)
        .bind(user.id)
        .fetch_one(&mut *conn)
        .await?;
    let profile = sqlx::query_as::<_, UserProfile>(queries::GET_PROFILE)
        .bind(user.id)
        .fetch_one(&mut *conn)
        .await?;
    let stats = sqlx::query_as::<_, PaymentStats>(queries::GET_PAYMENT_STATS)
        .bind(user.id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(ProfileView {
        user: user.clone(),
        profile,
        stats,
    })
}

pub async fn edit_profile(
    db_manager: &DatabaseManager,
    user: &User,
    cmd: EditProfileCommand,
) -> AppResult<UserProfile> {
    validate_profile(&cmd)?;

    let mut tx = db_manager.pool().begin().await?;
    get_or_create_profile(&mut tx, user.id).await?;

    sqlx::query(queries::UPDATE_USER_DETAILS)
        .bind(user.id)
        .bind(cmd.first_name.trim())
        .bind(cmd.last_name.trim())
        .bind(cmd.email.trim())
        .execute(&mut *tx)
        .await?;

    let profile = sqlx::query_as::<_, UserProfile>(queries::UPDATE_PROFILE)
        .bind(user.id)
        .bind(&cmd.bio)
        .bind(&cmd.phone_number)
        .bind(&cmd.address_line1)
        .bind(&cmd.address_line2)
        .bind(&cmd.city)
        .bind(&cmd.state)
        .bind(&cmd.postal_code)
        .bind(&cmd.country)
        .bind(cmd.two_factor_enabled)
        .bind(&cmd.two_factor_method)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    info!("{:<12} --> Profile updated for user id: {}", "Command", user.id);
    Ok(profile)
}

pub async fn update_profile_picture(
    db_manager: &DatabaseManager,
    user_id: i64,
    path: &str,
) -> AppResult<UserProfile> {
    let mut conn = db_manager.pool().acquire().await?;
    get_or_create_profile(&mut conn, user_id).await?;
    let profile = sqlx::query_as::<_, UserProfile>(queries::UPDATE_PROFILE_PICTURE)
        .bind(user_id)
        .bind(path)
        .fetch_one(&mut *conn)
        .await?;
    Ok(profile)
}

/// Other sessions are revoked; the one used for this request stays valid.
pub async fn change_password(
    db_manager: &DatabaseManager,
    user: &User,
    current_token: &str,
    cmd: ChangePasswordCommand,
) -> AppResult<u64> {
    if !password::verify_secret(&cmd.old_password, &user.password_hash) {
        return Err(AppError::Validation(
            "Your old password was entered incorrectly. Please enter it again.".to_string(),
        ));
    }
    password::validate_new_password(&cmd.new_password1, &cmd.new_password2, &user.username)?;
    let password_hash = password::hash_secret(&cmd.new_password1)?;

    let mut tx = db_manager.pool().begin().await?;
    sqlx::query(queries::UPDATE_PASSWORD)
        .bind(user.id)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;
    let revoked = session::delete_other_sessions(&mut tx, user.id, current_token).await?;
    tx.commit().await?;

    info!(
        "{:<12} --> Password changed for user id: {}, {} other sessions revoked",
        "Command", user.id, revoked
    );
    Ok(revoked)
}

// endregion: --- Profile

// region:    --- Security Questions

pub async fn list_security_questions(pool: &PgPool) -> AppResult<Vec<SecurityQuestion>> {
    let questions = sqlx::query_as::<_, SecurityQuestion>(queries::LIST_SECURITY_QUESTIONS)
        .fetch_all(pool)
        .await?;
    Ok(questions)
}

/// 3. Chosen questions (never the answers)
pub async fn get_security_questions(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> AppResult<SecurityQuestionsView> {
    let mut conn = db_manager.pool().acquire().await?;
    let profile = get_or_create_profile(&mut conn, user_id).await?;
    drop(conn);

    Ok(SecurityQuestionsView {
        configured: !profile.security_question1.is_empty() && !profile.security_answer1.is_empty(),
        security_question1: profile.security_question1,
        security_question2: profile.security_question2,
        questions: list_security_questions(db_manager.pool()).await?,
    })
}

pub async fn set_security_questions(
    db_manager: &DatabaseManager,
    user_id: i64,
    cmd: SecurityQuestionsCommand,
) -> AppResult<()> {
    if cmd.security_question1 == cmd.security_question2 {
        return Err(AppError::Validation(
            "Please choose two different security questions.".to_string(),
        ));
    }
    required(&cmd.security_answer1, "Security answer 1")?;
    required(&cmd.security_answer2, "Security answer 2")?;

    let pool = db_manager.pool();
    let mut questions = Vec::with_capacity(2);
    for id in [cmd.security_question1, cmd.security_question2] {
        let question = sqlx::query_as::<_, SecurityQuestion>(queries::GET_SECURITY_QUESTION)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| {
                AppError::Validation("Select a valid security question.".to_string())
            })?;
        questions.push(question.question);
    }

    let answer1 = password::hash_secret(&normalize_answer(&cmd.security_answer1))?;
    let answer2 = password::hash_secret(&normalize_answer(&cmd.security_answer2))?;

    let mut conn = pool.acquire().await?;
    get_or_create_profile(&mut conn, user_id).await?;
    sqlx::query(queries::UPDATE_SECURITY_QUESTIONS)
        .bind(user_id)
        .bind(&questions[0])
        .bind(&answer1)
        .bind(&questions[1])
        .bind(&answer2)
        .execute(&mut *conn)
        .await?;

    info!("{:<12} --> Security questions set for user id: {}", "Command", user_id);
    Ok(())
}

/// Insert the default questions that are missing; returns how many were added.
pub async fn seed_security_questions(db_manager: &DatabaseManager) -> AppResult<u64> {
    let added = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let mut added = 0;
                for question in DEFAULT_SECURITY_QUESTIONS {
                    added += sqlx::query(queries::INSERT_SECURITY_QUESTION)
                        .bind(question)
                        .execute(&mut **tx)
                        .await?
                        .rows_affected();
                }
                Ok::<u64, AppError>(added)
            })
        })
        .await?;
    info!("{:<12} --> Successfully added {} security questions", "Seed", added);
    Ok(added)
}

// endregion: --- Security Questions

// region:    --- Ratings

/// 4. Someone's profile; anonymous viewers cannot rate and share no auctions
pub async fn public_profile(
    db_manager: &DatabaseManager,
    viewer_id: Option<i64>,
    username: &str,
) -> AppResult<PublicProfileView> {
    let pool = db_manager.pool();
    let user = get_public_user(pool, username).await?;

    let mut conn = pool.acquire().await?;
    let profile = get_or_create_profile(&mut conn, user.id).await?;
    drop(conn);

    let auctions_created = sqlx::query_scalar::<_, i64>(queries::COUNT_USER_AUCTIONS)
        .bind(user.id)
        .fetch_one(pool)
        .await?;

    let common_auctions = match viewer_id {
        Some(viewer_id) if viewer_id != user.id => {
            common_closed_auctions(pool, viewer_id, user.id).await?
        }
        _ => Vec::new(),
    };

    Ok(PublicProfileView {
        ratings: list_ratings_for_user(pool, user.id).await?,
        can_rate: viewer_id.is_some_and(|id| id != user.id),
        common_auctions,
        auctions_created,
        profile,
        user,
    })
}

/// Insert a rating; a second rating for the same triple is a conflict.
pub async fn insert_rating(conn: &mut PgConnection, rating: &NewRating) -> AppResult<Rating> {
    sqlx::query_as::<_, Rating>(queries::INSERT_RATING)
        .bind(rating.rated_user_id)
        .bind(rating.rater_id)
        .bind(rating.auction_id)
        .bind(rating.score)
        .bind(&rating.comment)
        .bind(rating.as_seller)
        .bind(rating.as_buyer)
        .fetch_one(conn)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict { .. } => AppError::conflict(
                "DUPLICATE_RATING",
                "You have already rated this user for this auction.",
            ),
            other => other,
        })
}

/// Recompute and store the aggregates of `user_id`.
pub async fn recompute_rating_stats(
    conn: &mut PgConnection,
    user_id: i64,
) -> AppResult<RatingStats> {
    let scores = sqlx::query_as::<_, (i32, bool, bool)>(queries::RATING_SCORES_FOR_USER)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
    let stats = RatingStats::compute(&scores);

    sqlx::query(queries::UPDATE_RATING_STATS)
        .bind(user_id)
        .bind(stats.total_ratings_count)
        .bind(stats.seller_rating_avg)
        .bind(stats.buyer_rating_avg)
        .bind(stats.positive_ratings)
        .execute(&mut *conn)
        .await?;
    Ok(stats)
}

pub async fn submit_rating(
    db_manager: &DatabaseManager,
    rater: &User,
    username: &str,
    cmd: SubmitRatingCommand,
) -> AppResult<RatingOutcome> {
    info!(
        "{:<12} --> Rating {} by {}: {:?}",
        "Command", username, rater.username, cmd
    );
    let pool = db_manager.pool();
    let rated = get_user_by_username(pool, username).await?;

    if rated.id == rater.id {
        return Err(AppError::rejected("SELF_RATING", "You cannot rate yourself."));
    }

    let no_transaction = || {
        AppError::Forbidden("You can only rate users you've had transactions with.".to_string())
    };
    match cmd.auction_id {
        Some(auction_id) => {
            let auction = sqlx::query_as::<_, Auction>(auction_queries::GET_AUCTION)
                .bind(auction_id)
                .fetch_optional(pool)
                .await?
                .ok_or_else(|| AppError::NotFound("Auction not found.".to_string()))?;
            if !auction.is_close {
                return Err(AppError::rejected(
                    "AUCTION_OPEN",
                    "You can only rate users after the auction has closed.",
                ));
            }
            let rater_sold = auction.user_id == rater.id && has_bid_on(pool, auction.id, rated.id).await?;
            let rater_bought = auction.user_id == rated.id && has_bid_on(pool, auction.id, rater.id).await?;
            if !(rater_sold || rater_bought) {
                return Err(no_transaction());
            }
        }
        None => {
            if common_closed_auctions(pool, rater.id, rated.id).await?.is_empty() {
                return Err(no_transaction());
            }
        }
    }

    if !(MIN_RATING_SCORE..=MAX_RATING_SCORE).contains(&cmd.score) {
        return Err(AppError::Validation(
            "Score must be between 1 and 5.".to_string(),
        ));
    }
    let (as_seller, as_buyer) = normalize_roles(cmd.as_seller, cmd.as_buyer);

    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, Rating>(queries::FIND_RATING)
        .bind(rater.id)
        .bind(rated.id)
        .bind(cmd.auction_id)
        .fetch_optional(&mut *tx)
        .await?;

    let (rating, created) = match existing {
        Some(existing) => {
            let rating = sqlx::query_as::<_, Rating>(queries::UPDATE_RATING)
                .bind(existing.id)
                .bind(cmd.score)
                .bind(&cmd.comment)
                .bind(as_seller)
                .bind(as_buyer)
                .fetch_one(&mut *tx)
                .await?;
            (rating, false)
        }
        None => {
            let rating = insert_rating(
                &mut tx,
                &NewRating {
                    rated_user_id: rated.id,
                    rater_id: rater.id,
                    auction_id: cmd.auction_id,
                    score: cmd.score,
                    comment: cmd.comment.clone(),
                    as_seller,
                    as_buyer,
                },
            )
            .await?;
            signals::dispatch(
                &mut tx,
                DomainEvent::RatingCreated {
                    rating_id: rating.id,
                    rated_user_id: rating.rated_user_id,
                    rater_id: rating.rater_id,
                    score: rating.score,
                },
            )
            .await?;
            (rating, true)
        }
    };

    get_or_create_profile(&mut tx, rated.id).await?;
    recompute_rating_stats(&mut tx, rated.id).await?;
    tx.commit().await?;

    let message = if created {
        "Rating submitted successfully."
    } else {
        "Rating updated successfully."
    };
    Ok(RatingOutcome {
        message: message.to_string(),
        created,
        rating,
    })
}

pub async fn user_ratings(db_manager: &DatabaseManager, username: &str) -> AppResult<UserRatingsView> {
    let pool = db_manager.pool();
    let user = get_public_user(pool, username).await?;
    let ratings = list_ratings_for_user(pool, user.id).await?;

    let seller_ratings = ratings.iter().filter(|r| r.as_seller).cloned().collect();
    let buyer_ratings = ratings.iter().filter(|r| r.as_buyer).cloned().collect();

    Ok(UserRatingsView {
        user,
        ratings,
        seller_ratings,
        buyer_ratings,
    })
}

// endregion: --- Ratings

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(is_valid_username("amal.k+test_1"));
        assert!(is_valid_username("سارة"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username(&"a".repeat(151)));
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("amal@example.com"));
        assert!(!is_valid_email("amal.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("amal@localhost"));
        assert!(!is_valid_email("amal @example.com"));
    }

    #[test]
    fn test_role_defaults_to_buyer() {
        assert_eq!(normalize_roles(false, false), (false, true));
        assert_eq!(normalize_roles(true, false), (true, false));
        assert_eq!(normalize_roles(true, true), (true, true));
    }

    #[test]
    fn test_profile_validation() {
        let mut cmd = EditProfileCommand {
            email: "amal@example.com".to_string(),
            ..Default::default()
        };
        assert!(validate_profile(&cmd).is_ok());

        cmd.two_factor_method = "email".to_string();
        assert!(validate_profile(&cmd).is_err());

        cmd.two_factor_method = "sms".to_string();
        cmd.bio = "x".repeat(501);
        assert!(validate_profile(&cmd).is_err());

        cmd.bio.clear();
        cmd.email = "not-an-email".to_string();
        assert!(validate_profile(&cmd).is_err());
    }

    #[test]
    fn test_security_answers_are_normalized() {
        assert_eq!(normalize_answer("  Fluffy "), "fluffy");
    }

    #[test]
    fn test_default_questions_are_unique() {
        let mut questions = DEFAULT_SECURITY_QUESTIONS.to_vec();
        questions.sort();
        questions.dedup();
        assert_eq!(questions.len(), 15);
    }
}
