/// Auction write operations
/// 1. Listing creation
/// 2. Bidding
/// 3. Comments
/// 4. Closing and deletion
/// 5. Watchlist
// region:    --- Imports
use super::model::{Auction, Bid, Category, Comment};
use super::queries;
use crate::accounts::queries as account_queries;
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::signals::{self, DomainEvent};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;
// endregion: --- Imports

// region:    --- Commands

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuctionCommand {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub category: Option<String>,
    /// Starting bid placed by the owner
    pub amount: Decimal,
    /// Path returned by the image upload endpoint
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBidCommand {
    pub auction_id: i64,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentCommand {
    pub auction_id: i64,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchlistCommand {
    pub auction_id: i64,
}

#[derive(Debug, Serialize)]
pub struct BidOutcome {
    pub message: &'static str,
    pub bid: Bid,
}

// endregion: --- Commands

pub const TITLE_MAX_LENGTH: usize = 64;
pub const COMMENT_MAX_LENGTH: usize = 500;

/// Largest value of a `NUMERIC(8,2)` column
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999, 2)
}

// region:    --- Validation

fn validate_amount(value: Decimal, field: &str) -> AppResult<()> {
    if value <= Decimal::ZERO {
        return Err(AppError::Validation(format!(
            "{} must be greater than zero.",
            field
        )));
    }
    if value > max_amount() {
        return Err(AppError::Validation(format!(
            "{} must be at most {}.",
            field,
            max_amount()
        )));
    }
    if value.scale() > 2 && value.round_dp(2) != value {
        return Err(AppError::Validation(format!(
            "{} must have at most 2 decimal places.",
            field
        )));
    }
    Ok(())
}

fn normalize_image_url(raw: Option<&str>) -> AppResult<Option<String>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Some(url.to_string())),
        _ => Err(AppError::Validation("Enter a valid URL.".to_string())),
    }
}

/// Accepts only a file stored directly under `prefix` by the upload endpoint.
fn normalize_uploaded_image(raw: Option<&str>, prefix: &str) -> AppResult<Option<String>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let file_name = raw.strip_prefix(prefix).unwrap_or_default();
    if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
        return Err(AppError::Validation(
            "Image must be a file returned by the image upload endpoint.".to_string(),
        ));
    }
    Ok(Some(raw.to_string()))
}

/// Validated fields of a new listing
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuction {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub amount: Decimal,
    pub image: Option<String>,
    pub image_url: Option<String>,
}

/// `image_prefix` is the public path uploaded auction images live under.
pub fn validate_new_auction(cmd: &CreateAuctionCommand, image_prefix: &str) -> AppResult<NewAuction> {
    let title = cmd.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required.".to_string()));
    }
    if title.chars().count() > TITLE_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "Title must be at most {} characters.",
            TITLE_MAX_LENGTH
        )));
    }
    if cmd.description.trim().is_empty() {
        return Err(AppError::Validation("Description is required.".to_string()));
    }
    validate_amount(cmd.price, "Price")?;
    validate_amount(cmd.amount, "Starting bid")?;

    let category = match cmd.category.as_deref().map(str::trim) {
        None | Some("") => Category::default(),
        Some(raw) => raw
            .parse::<Category>()
            .map_err(|e| AppError::Validation(e.to_string()))?,
    };

    let image = normalize_uploaded_image(cmd.image.as_deref(), image_prefix)?;
    let image_url = normalize_image_url(cmd.image_url.as_deref())?;
    if image.is_none() && image_url.is_none() {
        return Err(AppError::Validation(
            "Please either upload an image or provide an image URL.".to_string(),
        ));
    }

    Ok(NewAuction {
        title: title.to_string(),
        description: cmd.description.trim().to_string(),
        price: cmd.price,
        category,
        amount: cmd.amount,
        // An uploaded file wins over a URL.
        image_url: if image.is_some() { None } else { image_url },
        image,
    })
}

/// Rules a bid must pass against the locked auction row
pub fn check_bid(
    auction: &Auction,
    bidder_id: i64,
    highest_bid: Option<Decimal>,
    amount: Decimal,
) -> AppResult<()> {
    if auction.is_close {
        return Err(AppError::rejected(
            "ALREADY_ENDED",
            "This auction has already been closed.",
        ));
    }
    if auction.user_id == bidder_id {
        return Err(AppError::rejected(
            "OWN_AUCTION",
            "You cannot bid on your own auction.",
        ));
    }
    if amount <= highest_bid.unwrap_or(Decimal::ZERO) {
        return Err(AppError::rejected(
            "LOW_BID",
            "Your bid should be greater than the current bid.",
        ));
    }
    Ok(())
}

pub fn validate_comment(message: &str) -> AppResult<&str> {
    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Comment cannot be empty.".to_string()));
    }
    if message.chars().count() > COMMENT_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "Comment must be at most {} characters.",
            COMMENT_MAX_LENGTH
        )));
    }
    Ok(message)
}

// endregion: --- Validation

// region:    --- Handlers

/// 1. Create an auction together with the owner's starting bid
pub async fn create_auction(
    db_manager: &DatabaseManager,
    owner_id: i64,
    cmd: CreateAuctionCommand,
    image_prefix: &str,
) -> AppResult<Auction> {
    info!("{:<12} --> Creating auction for user id: {}", "Command", owner_id);
    let new = validate_new_auction(&cmd, image_prefix)?;

    let mut tx = db_manager.pool().begin().await?;
    let auction = sqlx::query_as::<_, Auction>(queries::INSERT_AUCTION)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.category.as_str())
        .bind(&new.image)
        .bind(&new.image_url)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query(queries::INSERT_BID)
        .bind(new.amount)
        .bind(auction.id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!("{:<12} --> Auction Created Successfully id: {}", "Command", auction.id);
    Ok(auction)
}

/// 2. Place a bid; the auction row stays locked until commit
pub async fn place_bid(
    db_manager: &DatabaseManager,
    bidder_id: i64,
    cmd: PlaceBidCommand,
) -> AppResult<BidOutcome> {
    info!("{:<12} --> Bid by user id {}: {:?}", "Command", bidder_id, cmd);
    validate_amount(cmd.amount, "Bid")?;

    let mut tx = db_manager.pool().begin().await?;
    let auction = sqlx::query_as::<_, Auction>(queries::GET_AUCTION_FOR_UPDATE)
        .bind(cmd.auction_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Auction not found.".to_string()))?;

    let highest = sqlx::query_scalar::<_, Option<Decimal>>(queries::GET_HIGHEST_BID_AMOUNT)
        .bind(auction.id)
        .fetch_one(&mut *tx)
        .await?;
    check_bid(&auction, bidder_id, highest, cmd.amount)?;

    let bid = sqlx::query_as::<_, Bid>(queries::INSERT_BID)
        .bind(cmd.amount)
        .bind(auction.id)
        .bind(bidder_id)
        .fetch_one(&mut *tx)
        .await?;

    signals::dispatch(
        &mut tx,
        DomainEvent::BidPlaced {
            auction_id: auction.id,
            bid_id: bid.id,
            bidder_id,
            amount: bid.amount,
        },
    )
    .await?;
    tx.commit().await?;

    Ok(BidOutcome {
        message: "Your bid now is the current bid.",
        bid,
    })
}

/// 3. Comment on an auction
pub async fn add_comment(
    db_manager: &DatabaseManager,
    user_id: i64,
    cmd: CommentCommand,
) -> AppResult<Comment> {
    let message = validate_comment(&cmd.message)?;

    let mut tx = db_manager.pool().begin().await?;
    let auction = sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
        .bind(cmd.auction_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Auction not found.".to_string()))?;

    let comment = sqlx::query_as::<_, Comment>(queries::INSERT_COMMENT)
        .bind(message)
        .bind(user_id)
        .bind(auction.id)
        .fetch_one(&mut *tx)
        .await?;

    signals::dispatch(
        &mut tx,
        DomainEvent::CommentPosted {
            auction_id: auction.id,
            comment_id: comment.id,
            commenter_id: user_id,
        },
    )
    .await?;
    tx.commit().await?;
    Ok(comment)
}

/// 4. Close an auction; the close event fires only on the open -> closed transition
pub async fn close_auction(
    db_manager: &DatabaseManager,
    user_id: i64,
    auction_id: i64,
) -> AppResult<Auction> {
    info!("{:<12} --> Closing auction id: {}", "Command", auction_id);
    let mut tx = db_manager.pool().begin().await?;
    let mut auction = sqlx::query_as::<_, Auction>(queries::GET_AUCTION_FOR_UPDATE)
        .bind(auction_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Auction not found.".to_string()))?;

    if auction.user_id != user_id {
        return Err(AppError::rejected(
            "NOT_OWNER",
            "Only the owner can close this auction.",
        ));
    }
    if auction.is_close {
        return Err(AppError::rejected(
            "ALREADY_ENDED",
            "This auction has already been closed.",
        ));
    }

    sqlx::query(queries::CLOSE_AUCTION)
        .bind(auction.id)
        .execute(&mut *tx)
        .await?;
    auction.is_close = true;

    let winner = sqlx::query_scalar::<_, i64>(queries::GET_HIGHEST_BIDDER)
        .bind(auction.id)
        .fetch_optional(&mut *tx)
        .await?
        .filter(|id| *id != auction.user_id);
    if let Some(winner_id) = winner {
        sqlx::query(account_queries::INCREMENT_AUCTIONS_WON)
            .bind(winner_id)
            .execute(&mut *tx)
            .await?;
    }

    signals::dispatch(&mut tx, DomainEvent::AuctionClosed { auction_id: auction.id }).await?;
    tx.commit().await?;
    Ok(auction)
}

pub async fn delete_auction(
    db_manager: &DatabaseManager,
    user_id: i64,
    auction_id: i64,
) -> AppResult<String> {
    let pool = db_manager.pool();
    let auction = sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
        .bind(auction_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Auction not found.".to_string()))?;

    if auction.user_id != user_id {
        return Err(AppError::rejected(
            "NOT_OWNER",
            "You don't have permission to delete this auction.",
        ));
    }

    sqlx::query(queries::DELETE_AUCTION)
        .bind(auction.id)
        .execute(pool)
        .await?;
    info!("{:<12} --> Deleted auction id: {}", "Command", auction.id);
    Ok(format!("Auction '{}' has been deleted.", auction.title))
}

/// 5. Watchlist
pub async fn watchlist_add(
    db_manager: &DatabaseManager,
    user_id: i64,
    auction_id: i64,
) -> AppResult<()> {
    let pool = db_manager.pool();
    sqlx::query_scalar::<_, i64>(queries::AUCTION_EXISTS)
        .bind(auction_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Auction not found.".to_string()))?;

    sqlx::query(queries::INSERT_WATCHLIST_ENTRY)
        .bind(user_id)
        .bind(auction_id)
        .execute(pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict { .. } => AppError::conflict(
                "ALREADY_WATCHLISTED",
                "Auction is already in your watchlist",
            ),
            other => other,
        })?;
    Ok(())
}

pub async fn watchlist_remove(
    db_manager: &DatabaseManager,
    user_id: i64,
    auction_id: i64,
) -> AppResult<()> {
    let removed = sqlx::query(queries::DELETE_WATCHLIST_ENTRY)
        .bind(user_id)
        .bind(auction_id)
        .execute(db_manager.pool())
        .await?
        .rows_affected();
    if removed == 0 {
        return Err(AppError::NotFound(
            "Auction is not in your watchlist".to_string(),
        ));
    }
    Ok(())
}

// endregion: --- Handlers

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn auction(owner: i64, is_close: bool) -> Auction {
        Auction {
            id: 1,
            title: "Pixel 8".to_string(),
            description: "Barely used".to_string(),
            price: dec!(300.00),
            category: "smartphones".to_string(),
            created_at: Utc::now(),
            image: None,
            image_url: Some("https://example.com/p.jpg".to_string()),
            is_close,
            user_id: owner,
        }
    }

    const PREFIX: &str = "/media/auction_images/";

    fn create_cmd() -> CreateAuctionCommand {
        CreateAuctionCommand {
            title: "Pixel 8".to_string(),
            description: "Barely used".to_string(),
            price: dec!(300.00),
            category: Some("smartphones".to_string()),
            amount: dec!(150.00),
            image: None,
            image_url: Some("https://example.com/p.jpg".to_string()),
        }
    }

    #[test]
    fn test_bid_must_exceed_highest() {
        let open = auction(1, false);
        let err = check_bid(&open, 2, Some(dec!(100.00)), dec!(100.00)).unwrap_err();
        assert_eq!(err.code(), "LOW_BID");
        assert_eq!(
            err.to_string(),
            "Your bid should be greater than the current bid."
        );
        assert!(check_bid(&open, 2, Some(dec!(100.00)), dec!(99.99)).is_err());
        assert!(check_bid(&open, 2, Some(dec!(100.00)), dec!(100.01)).is_ok());
    }

    #[test]
    fn test_first_bid_compares_against_zero() {
        let open = auction(1, false);
        assert!(check_bid(&open, 2, None, dec!(0.01)).is_ok());
    }

    #[test]
    fn test_bid_rejected_on_closed_or_own_auction() {
        assert_eq!(
            check_bid(&auction(1, true), 2, None, dec!(10)).unwrap_err().code(),
            "ALREADY_ENDED"
        );
        assert_eq!(
            check_bid(&auction(1, false), 1, None, dec!(10)).unwrap_err().code(),
            "OWN_AUCTION"
        );
    }

    #[test]
    fn test_new_auction_requires_an_image() {
        let mut cmd = create_cmd();
        cmd.image_url = None;
        let err = validate_new_auction(&cmd, PREFIX).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please either upload an image or provide an image URL."
        );

        cmd.image_url = Some("ftp://example.com/p.jpg".to_string());
        assert!(validate_new_auction(&cmd, PREFIX).is_err());

        cmd.image_url = None;
        cmd.image = Some("/media/auction_images/a.jpg".to_string());
        let new = validate_new_auction(&cmd, PREFIX).unwrap();
        assert_eq!(new.image.as_deref(), Some("/media/auction_images/a.jpg"));
        assert_eq!(new.image_url, None);
    }

    #[test]
    fn test_uploaded_image_must_come_from_upload_dir() {
        let mut cmd = create_cmd();
        cmd.image_url = None;
        for image in [
            "javascript:alert(1)",
            "https://evil.example.com/a.jpg",
            "/media/profile_pictures/a.jpg",
            "/media/auction_images/",
            "/media/auction_images/../../etc/passwd",
            "/media/auction_images/nested/a.jpg",
        ] {
            cmd.image = Some(image.to_string());
            let err = validate_new_auction(&cmd, PREFIX).unwrap_err();
            assert_eq!(err.code(), "VALIDATION_ERROR", "{}", image);
        }

        cmd.image = Some("  /media/auction_images/3f2a.png ".to_string());
        let new = validate_new_auction(&cmd, PREFIX).unwrap();
        assert_eq!(new.image.as_deref(), Some("/media/auction_images/3f2a.png"));
    }

    #[test]
    fn test_new_auction_amounts_and_category() {
        let mut cmd = create_cmd();
        cmd.price = dec!(0);
        assert!(validate_new_auction(&cmd, PREFIX).is_err());

        cmd.price = dec!(1000000.00);
        assert!(validate_new_auction(&cmd, PREFIX).is_err());

        cmd.price = dec!(999999.99);
        cmd.category = Some("toys".to_string());
        assert!(validate_new_auction(&cmd, PREFIX).is_err());

        cmd.category = None;
        assert_eq!(validate_new_auction(&cmd, PREFIX).unwrap().category, Category::Other);
    }

    #[test]
    fn test_title_length_limit() {
        let mut cmd = create_cmd();
        cmd.title = "x".repeat(65);
        assert!(validate_new_auction(&cmd, PREFIX).is_err());
        cmd.title = "x".repeat(64);
        assert!(validate_new_auction(&cmd, PREFIX).is_ok());
    }

    #[test]
    fn test_comment_length() {
        assert!(validate_comment("   ").is_err());
        assert!(validate_comment(&"a".repeat(501)).is_err());
        assert_eq!(validate_comment("  nice phone ").unwrap(), "nice phone");
    }
}
