// region:    --- Imports
use super::model::{
    Auction, AuctionDetail, AuctionList, BidView, Category, CategoryCount, CategoryInfo,
    CategoryPage, CommentView, HomeView,
};
use super::queries;
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::pagination::{Page, PageWindow};
use sqlx::PgPool;
use tracing::info;

// endregion: --- Imports

pub const AUCTIONS_PER_PAGE: i64 = 12;
const TOP_CATEGORY_LIMIT: i64 = 4;
const FEATURED_LIMIT: i64 = 3;
const RELATED_LIMIT: i64 = 4;

// region:    --- Query Handlers

/// Landing page: busiest categories and priciest open auctions
pub async fn home(db_manager: &DatabaseManager) -> AppResult<HomeView> {
    info!("{:<12} --> Home page", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let categories = sqlx::query_as::<_, CategoryCount>(queries::TOP_CATEGORIES)
                    .bind(TOP_CATEGORY_LIMIT)
                    .fetch_all(&mut **tx)
                    .await?;
                let featured_auctions = sqlx::query_as::<_, Auction>(queries::FEATURED_AUCTIONS)
                    .bind(FEATURED_LIMIT)
                    .fetch_all(&mut **tx)
                    .await?;
                Ok::<_, AppError>(HomeView {
                    categories,
                    featured_auctions,
                })
            })
        })
        .await
}

/// All auctions, newest first, 12 per page
pub async fn index(db_manager: &DatabaseManager, raw_page: Option<&str>) -> AppResult<Page<Auction>> {
    info!("{:<12} --> Auction index page {:?}", "Query", raw_page);
    let pool = db_manager.pool();
    let count = sqlx::query_scalar::<_, i64>(queries::COUNT_AUCTIONS)
        .fetch_one(pool)
        .await?;
    let window = PageWindow::resolve(raw_page, count, AUCTIONS_PER_PAGE);

    let auctions = sqlx::query_as::<_, Auction>(queries::LIST_AUCTIONS_PAGE)
        .bind(window.limit())
        .bind(window.offset())
        .fetch_all(pool)
        .await?;
    Ok(window.into_page(auctions))
}

pub async fn get_auction(pool: &PgPool, auction_id: i64) -> AppResult<Auction> {
    sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
        .bind(auction_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Auction not found.".to_string()))
}

pub async fn get_highest_bid(pool: &PgPool, auction_id: i64) -> AppResult<Option<BidView>> {
    let bid = sqlx::query_as::<_, BidView>(queries::GET_HIGHEST_BID)
        .bind(auction_id)
        .fetch_optional(pool)
        .await?;
    Ok(bid)
}

pub async fn get_bid_history(db_manager: &DatabaseManager, auction_id: i64) -> AppResult<Vec<BidView>> {
    let pool = db_manager.pool();
    get_auction(pool, auction_id).await?;
    let bids = sqlx::query_as::<_, BidView>(queries::GET_BID_HISTORY)
        .bind(auction_id)
        .fetch_all(pool)
        .await?;
    Ok(bids)
}

/// Listing page as seen by `viewer_id`
pub async fn auction_detail(
    db_manager: &DatabaseManager,
    viewer_id: i64,
    auction_id: i64,
) -> AppResult<AuctionDetail> {
    info!("{:<12} --> Auction detail id: {}", "Query", auction_id);
    let pool = db_manager.pool();
    let auction = get_auction(pool, auction_id).await?;

    let bid = get_highest_bid(pool, auction.id).await?;
    let watchlisted = sqlx::query_scalar::<_, bool>(queries::IS_WATCHLISTED)
        .bind(viewer_id)
        .bind(auction.id)
        .fetch_one(pool)
        .await?;
    let comments = sqlx::query_as::<_, CommentView>(queries::LIST_COMMENTS)
        .bind(auction.id)
        .fetch_all(pool)
        .await?;
    let related_auctions = sqlx::query_as::<_, Auction>(queries::RELATED_AUCTIONS)
        .bind(&auction.category)
        .bind(auction.id)
        .bind(RELATED_LIMIT)
        .fetch_all(pool)
        .await?;

    Ok(AuctionDetail {
        auction,
        bid,
        watchlisted,
        comments,
        related_auctions,
    })
}

#[derive(Debug, serde::Serialize)]
pub struct CategoriesView {
    pub categories: Vec<CategoryCount>,
    pub choices: Vec<CategoryInfo>,
}

/// Categories in use with their counts, plus every selectable category
pub async fn categories(db_manager: &DatabaseManager) -> AppResult<CategoriesView> {
    let categories = sqlx::query_as::<_, CategoryCount>(queries::CATEGORY_COUNTS)
        .fetch_all(db_manager.pool())
        .await?;
    let choices = Category::ALL
        .iter()
        .map(|c| CategoryInfo {
            category: c.as_str().to_string(),
            label: c.label(),
        })
        .collect();
    Ok(CategoriesView {
        categories,
        choices,
    })
}

pub async fn category_page(db_manager: &DatabaseManager, category: &str) -> AppResult<CategoryPage> {
    let auctions = sqlx::query_as::<_, Auction>(queries::LIST_CATEGORY_AUCTIONS)
        .bind(category)
        .fetch_all(db_manager.pool())
        .await?;
    Ok(CategoryPage {
        category: category.to_string(),
        label: category.parse::<Category>().ok().map(|c| c.label()),
        auction_count: auctions.len() as i64,
        auctions,
    })
}

pub async fn my_auctions(db_manager: &DatabaseManager, user_id: i64) -> AppResult<AuctionList> {
    let auctions = sqlx::query_as::<_, Auction>(queries::LIST_USER_AUCTIONS)
        .bind(user_id)
        .fetch_all(db_manager.pool())
        .await?;
    Ok(AuctionList {
        auction_count: auctions.len() as i64,
        auctions,
    })
}

pub async fn watchlist(db_manager: &DatabaseManager, user_id: i64) -> AppResult<AuctionList> {
    let auctions = sqlx::query_as::<_, Auction>(queries::LIST_WATCHLIST)
        .bind(user_id)
        .fetch_all(db_manager.pool())
        .await?;
    Ok(AuctionList {
        auction_count: auctions.len() as i64,
        auctions,
    })
}

// endregion: --- Query Handlers
