use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// region:    --- Category

/// Fixed list of electronics categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Smartphones,
    Tablets,
    Laptops,
    Desktops,
    Monitors,
    Tvs,
    Cameras,
    Audio,
    Gaming,
    Accessories,
    Wearables,
    Networking,
    Storage,
    Components,
    Other,
}

impl Category {
    pub const ALL: [Category; 15] = [
        Category::Smartphones,
        Category::Tablets,
        Category::Laptops,
        Category::Desktops,
        Category::Monitors,
        Category::Tvs,
        Category::Cameras,
        Category::Audio,
        Category::Gaming,
        Category::Accessories,
        Category::Wearables,
        Category::Networking,
        Category::Storage,
        Category::Components,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Smartphones => "smartphones",
            Category::Tablets => "tablets",
            Category::Laptops => "laptops",
            Category::Desktops => "desktops",
            Category::Monitors => "monitors",
            Category::Tvs => "tvs",
            Category::Cameras => "cameras",
            Category::Audio => "audio",
            Category::Gaming => "gaming",
            Category::Accessories => "accessories",
            Category::Wearables => "wearables",
            Category::Networking => "networking",
            Category::Storage => "storage",
            Category::Components => "components",
            Category::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Smartphones => "Smartphones",
            Category::Tablets => "Tablets",
            Category::Laptops => "Laptops",
            Category::Desktops => "Desktop Computers",
            Category::Monitors => "Monitors",
            Category::Tvs => "Televisions",
            Category::Cameras => "Cameras",
            Category::Audio => "Audio Equipment",
            Category::Gaming => "Gaming Consoles",
            Category::Accessories => "Accessories",
            Category::Wearables => "Wearable Technology",
            Category::Networking => "Networking Equipment",
            Category::Storage => "Storage Devices",
            Category::Components => "Computer Components",
            Category::Other => "Other Electronics",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Select a valid choice. {0} is not one of the available choices.")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// endregion: --- Category

// region:    --- Records

// Auction listing
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Auction {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub image: Option<String>,
    pub image_url: Option<String>,
    pub is_close: bool,
    pub user_id: i64,
}

// Bid
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub amount: Decimal,
    pub auction_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

// Bid with the bidder's username
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BidView {
    pub id: i64,
    pub amount: Decimal,
    pub user_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub auction_id: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CommentView {
    pub id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

// endregion: --- Records

// region:    --- Views

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub categories: Vec<CategoryCount>,
    pub featured_auctions: Vec<Auction>,
}

#[derive(Debug, Serialize)]
pub struct AuctionDetail {
    pub auction: Auction,
    pub bid: Option<BidView>,
    pub watchlisted: bool,
    pub comments: Vec<CommentView>,
    pub related_auctions: Vec<Auction>,
}

#[derive(Debug, Serialize)]
pub struct AuctionList {
    pub auctions: Vec<Auction>,
    pub auction_count: i64,
}

#[derive(Debug, Serialize)]
pub struct CategoryPage {
    pub category: String,
    pub label: Option<&'static str>,
    pub auctions: Vec<Auction>,
    pub auction_count: i64,
}

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub category: String,
    pub label: &'static str,
}

// endregion: --- Views

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_and_unknown() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("toys".parse::<Category>().is_err());
        assert_eq!(Category::default(), Category::Other);
        assert_eq!(Category::Tvs.label(), "Televisions");
    }
}
