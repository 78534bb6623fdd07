use crate::accounts::model::PublicUser;
use crate::auctions::model::Auction;
use crate::payments::model::Payment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub payment_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Serialize)]
pub struct ThreadView {
    pub title: String,
    pub payment: Payment,
    pub auction: Auction,
    pub other_user: PublicUser,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct InboxThread {
    pub payment: Payment,
    pub auction_title: String,
    pub other_user: PublicUser,
    pub latest_message: Option<Message>,
    pub unread_count: i64,
    pub has_messages: bool,
}

impl InboxThread {
    /// Latest message time, or the payment time for an empty thread.
    pub fn activity_at(&self) -> DateTime<Utc> {
        self.latest_message
            .as_ref()
            .map(|m| m.created_at)
            .unwrap_or(self.payment.created_at)
    }
}

/// Most recently active thread first.
pub fn sort_threads(threads: &mut [InboxThread]) {
    threads.sort_by(|a, b| b.activity_at().cmp(&a.activity_at()));
}
