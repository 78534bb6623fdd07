//! Notification creation and the fan-out rules for domain events.
//!
//! The `plan_*` functions decide who hears about what; they are pure so the
//! rules can be checked without a database. [`create_notification`] applies
//! the recipient's in-app preference and stores the row.
// region:    --- Imports
use super::model::{Notification, NotificationLevel, NotificationPreference, NotificationType};
use super::queries;
use crate::error::AppResult;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::debug;
// endregion: --- Imports

/// Object a notification points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelatedObject {
    pub object_type: &'static str,
    pub object_id: i64,
}

impl RelatedObject {
    pub fn auction(id: i64) -> Self {
        Self {
            object_type: "auction",
            object_id: id,
        }
    }

    pub fn comment(id: i64) -> Self {
        Self {
            object_type: "comment",
            object_id: id,
        }
    }

    pub fn rating(id: i64) -> Self {
        Self {
            object_type: "rating",
            object_id: id,
        }
    }

    pub fn message(id: i64) -> Self {
        Self {
            object_type: "message",
            object_id: id,
        }
    }

    pub fn payment(id: i64) -> Self {
        Self {
            object_type: "payment",
            object_id: id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
    pub level: NotificationLevel,
    pub link: Option<String>,
    pub object: Option<RelatedObject>,
}

/// The parts of an auction the fan-out rules need
#[derive(Debug, Clone)]
pub struct AuctionRef {
    pub id: i64,
    pub title: String,
    pub owner_id: i64,
}

impl AuctionRef {
    fn link(&self) -> String {
        format!("/auction/{}", self.id)
    }
}

// region:    --- Delivery

/// Preferences of `user_id`, created with defaults when missing.
pub async fn get_or_create_preferences(
    conn: &mut PgConnection,
    user_id: i64,
) -> AppResult<NotificationPreference> {
    sqlx::query(queries::INSERT_PREFERENCES)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    let prefs = sqlx::query_as::<_, NotificationPreference>(queries::GET_PREFERENCES)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(prefs)
}

/// Store a notification unless the recipient turned this type off.
pub async fn create_notification(
    conn: &mut PgConnection,
    new: &NewNotification,
) -> AppResult<Option<Notification>> {
    let prefs = get_or_create_preferences(conn, new.user_id).await?;
    if !prefs.should_send_app_notification(new.kind) {
        debug!(
            "{:<12} --> {} notification suppressed for user id: {}",
            "Notify", new.kind, new.user_id
        );
        return Ok(None);
    }

    let notification = sqlx::query_as::<_, Notification>(queries::INSERT_NOTIFICATION)
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.message)
        .bind(new.kind.as_str())
        .bind(new.level.as_str())
        .bind(&new.link)
        .bind(new.object.map(|o| o.object_type))
        .bind(new.object.map(|o| o.object_id))
        .fetch_one(&mut *conn)
        .await?;
    debug!(
        "{:<12} --> {} notification {} for user id: {}",
        "Notify", new.kind, notification.id, new.user_id
    );
    Ok(Some(notification))
}

// endregion: --- Delivery

// region:    --- Fan-out Rules

/// New bid: the owner hears about it, and so does the bidder who was on top.
pub fn plan_bid(
    auction: &AuctionRef,
    bidder_id: i64,
    bidder_username: &str,
    amount: Decimal,
    previous_top_bidder: Option<i64>,
) -> Vec<NewNotification> {
    let mut plan = Vec::new();
    if auction.owner_id != bidder_id {
        plan.push(NewNotification {
            user_id: auction.owner_id,
            title: "New Bid Received".to_string(),
            message: format!(
                "{} placed a bid of ${} on your auction '{}'.",
                bidder_username, amount, auction.title
            ),
            kind: NotificationType::Bid,
            level: NotificationLevel::Info,
            link: Some(auction.link()),
            object: Some(RelatedObject::auction(auction.id)),
        });
    }

    if let Some(previous) = previous_top_bidder
        .filter(|id| *id != bidder_id && *id != auction.owner_id)
    {
        plan.push(NewNotification {
            user_id: previous,
            title: "You've Been Outbid".to_string(),
            message: format!(
                "Someone has placed a higher bid of ${} on '{}'.",
                amount, auction.title
            ),
            kind: NotificationType::Outbid,
            level: NotificationLevel::Warning,
            link: Some(auction.link()),
            object: Some(RelatedObject::auction(auction.id)),
        });
    }
    plan
}

pub fn plan_comment(
    auction: &AuctionRef,
    commenter_id: i64,
    commenter_username: &str,
    comment_id: i64,
) -> Vec<NewNotification> {
    if auction.owner_id == commenter_id {
        return Vec::new();
    }
    vec![NewNotification {
        user_id: auction.owner_id,
        title: "New Comment".to_string(),
        message: format!(
            "{} commented on your auction '{}'.",
            commenter_username, auction.title
        ),
        kind: NotificationType::Comment,
        level: NotificationLevel::Info,
        link: Some(auction.link()),
        object: Some(RelatedObject::comment(comment_id)),
    }]
}

pub fn plan_rating(
    rated_user_id: i64,
    rated_username: &str,
    rater_username: &str,
    score: i32,
    rating_id: i64,
) -> Vec<NewNotification> {
    vec![NewNotification {
        user_id: rated_user_id,
        title: "New Rating Received".to_string(),
        message: format!("{} gave you a {}/5 rating.", rater_username, score),
        kind: NotificationType::Rating,
        level: NotificationLevel::Info,
        link: Some(format!("/profile/{}/ratings/", rated_username)),
        object: Some(RelatedObject::rating(rating_id)),
    }]
}

/// Closed auction: the owner is told it ended; a winner other than the owner is congratulated.
pub fn plan_auction_closed(
    auction: &AuctionRef,
    highest_bid: Option<(i64, Decimal)>,
) -> Vec<NewNotification> {
    let mut plan = vec![NewNotification {
        user_id: auction.owner_id,
        title: "Your Auction Has Ended".to_string(),
        message: format!("Your auction '{}' has ended.", auction.title),
        kind: NotificationType::AuctionEnded,
        level: NotificationLevel::Info,
        link: Some(auction.link()),
        object: Some(RelatedObject::auction(auction.id)),
    }];

    if let Some((winner_id, amount)) = highest_bid.filter(|(id, _)| *id != auction.owner_id) {
        plan.push(NewNotification {
            user_id: winner_id,
            title: "Auction Won".to_string(),
            message: format!(
                "Congratulations! You won the auction for '{}' with a bid of ${}.",
                auction.title, amount
            ),
            kind: NotificationType::AuctionWon,
            level: NotificationLevel::Success,
            link: Some(auction.link()),
            object: Some(RelatedObject::auction(auction.id)),
        });
    }
    plan
}

pub fn plan_message(
    receiver_id: i64,
    sender_username: &str,
    auction_title: &str,
    payment_id: i64,
    message_id: i64,
) -> Vec<NewNotification> {
    vec![NewNotification {
        user_id: receiver_id,
        title: "New Message".to_string(),
        message: format!(
            "You have a new message from {} regarding auction '{}'",
            sender_username, auction_title
        ),
        kind: NotificationType::Message,
        level: NotificationLevel::Info,
        link: Some(format!("/messages/thread/{}/", payment_id)),
        object: Some(RelatedObject::message(message_id)),
    }]
}

/// Completed payment: one notification for the buyer and one for the seller.
pub fn plan_payment_completed(
    buyer_id: i64,
    seller_id: i64,
    amount: Decimal,
    auction_title: &str,
    payment_id: i64,
) -> Vec<NewNotification> {
    vec![
        NewNotification {
            user_id: buyer_id,
            title: "Payment Successful".to_string(),
            message: format!(
                "Your payment of ${} for '{}' has been processed successfully.",
                amount, auction_title
            ),
            kind: NotificationType::Payment,
            level: NotificationLevel::Success,
            link: Some(format!("/payments/receipt/{}/", payment_id)),
            object: Some(RelatedObject::payment(payment_id)),
        },
        NewNotification {
            user_id: seller_id,
            title: "Payment Received".to_string(),
            message: format!(
                "Payment of ${} for your auction '{}' has been received.",
                amount, auction_title
            ),
            kind: NotificationType::Payment,
            level: NotificationLevel::Success,
            link: Some(format!("/payments/receipt/{}/", payment_id)),
            object: Some(RelatedObject::payment(payment_id)),
        },
    ]
}

// endregion: --- Fan-out Rules

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn auction() -> AuctionRef {
        AuctionRef {
            id: 7,
            title: "iPad Air".to_string(),
            owner_id: 1,
        }
    }

    #[test]
    fn test_bid_notifies_owner_and_previous_top_bidder() {
        let plan = plan_bid(&auction(), 3, "sara", dec!(120.00), Some(2));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].user_id, 1);
        assert_eq!(plan[0].kind, NotificationType::Bid);
        assert_eq!(
            plan[0].message,
            "sara placed a bid of $120.00 on your auction 'iPad Air'."
        );
        assert_eq!(plan[1].user_id, 2);
        assert_eq!(plan[1].kind, NotificationType::Outbid);
        assert_eq!(plan[1].level, NotificationLevel::Warning);
        assert_eq!(plan[1].link.as_deref(), Some("/auction/7"));
    }

    #[test]
    fn test_bid_skips_owner_as_previous_bidder() {
        let plan = plan_bid(&auction(), 3, "sara", dec!(120.00), Some(1));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].kind, NotificationType::Bid);

        let plan = plan_bid(&auction(), 3, "sara", dec!(120.00), None);
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_comment_by_owner_is_silent() {
        assert!(plan_comment(&auction(), 1, "owner", 5).is_empty());
        let plan = plan_comment(&auction(), 4, "omar", 5);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].object, Some(RelatedObject::comment(5)));
    }

    #[test]
    fn test_closed_auction_with_outside_winner() {
        let plan = plan_auction_closed(&auction(), Some((2, dec!(150.00))));
        let kinds: Vec<_> = plan.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![NotificationType::AuctionEnded, NotificationType::AuctionWon]
        );
        assert_eq!(plan[1].user_id, 2);
        assert_eq!(plan[1].level, NotificationLevel::Success);
    }

    #[test]
    fn test_closed_auction_with_only_owner_bid() {
        let plan = plan_auction_closed(&auction(), Some((1, dec!(100.00))));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].kind, NotificationType::AuctionEnded);
        assert_eq!(plan_auction_closed(&auction(), None).len(), 1);
    }

    #[test]
    fn test_rating_and_message_links() {
        let plan = plan_rating(2, "sara", "omar", 4, 9);
        assert_eq!(plan[0].link.as_deref(), Some("/profile/sara/ratings/"));
        assert_eq!(plan[0].message, "omar gave you a 4/5 rating.");

        let plan = plan_message(2, "omar", "iPad Air", 11, 30);
        assert_eq!(plan[0].link.as_deref(), Some("/messages/thread/11/"));
    }

    #[test]
    fn test_payment_completed_notifies_both_parties() {
        let plan = plan_payment_completed(2, 1, dec!(150.00), "iPad Air", 11);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].title, "Payment Successful");
        assert_eq!(plan[0].user_id, 2);
        assert_eq!(plan[1].title, "Payment Received");
        assert_eq!(plan[1].user_id, 1);
        assert!(plan.iter().all(|n| n.kind == NotificationType::Payment));
    }
}
