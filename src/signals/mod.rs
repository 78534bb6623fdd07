//! In-process domain events.
//!
//! Commands dispatch an event on the same connection that wrote the record,
//! so the notifications it produces commit or roll back together with it.
pub mod queries;

// region:    --- Imports
use crate::error::{AppError, AppResult};
use crate::notifications::service::{self, AuctionRef, NewNotification};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Domain Events

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum DomainEvent {
    BidPlaced {
        auction_id: i64,
        bid_id: i64,
        bidder_id: i64,
        amount: Decimal,
    },
    CommentPosted {
        auction_id: i64,
        comment_id: i64,
        commenter_id: i64,
    },
    RatingCreated {
        rating_id: i64,
        rated_user_id: i64,
        rater_id: i64,
        score: i32,
    },
    AuctionClosed {
        auction_id: i64,
    },
    MessageSent {
        message_id: i64,
        payment_id: i64,
        sender_id: i64,
        receiver_id: i64,
    },
    PaymentCompleted {
        payment_id: i64,
    },
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::BidPlaced { .. } => "BidPlaced",
            DomainEvent::CommentPosted { .. } => "CommentPosted",
            DomainEvent::RatingCreated { .. } => "RatingCreated",
            DomainEvent::AuctionClosed { .. } => "AuctionClosed",
            DomainEvent::MessageSent { .. } => "MessageSent",
            DomainEvent::PaymentCompleted { .. } => "PaymentCompleted",
        }
    }
}

// endregion: --- Domain Events

// region:    --- Dispatch

/// Run every receiver of `event`; returns how many notifications were stored.
pub async fn dispatch(conn: &mut PgConnection, event: DomainEvent) -> AppResult<usize> {
    info!("{:<12} --> {}", "Signal", event.event_type());
    let plan = match event {
        DomainEvent::BidPlaced {
            auction_id,
            bid_id,
            bidder_id,
            amount,
        } => {
            let auction = auction_ref(conn, auction_id).await?;
            let bidder = username(conn, bidder_id).await?;
            let previous = sqlx::query_scalar::<_, i64>(queries::GET_PREVIOUS_TOP_BIDDER)
                .bind(auction_id)
                .bind(bid_id)
                .bind(bidder_id)
                .fetch_optional(&mut *conn)
                .await?;
            service::plan_bid(&auction, bidder_id, &bidder, amount, previous)
        }
        DomainEvent::CommentPosted {
            auction_id,
            comment_id,
            commenter_id,
        } => {
            let auction = auction_ref(conn, auction_id).await?;
            let commenter = username(conn, commenter_id).await?;
            service::plan_comment(&auction, commenter_id, &commenter, comment_id)
        }
        DomainEvent::RatingCreated {
            rating_id,
            rated_user_id,
            rater_id,
            score,
        } => {
            let rated = username(conn, rated_user_id).await?;
            let rater = username(conn, rater_id).await?;
            service::plan_rating(rated_user_id, &rated, &rater, score, rating_id)
        }
        DomainEvent::AuctionClosed { auction_id } => {
            let auction = auction_ref(conn, auction_id).await?;
            let highest = sqlx::query_as::<_, (i64, Decimal)>(queries::GET_HIGHEST_BID)
                .bind(auction_id)
                .fetch_optional(&mut *conn)
                .await?;
            service::plan_auction_closed(&auction, highest)
        }
        DomainEvent::MessageSent {
            message_id,
            payment_id,
            sender_id,
            receiver_id,
        } => {
            let (_, _, _, title) = payment_parties(conn, payment_id).await?;
            let sender = username(conn, sender_id).await?;
            service::plan_message(receiver_id, &sender, &title, payment_id, message_id)
        }
        DomainEvent::PaymentCompleted { payment_id } => {
            let (buyer_id, seller_id, amount, title) = payment_parties(conn, payment_id).await?;
            service::plan_payment_completed(buyer_id, seller_id, amount, &title, payment_id)
        }
    };

    deliver(conn, &plan).await
}

async fn deliver(conn: &mut PgConnection, plan: &[NewNotification]) -> AppResult<usize> {
    let mut delivered = 0;
    for new in plan {
        if service::create_notification(conn, new).await?.is_some() {
            delivered += 1;
        }
    }
    Ok(delivered)
}

async fn auction_ref(conn: &mut PgConnection, auction_id: i64) -> AppResult<AuctionRef> {
    let (id, title, owner_id) = sqlx::query_as::<_, (i64, String, i64)>(queries::GET_AUCTION_REF)
        .bind(auction_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| {
            warn!("{:<12} --> Auction {} vanished", "Signal", auction_id);
            AppError::NotFound("Auction not found.".to_string())
        })?;
    Ok(AuctionRef {
        id,
        title,
        owner_id,
    })
}

async fn username(conn: &mut PgConnection, user_id: i64) -> AppResult<String> {
    sqlx::query_scalar::<_, String>(queries::GET_USERNAME)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
}

async fn payment_parties(
    conn: &mut PgConnection,
    payment_id: i64,
) -> AppResult<(i64, i64, Decimal, String)> {
    sqlx::query_as::<_, (i64, i64, Decimal, String)>(queries::GET_PAYMENT_PARTIES)
        .bind(payment_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found.".to_string()))
}

// endregion: --- Dispatch

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_event_names() {
        let event = DomainEvent::BidPlaced {
            auction_id: 1,
            bid_id: 2,
            bidder_id: 3,
            amount: dec!(10.50),
        };
        assert_eq!(event.event_type(), "BidPlaced");
        assert_eq!(
            DomainEvent::PaymentCompleted { payment_id: 1 }.event_type(),
            "PaymentCompleted"
        );
    }

    #[test]
    fn test_event_serializes_with_variant_tag() {
        let value = serde_json::to_value(DomainEvent::AuctionClosed { auction_id: 4 }).unwrap();
        assert_eq!(value, serde_json::json!({ "AuctionClosed": { "auction_id": 4 } }));
    }
}
