// region:    --- Imports
use super::model::{sort_threads, InboxThread, Message, ThreadView};
use super::queries;
use crate::auctions::reads::get_auction;
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::payments::commands::{get_payment, get_public_user};
use crate::payments::model::Payment;
use crate::signals::{self, DomainEvent};
use serde::Deserialize;
use tracing::info;
// endregion: --- Imports

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageCommand {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, sqlx::FromRow)]
struct InboxPaymentRow {
    #[sqlx(flatten)]
    payment: Payment,
    auction_title: String,
    seller_id: i64,
}

/// The other participant of a payment thread. Only the buyer and the seller
/// take part.
pub fn other_party(buyer_id: i64, seller_id: i64, viewer_id: i64) -> AppResult<i64> {
    if viewer_id == buyer_id {
        Ok(seller_id)
    } else if viewer_id == seller_id {
        Ok(buyer_id)
    } else {
        Err(AppError::Forbidden(
            "You don't have permission to view this conversation.".to_string(),
        ))
    }
}

pub fn validate_content(content: &str) -> AppResult<&str> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Message cannot be empty.".to_string()));
    }
    Ok(content)
}

/// Opening a thread marks the viewer's incoming messages read.
pub async fn thread(
    db_manager: &DatabaseManager,
    viewer_id: i64,
    payment_id: i64,
) -> AppResult<ThreadView> {
    let pool = db_manager.pool();
    let payment = get_payment(pool, payment_id).await?;
    let auction = get_auction(pool, payment.auction_id).await?;
    let other_id = other_party(payment.user_id, auction.user_id, viewer_id)?;

    let mut conn = pool.acquire().await?;
    sqlx::query(queries::MARK_THREAD_READ)
        .bind(payment.id)
        .bind(viewer_id)
        .execute(&mut *conn)
        .await?;
    let messages = sqlx::query_as::<_, Message>(queries::LIST_THREAD_MESSAGES)
        .bind(payment.id)
        .fetch_all(&mut *conn)
        .await?;
    let other_user = get_public_user(&mut conn, other_id).await?;

    Ok(ThreadView {
        title: format!("Conversation with {}", other_user.username),
        payment,
        auction,
        other_user,
        messages,
    })
}

pub async fn send(
    db_manager: &DatabaseManager,
    sender_id: i64,
    payment_id: i64,
    cmd: SendMessageCommand,
) -> AppResult<Message> {
    let pool = db_manager.pool();
    let payment = get_payment(pool, payment_id).await?;
    let auction = get_auction(pool, payment.auction_id).await?;
    let receiver_id = other_party(payment.user_id, auction.user_id, sender_id)?;
    let content = validate_content(&cmd.content)?;

    let mut tx = pool.begin().await?;
    let message = sqlx::query_as::<_, Message>(queries::INSERT_MESSAGE)
        .bind(payment.id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;
    signals::dispatch(
        &mut tx,
        DomainEvent::MessageSent {
            message_id: message.id,
            payment_id: payment.id,
            sender_id,
            receiver_id,
        },
    )
    .await?;
    tx.commit().await?;

    info!(
        "{:<12} --> Message {} on payment {}",
        "Command", message.id, payment.id
    );
    Ok(message)
}

/// One thread per completed payment the viewer took part in.
pub async fn inbox(db_manager: &DatabaseManager, viewer_id: i64) -> AppResult<Vec<InboxThread>> {
    let mut conn = db_manager.pool().acquire().await?;
    let rows = sqlx::query_as::<_, InboxPaymentRow>(queries::LIST_INBOX_PAYMENTS)
        .bind(viewer_id)
        .fetch_all(&mut *conn)
        .await?;

    let mut threads = Vec::with_capacity(rows.len());
    for row in rows {
        let other_id = if row.seller_id == viewer_id {
            row.payment.user_id
        } else {
            row.seller_id
        };
        let other_user = get_public_user(&mut conn, other_id).await?;
        let latest_message = sqlx::query_as::<_, Message>(queries::LATEST_MESSAGE)
            .bind(row.payment.id)
            .fetch_optional(&mut *conn)
            .await?;
        let unread_count = sqlx::query_scalar::<_, i64>(queries::COUNT_UNREAD_IN_THREAD)
            .bind(row.payment.id)
            .bind(viewer_id)
            .fetch_one(&mut *conn)
            .await?;

        threads.push(InboxThread {
            payment: row.payment,
            auction_title: row.auction_title,
            other_user,
            has_messages: latest_message.is_some(),
            latest_message,
            unread_count,
        });
    }
    sort_threads(&mut threads);
    Ok(threads)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_party() {
        assert_eq!(other_party(1, 2, 1).unwrap(), 2);
        assert_eq!(other_party(1, 2, 2).unwrap(), 1);
        let err = other_party(1, 2, 3).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[test]
    fn test_content_is_trimmed() {
        assert_eq!(validate_content("  hello \n").unwrap(), "hello");
        assert_eq!(
            validate_content("   ").unwrap_err().to_string(),
            "Message cannot be empty."
        );
    }
}
