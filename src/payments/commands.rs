/// Payment operations
/// 1. Checkout for a won auction
/// 2. Buyer-facing result pages
/// 3. Stripe webhook processing
/// 4. Payment history, seller payments and receipts
// region:    --- Imports
use super::gateway::PaymentGateway;
use super::model::{
    to_minor_units, CheckoutView, Payment, PaymentHistoryView, PaymentPageView, PaymentStatus,
    PaymentSummary, ReceiptView, SellerPaymentsView, WebhookOutcome,
};
use super::queries;
use super::webhook::{self, WebhookEvent};
use crate::accounts::model::PublicUser;
use crate::auctions::reads::{get_auction, get_highest_bid};
use crate::config::StripeConfig;
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::signals::{self, DomainEvent};
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::{error, info, warn};
// endregion: --- Imports

/// Result of starting a checkout.
#[derive(Debug)]
pub enum Checkout {
    Ready(CheckoutView),
    /// The buyer already paid; carries the completed payment.
    AlreadyPaid(Payment),
}

pub async fn get_payment(pool: &PgPool, payment_id: i64) -> AppResult<Payment> {
    sqlx::query_as::<_, Payment>(queries::GET_PAYMENT)
        .bind(payment_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found.".to_string()))
}

pub async fn get_public_user(conn: &mut PgConnection, user_id: i64) -> AppResult<PublicUser> {
    sqlx::query_as::<_, PublicUser>(queries::GET_PUBLIC_USER)
        .bind(user_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
}

// region:    --- Checkout

/// 1. Start paying for a closed auction the caller won
pub async fn process(
    db_manager: &DatabaseManager,
    gateway: &dyn PaymentGateway,
    stripe: &StripeConfig,
    buyer_id: i64,
    auction_id: i64,
) -> AppResult<Checkout> {
    let pool = db_manager.pool();
    let auction = get_auction(pool, auction_id).await?;

    if !auction.is_close {
        return Err(AppError::rejected(
            "AUCTION_OPEN",
            "This auction is not closed yet. You cannot make a payment.",
        ));
    }

    let highest = get_highest_bid(pool, auction.id)
        .await?
        .filter(|bid| bid.user_id == buyer_id)
        .ok_or_else(|| {
            AppError::Forbidden("Only the auction winner can make a payment.".to_string())
        })?;

    let existing = sqlx::query_as::<_, Payment>(queries::FIND_OPEN_PAYMENT)
        .bind(buyer_id)
        .bind(auction.id)
        .fetch_optional(pool)
        .await?;

    let payment = match existing {
        Some(payment) if payment.is(PaymentStatus::Completed) => {
            return Ok(Checkout::AlreadyPaid(payment));
        }
        Some(payment) => payment,
        None => {
            sqlx::query_as::<_, Payment>(queries::INSERT_PAYMENT)
                .bind(buyer_id)
                .bind(auction.id)
                .bind(highest.amount)
                .fetch_one(pool)
                .await?
        }
    };

    let amount_minor = to_minor_units(payment.amount)
        .ok_or_else(|| AppError::Validation("Payment amount is out of range.".to_string()))?;
    let metadata = [
        ("auction_id", auction.id.to_string()),
        ("payment_id", payment.id.to_string()),
        ("user_id", buyer_id.to_string()),
    ];
    let intent = gateway
        .create_payment_intent(amount_minor, &stripe.currency, &metadata)
        .await
        .map_err(|e| {
            error!("{:<12} --> Payment {} failed: {}", "Payment", payment.id, e);
            AppError::ExternalService(format!("Error creating payment: {}", e))
        })?;

    let payment = sqlx::query_as::<_, Payment>(queries::SET_PAYMENT_INTENT)
        .bind(payment.id)
        .bind(&intent.id)
        .fetch_one(pool)
        .await?;
    info!(
        "{:<12} --> Payment {} waiting on intent {}",
        "Payment", payment.id, intent.id
    );

    Ok(Checkout::Ready(CheckoutView {
        auction,
        payment,
        client_secret: intent.client_secret,
        stripe_publishable_key: stripe.publishable_key.clone(),
        currency: stripe.currency.clone(),
    }))
}

// endregion: --- Checkout

// region:    --- Result Pages

/// 2. Success and canceled pages are only for the buyer
pub async fn payment_page(
    db_manager: &DatabaseManager,
    user_id: i64,
    payment_id: i64,
) -> AppResult<PaymentPageView> {
    let pool = db_manager.pool();
    let payment = get_payment(pool, payment_id).await?;
    if payment.user_id != user_id {
        return Err(AppError::Forbidden(
            "You don't have permission to view this payment.".to_string(),
        ));
    }
    let auction = get_auction(pool, payment.auction_id).await?;
    Ok(PaymentPageView { payment, auction })
}

// endregion: --- Result Pages

// region:    --- Webhook

/// 3. Apply a Stripe event. Signature checks only run with a real secret.
pub async fn handle_webhook(
    db_manager: &DatabaseManager,
    stripe: &StripeConfig,
    payload: &[u8],
    signature: Option<&str>,
) -> AppResult<WebhookOutcome> {
    let preview: String = String::from_utf8_lossy(payload).chars().take(100).collect();
    info!("{:<12} --> Received webhook: {}...", "Webhook", preview);

    if stripe.verifies_webhooks() {
        let header = signature.ok_or_else(|| {
            AppError::rejected("INVALID_SIGNATURE", "Missing Stripe-Signature header.")
        })?;
        webhook::verify_signature(
            payload,
            header,
            stripe.webhook_secret.trim(),
            Utc::now().timestamp(),
        )
        .inspect_err(|e| error!("{:<12} --> {}", "Webhook", e))?;
    }

    let event = WebhookEvent::parse(payload)
        .inspect_err(|e| error!("{:<12} --> Invalid payload: {}", "Webhook", e))?;

    let outcome = match (event.kind(), event.object_id()) {
        (webhook::PAYMENT_INTENT_SUCCEEDED, Some(intent_id)) => {
            complete_payment(db_manager, intent_id).await?
        }
        (webhook::PAYMENT_INTENT_FAILED, Some(intent_id)) => {
            fail_payment(db_manager, intent_id).await?
        }
        (kind, _) => WebhookOutcome::Ignored(kind.to_string()),
    };
    info!("{:<12} --> {:?}", "Webhook", outcome);
    Ok(outcome)
}

/// Completes the matching payment and notifies buyer and seller in one transaction.
pub async fn complete_payment(
    db_manager: &DatabaseManager,
    intent_id: &str,
) -> AppResult<WebhookOutcome> {
    let mut tx = db_manager.pool().begin().await?;
    let Some(payment) = sqlx::query_as::<_, Payment>(queries::GET_PAYMENT_BY_INTENT_FOR_UPDATE)
        .bind(intent_id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        error!("{:<12} --> Payment with intent ID {} not found", "Webhook", intent_id);
        return Ok(WebhookOutcome::UnknownIntent(intent_id.to_string()));
    };

    if payment.is(PaymentStatus::Completed) {
        return Ok(WebhookOutcome::AlreadyCompleted {
            payment_id: payment.id,
        });
    }

    sqlx::query(queries::SET_PAYMENT_STATUS)
        .bind(payment.id)
        .bind(PaymentStatus::Completed.as_str())
        .execute(&mut *tx)
        .await?;
    let notifications = signals::dispatch(
        &mut tx,
        DomainEvent::PaymentCompleted {
            payment_id: payment.id,
        },
    )
    .await?;
    tx.commit().await?;

    info!(
        "{:<12} --> Payment {} updated to completed and notifications sent",
        "Webhook", payment.id
    );
    Ok(WebhookOutcome::Completed {
        payment_id: payment.id,
        notifications,
    })
}

async fn fail_payment(db_manager: &DatabaseManager, intent_id: &str) -> AppResult<WebhookOutcome> {
    let mut tx = db_manager.pool().begin().await?;
    let Some(payment) = sqlx::query_as::<_, Payment>(queries::GET_PAYMENT_BY_INTENT_FOR_UPDATE)
        .bind(intent_id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        warn!("{:<12} --> Failed intent {} has no payment", "Webhook", intent_id);
        return Ok(WebhookOutcome::UnknownIntent(intent_id.to_string()));
    };

    if payment.is(PaymentStatus::Pending) {
        sqlx::query(queries::SET_PAYMENT_STATUS)
            .bind(payment.id)
            .bind(PaymentStatus::Failed.as_str())
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(WebhookOutcome::Failed {
        payment_id: payment.id,
    })
}

// endregion: --- Webhook

// region:    --- History

/// 4. Payments made by the caller
pub async fn history(db_manager: &DatabaseManager, user_id: i64) -> AppResult<PaymentHistoryView> {
    let payments = sqlx::query_as::<_, PaymentSummary>(queries::LIST_BUYER_PAYMENTS)
        .bind(user_id)
        .fetch_all(db_manager.pool())
        .await?;
    Ok(PaymentHistoryView {
        payment_count: payments.len(),
        payments,
    })
}

/// Payments for auctions the caller owns
pub async fn seller_payments(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> AppResult<SellerPaymentsView> {
    let payments = sqlx::query_as::<_, PaymentSummary>(queries::LIST_SELLER_PAYMENTS)
        .bind(user_id)
        .fetch_all(db_manager.pool())
        .await?;
    Ok(SellerPaymentsView::new(payments))
}

pub async fn receipt(
    db_manager: &DatabaseManager,
    user_id: i64,
    payment_id: i64,
) -> AppResult<ReceiptView> {
    let pool = db_manager.pool();
    let payment = get_payment(pool, payment_id).await?;
    let auction = get_auction(pool, payment.auction_id).await?;

    if payment.user_id != user_id && auction.user_id != user_id {
        return Err(AppError::Forbidden(
            "You don't have permission to view this receipt.".to_string(),
        ));
    }
    if !payment.is(PaymentStatus::Completed) {
        return Err(AppError::rejected(
            "PAYMENT_NOT_COMPLETED",
            "Receipt is only available for completed payments.",
        ));
    }

    let mut conn = pool.acquire().await?;
    let buyer = get_public_user(&mut conn, payment.user_id).await?;
    let seller = get_public_user(&mut conn, auction.user_id).await?;

    Ok(ReceiptView {
        receipt_number: payment.receipt_number(),
        payment,
        auction,
        buyer,
        seller,
    })
}

// endregion: --- History
