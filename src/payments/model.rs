use crate::accounts::model::PublicUser;
use crate::auctions::model::Auction;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Canceled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: i64,
    /// Buyer
    pub user_id: i64,
    pub auction_id: i64,
    pub amount: Decimal,
    pub status: String,
    pub stripe_payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn is(&self, status: PaymentStatus) -> bool {
        self.status == status.as_str()
    }

    /// `REC-<id>-<created_at as unix seconds>`
    pub fn receipt_number(&self) -> String {
        format!("REC-{}-{}", self.id, self.created_at.timestamp())
    }
}

/// Payment row joined with its auction title.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentSummary {
    pub id: i64,
    pub user_id: i64,
    pub auction_id: i64,
    pub auction_title: String,
    pub amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Converts a decimal amount into the currency's smallest unit.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED).trunc().to_i64()
}

/// Created payment intent as returned by the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub auction: Auction,
    pub payment: Payment,
    pub client_secret: Option<String>,
    pub stripe_publishable_key: String,
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentPageView {
    pub payment: Payment,
    pub auction: Auction,
}

#[derive(Debug, Serialize)]
pub struct PaymentHistoryView {
    pub payments: Vec<PaymentSummary>,
    pub payment_count: usize,
}

#[derive(Debug, Serialize)]
pub struct SellerPaymentsView {
    pub payments: Vec<PaymentSummary>,
    pub payment_count: usize,
    pub total_earnings: Decimal,
}

impl SellerPaymentsView {
    pub fn new(payments: Vec<PaymentSummary>) -> Self {
        let total_earnings = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed.as_str())
            .map(|p| p.amount)
            .sum();
        Self {
            payment_count: payments.len(),
            payments,
            total_earnings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReceiptView {
    pub receipt_number: String,
    pub payment: Payment,
    pub auction: Auction,
    pub buyer: PublicUser,
    pub seller: PublicUser,
}

/// Outcome of one webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Completed { payment_id: i64, notifications: usize },
    AlreadyCompleted { payment_id: i64 },
    Failed { payment_id: i64 },
    UnknownIntent(String),
    Ignored(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn summary(amount: Decimal, status: PaymentStatus) -> PaymentSummary {
        PaymentSummary {
            id: 1,
            user_id: 2,
            auction_id: 3,
            auction_title: "Lamp".to_string(),
            amount,
            status: status.as_str().to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(to_minor_units(dec!(12.34)), Some(1234));
        assert_eq!(to_minor_units(dec!(999999.99)), Some(99_999_999));
        assert_eq!(to_minor_units(dec!(0.5)), Some(50));
    }

    #[test]
    fn test_receipt_number_uses_creation_time() {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let payment = Payment {
            id: 42,
            user_id: 1,
            auction_id: 1,
            amount: dec!(10),
            status: "completed".to_string(),
            stripe_payment_intent_id: None,
            created_at,
            updated_at: created_at,
        };
        assert_eq!(payment.receipt_number(), format!("REC-42-{}", created_at.timestamp()));
        assert!(payment.is(PaymentStatus::Completed));
    }

    #[test]
    fn test_seller_earnings_count_completed_only() {
        let view = SellerPaymentsView::new(vec![
            summary(dec!(10.00), PaymentStatus::Completed),
            summary(dec!(5.50), PaymentStatus::Pending),
            summary(dec!(2.25), PaymentStatus::Completed),
        ]);
        assert_eq!(view.payment_count, 3);
        assert_eq!(view.total_earnings, dec!(12.25));
    }
}
