use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// region:    --- Kinds

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Bid,
    Outbid,
    AuctionWon,
    AuctionEnded,
    Comment,
    Rating,
    Message,
    Payment,
    System,
}

impl NotificationType {
    pub const ALL: [NotificationType; 9] = [
        NotificationType::Bid,
        NotificationType::Outbid,
        NotificationType::AuctionWon,
        NotificationType::AuctionEnded,
        NotificationType::Comment,
        NotificationType::Rating,
        NotificationType::Message,
        NotificationType::Payment,
        NotificationType::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Bid => "bid",
            NotificationType::Outbid => "outbid",
            NotificationType::AuctionWon => "auction_won",
            NotificationType::AuctionEnded => "auction_ended",
            NotificationType::Comment => "comment",
            NotificationType::Rating => "rating",
            NotificationType::Message => "message",
            NotificationType::Payment => "payment",
            NotificationType::System => "system",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotificationType::Bid => "New Bid",
            NotificationType::Outbid => "Outbid",
            NotificationType::AuctionWon => "Auction Won",
            NotificationType::AuctionEnded => "Auction Ended",
            NotificationType::Comment => "New Comment",
            NotificationType::Rating => "New Rating",
            NotificationType::Message => "New Message",
            NotificationType::Payment => "Payment",
            NotificationType::System => "System Notification",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown notification type: {0}")]
pub struct UnknownNotificationType(pub String);

impl FromStr for NotificationType {
    type Err = UnknownNotificationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownNotificationType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        }
    }
}

// endregion: --- Kinds

// region:    --- Records

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub level: String,
    pub link: Option<String>,
    pub object_type: Option<String>,
    pub object_id: Option<i64>,
    pub is_read: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Notification as listed to its owner
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub time_since: String,
}

impl NotificationView {
    pub fn at(notification: Notification, now: DateTime<Utc>) -> Self {
        let time_since = time_since(notification.created_at, now);
        Self {
            notification,
            time_since,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct NotificationPreference {
    pub user_id: i64,
    pub email_bid: bool,
    pub email_outbid: bool,
    pub email_auction_won: bool,
    pub email_auction_ended: bool,
    pub email_comment: bool,
    pub email_rating: bool,
    pub email_message: bool,
    pub email_system: bool,
    pub app_bid: bool,
    pub app_outbid: bool,
    pub app_auction_won: bool,
    pub app_auction_ended: bool,
    pub app_comment: bool,
    pub app_rating: bool,
    pub app_message: bool,
    pub app_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreference {
    /// Email flag for a type; types without a flag never send mail.
    pub fn should_send_email(&self, kind: NotificationType) -> bool {
        match kind {
            NotificationType::Bid => self.email_bid,
            NotificationType::Outbid => self.email_outbid,
            NotificationType::AuctionWon => self.email_auction_won,
            NotificationType::AuctionEnded => self.email_auction_ended,
            NotificationType::Comment => self.email_comment,
            NotificationType::Rating => self.email_rating,
            NotificationType::Message => self.email_message,
            NotificationType::System => self.email_system,
            NotificationType::Payment => false,
        }
    }

    /// In-app flag for a type; types without a flag are always delivered.
    pub fn should_send_app_notification(&self, kind: NotificationType) -> bool {
        match kind {
            NotificationType::Bid => self.app_bid,
            NotificationType::Outbid => self.app_outbid,
            NotificationType::AuctionWon => self.app_auction_won,
            NotificationType::AuctionEnded => self.app_auction_ended,
            NotificationType::Comment => self.app_comment,
            NotificationType::Rating => self.app_rating,
            NotificationType::Message => self.app_message,
            NotificationType::System => self.app_system,
            NotificationType::Payment => true,
        }
    }
}

/// Partial preference update; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub email_bid: Option<bool>,
    pub email_outbid: Option<bool>,
    pub email_auction_won: Option<bool>,
    pub email_auction_ended: Option<bool>,
    pub email_comment: Option<bool>,
    pub email_rating: Option<bool>,
    pub email_message: Option<bool>,
    pub email_system: Option<bool>,
    pub app_bid: Option<bool>,
    pub app_outbid: Option<bool>,
    pub app_auction_won: Option<bool>,
    pub app_auction_ended: Option<bool>,
    pub app_comment: Option<bool>,
    pub app_rating: Option<bool>,
    pub app_message: Option<bool>,
    pub app_system: Option<bool>,
}

// endregion: --- Records

// region:    --- Views

#[derive(Debug, Serialize)]
pub struct NotificationListView {
    pub notifications: crate::pagination::Page<NotificationView>,
    pub unread_count: i64,
    pub preferences: NotificationPreference,
}

#[derive(Debug, Serialize)]
pub struct DropdownView {
    pub notifications: Vec<NotificationView>,
    pub unread_count: i64,
}

// endregion: --- Views

/// Coarse "time since" label, largest unit first.
pub fn time_since(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - created_at).num_seconds().max(0);
    let days = elapsed / 86_400;
    let hours = (elapsed % 86_400) / 3_600;
    let minutes = (elapsed % 86_400) / 60;

    match (days, hours, minutes) {
        (1, _, _) => "1 day ago".to_string(),
        (d, _, _) if d > 1 => format!("{} days ago", d),
        (_, 1, _) => "1 hour ago".to_string(),
        (_, h, _) if h > 1 => format!("{} hours ago", h),
        (_, _, 1) => "1 minute ago".to_string(),
        (_, _, m) if m > 1 => format!("{} minutes ago", m),
        _ => "Just now".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn prefs() -> NotificationPreference {
        NotificationPreference {
            user_id: 1,
            email_bid: true,
            email_outbid: true,
            email_auction_won: true,
            email_auction_ended: true,
            email_comment: false,
            email_rating: true,
            email_message: true,
            email_system: true,
            app_bid: true,
            app_outbid: true,
            app_auction_won: true,
            app_auction_ended: true,
            app_comment: true,
            app_rating: true,
            app_message: true,
            app_system: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_time_since_labels() {
        let now = Utc::now();
        assert_eq!(time_since(now - Duration::seconds(30), now), "Just now");
        assert_eq!(time_since(now - Duration::seconds(90), now), "1 minute ago");
        assert_eq!(time_since(now - Duration::minutes(45), now), "45 minutes ago");
        assert_eq!(time_since(now - Duration::minutes(61), now), "1 hour ago");
        assert_eq!(time_since(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(time_since(now - Duration::hours(25), now), "1 day ago");
        assert_eq!(time_since(now - Duration::days(2), now), "2 days ago");
        assert_eq!(time_since(now + Duration::seconds(5), now), "Just now");
    }

    #[test]
    fn test_preference_lookup() {
        let mut prefs = prefs();
        assert!(!prefs.should_send_email(NotificationType::Comment));
        assert!(prefs.should_send_app_notification(NotificationType::Comment));

        prefs.app_bid = false;
        assert!(!prefs.should_send_app_notification(NotificationType::Bid));
        assert!(prefs.should_send_app_notification(NotificationType::Payment));
        assert!(!prefs.should_send_email(NotificationType::Payment));
    }

    #[test]
    fn test_type_names() {
        for kind in NotificationType::ALL {
            assert_eq!(kind.as_str().parse::<NotificationType>().unwrap(), kind);
        }
        assert!("bogus".parse::<NotificationType>().is_err());
    }
}
