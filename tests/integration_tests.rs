//! Database-backed scenarios. They need a live PostgreSQL at `DATABASE_URL`:
//! `cargo test -- --ignored`
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use hmac::{Hmac, Mac};
use mazadi::accounts::commands::{
    insert_rating, register, submit_rating, NewRating, RegisterCommand, SubmitRatingCommand,
};
use mazadi::accounts::model::User;
use mazadi::auctions::commands::{
    close_auction, create_auction, place_bid, CreateAuctionCommand, PlaceBidCommand,
};
use mazadi::chatbot::bot::{
    SmartChatBot, SOURCE_DATABASE_KB, SOURCE_FALLBACK, SOURCE_KNOWLEDGE_BASE,
};
use mazadi::chatbot::models::ChatModels;
use mazadi::chatbot::queries as chatbot_queries;
use mazadi::config::{AppConfig, ChatbotConfig, DatabaseConfig, StripeConfig};
use mazadi::database::DatabaseManager;
use mazadi::error::{AppError, AppResult};
use mazadi::notifications::commands::update_preferences;
use mazadi::notifications::model::{NotificationLevel, NotificationType, PreferencesUpdate};
use mazadi::notifications::service::{create_notification, NewNotification, RelatedObject};
use mazadi::payments::commands::{complete_payment, get_payment, handle_webhook, process, Checkout};
use mazadi::payments::gateway::PaymentGateway;
use mazadi::payments::model::{Payment, PaymentIntent, PaymentStatus, WebhookOutcome};
use mazadi::routes;
use mazadi::state::AppState;
use rust_decimal_macros::dec;
use sha2::Sha256;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

// region:    --- Fixtures

const COUNT_FOR_OBJECT: &str = r#"
    SELECT COUNT(*) FROM notifications
    WHERE object_type = $1 AND object_id = $2 AND notification_type = $3
"#;

const WEBHOOK_SECRET: &str = "whsec_integration_secret";

async fn setup() -> Arc<DatabaseManager> {
    let config = DatabaseConfig::from_env().unwrap();
    let db_manager = DatabaseManager::new(&config).await.unwrap();
    db_manager.initialize_database(false).await.unwrap();
    Arc::new(db_manager)
}

async fn create_user(db_manager: &DatabaseManager, prefix: &str) -> User {
    let username = format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..8]);
    let grant = register(
        db_manager,
        RegisterCommand {
            username: username.clone(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: format!("{}@example.com", username),
            password1: "correct-horse-battery".to_string(),
            password2: "correct-horse-battery".to_string(),
        },
        1,
    )
    .await
    .unwrap();
    grant.user
}

async fn create_listing(db_manager: &DatabaseManager, owner: &User) -> i64 {
    create_auction(
        db_manager,
        owner.id,
        CreateAuctionCommand {
            title: "Vintage camera".to_string(),
            description: "Works perfectly".to_string(),
            price: dec!(100.00),
            category: None,
            amount: dec!(10.00),
            image: None,
            image_url: Some("https://example.com/camera.jpg".to_string()),
        },
        "/media/auction_images/",
    )
    .await
    .unwrap()
    .id
}

async fn bid(db_manager: &DatabaseManager, bidder: &User, auction_id: i64, amount: rust_decimal::Decimal) -> AppResult<()> {
    place_bid(db_manager, bidder.id, PlaceBidCommand { auction_id, amount })
        .await
        .map(|_| ())
}

async fn count_notifications(
    db_manager: &DatabaseManager,
    object_type: &str,
    object_id: i64,
    notification_type: &str,
) -> i64 {
    sqlx::query_scalar::<_, i64>(COUNT_FOR_OBJECT)
        .bind(object_type)
        .bind(object_id)
        .bind(notification_type)
        .fetch_one(db_manager.pool())
        .await
        .unwrap()
}

/// Gateway handing out fresh intent ids without any network call.
struct FakeGateway;

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment_intent(
        &self,
        _amount_minor: i64,
        _currency: &str,
        _metadata: &[(&str, String)],
    ) -> AppResult<PaymentIntent> {
        Ok(PaymentIntent {
            id: format!("pi_test_{}", Uuid::new_v4().simple()),
            client_secret: Some("secret_test".to_string()),
        })
    }
}

/// A closed auction won by a fresh bidder, with a pending checkout.
async fn pending_payment(db_manager: &DatabaseManager) -> Payment {
    let owner = create_user(db_manager, "seller").await;
    let bidder = create_user(db_manager, "bidder").await;
    let auction_id = create_listing(db_manager, &owner).await;
    bid(db_manager, &bidder, auction_id, dec!(30.00)).await.unwrap();
    close_auction(db_manager, owner.id, auction_id).await.unwrap();

    let checkout = process(
        db_manager,
        &FakeGateway,
        &StripeConfig::default(),
        bidder.id,
        auction_id,
    )
    .await
    .unwrap();
    let Checkout::Ready(view) = checkout else {
        panic!("expected a fresh checkout");
    };
    assert!(view.payment.is(PaymentStatus::Pending));
    view.payment
}

fn intent_event(kind: &str, intent_id: &str) -> String {
    format!(
        r#"{{"type": "{}", "data": {{"object": {{"id": "{}"}}}}}}"#,
        kind, intent_id
    )
}

fn stripe_signature(payload: &[u8], timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(format!("{}.", timestamp).as_bytes());
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

// endregion: --- Fixtures

#[tokio::test]
#[ignore]
async fn test_bid_must_exceed_current_highest() {
    let db_manager = setup().await;
    let owner = create_user(&db_manager, "seller").await;
    let bidder = create_user(&db_manager, "bidder").await;
    let auction_id = create_listing(&db_manager, &owner).await;

    let equal = bid(&db_manager, &bidder, auction_id, dec!(10.00)).await;
    assert!(matches!(equal, Err(AppError::Rejected { code: "LOW_BID", .. })));

    bid(&db_manager, &bidder, auction_id, dec!(15.00)).await.unwrap();

    let lower = bid(&db_manager, &bidder, auction_id, dec!(12.50)).await;
    assert!(matches!(lower, Err(AppError::Rejected { code: "LOW_BID", .. })));

    let own = bid(&db_manager, &owner, auction_id, dec!(50.00)).await;
    assert!(matches!(own, Err(AppError::Rejected { code: "OWN_AUCTION", .. })));
}

#[tokio::test]
#[ignore]
async fn test_closing_with_outside_bid_notifies_end_and_win() {
    let db_manager = setup().await;
    let owner = create_user(&db_manager, "seller").await;
    let bidder = create_user(&db_manager, "bidder").await;
    let auction_id = create_listing(&db_manager, &owner).await;
    bid(&db_manager, &bidder, auction_id, dec!(20.00)).await.unwrap();

    let closed = close_auction(&db_manager, owner.id, auction_id).await.unwrap();
    assert!(closed.is_close);
    assert_eq!(count_notifications(&db_manager, "auction", auction_id, "auction_ended").await, 1);
    assert_eq!(count_notifications(&db_manager, "auction", auction_id, "auction_won").await, 1);

    let again = close_auction(&db_manager, owner.id, auction_id).await;
    assert!(matches!(again, Err(AppError::Rejected { code: "ALREADY_ENDED", .. })));
    assert_eq!(count_notifications(&db_manager, "auction", auction_id, "auction_ended").await, 1);
}

#[tokio::test]
#[ignore]
async fn test_rating_is_unique_per_triple() {
    let db_manager = setup().await;
    let owner = create_user(&db_manager, "seller").await;
    let bidder = create_user(&db_manager, "bidder").await;
    let auction_id = create_listing(&db_manager, &owner).await;
    bid(&db_manager, &bidder, auction_id, dec!(20.00)).await.unwrap();
    close_auction(&db_manager, owner.id, auction_id).await.unwrap();

    let rate = |score| SubmitRatingCommand {
        auction_id: Some(auction_id),
        score,
        comment: "Fast payment".to_string(),
        as_seller: false,
        as_buyer: true,
    };
    let first = submit_rating(&db_manager, &owner, &bidder.username, rate(5)).await.unwrap();
    assert!(first.created);
    let second = submit_rating(&db_manager, &owner, &bidder.username, rate(3)).await.unwrap();
    assert!(!second.created);
    assert_eq!(second.rating.id, first.rating.id);
    assert_eq!(second.rating.score, 3);

    let mut conn = db_manager.pool().acquire().await.unwrap();
    let duplicate = insert_rating(
        &mut conn,
        &NewRating {
            rated_user_id: bidder.id,
            rater_id: owner.id,
            auction_id: Some(auction_id),
            score: 4,
            comment: String::new(),
            as_seller: false,
            as_buyer: true,
        },
    )
    .await;
    assert!(matches!(
        duplicate,
        Err(AppError::Conflict { code: "DUPLICATE_RATING", .. })
    ));
}

#[tokio::test]
#[ignore]
async fn test_completed_webhook_updates_one_payment_and_notifies_both_parties() {
    let db_manager = setup().await;
    let owner = create_user(&db_manager, "seller").await;
    let bidder = create_user(&db_manager, "bidder").await;
    let auction_id = create_listing(&db_manager, &owner).await;
    bid(&db_manager, &bidder, auction_id, dec!(42.50)).await.unwrap();
    close_auction(&db_manager, owner.id, auction_id).await.unwrap();

    let checkout = process(
        &db_manager,
        &FakeGateway,
        &StripeConfig::default(),
        bidder.id,
        auction_id,
    )
    .await
    .unwrap();
    let Checkout::Ready(view) = checkout else {
        panic!("expected a fresh checkout");
    };
    assert_eq!(view.payment.amount, dec!(42.50));
    let intent_id = view.payment.stripe_payment_intent_id.clone().unwrap();

    let outcome = complete_payment(&db_manager, &intent_id).await.unwrap();
    assert_eq!(
        outcome,
        WebhookOutcome::Completed {
            payment_id: view.payment.id,
            notifications: 2,
        }
    );
    let payment = get_payment(db_manager.pool(), view.payment.id).await.unwrap();
    assert!(payment.is(PaymentStatus::Completed));
    assert_eq!(count_notifications(&db_manager, "payment", payment.id, "payment").await, 2);

    let replay = complete_payment(&db_manager, &intent_id).await.unwrap();
    assert_eq!(replay, WebhookOutcome::AlreadyCompleted { payment_id: payment.id });
    assert_eq!(count_notifications(&db_manager, "payment", payment.id, "payment").await, 2);
}

#[tokio::test]
#[ignore]
async fn test_verbatim_example_matches_its_category() {
    let db_manager = setup().await;
    let models = ChatModels::new(ChatbotConfig::default());
    let bot = SmartChatBot::new(&db_manager, &models);

    let reply = bot.respond(None, None, "hello").await;
    assert_eq!(reply.category.as_deref(), Some("greetings"));
    assert_eq!(reply.source, SOURCE_KNOWLEDGE_BASE);
    assert_eq!(reply.confidence, 1.0);
    assert_eq!(reply.language, "en");
}

#[tokio::test]
#[ignore]
async fn test_failed_intent_marks_pending_payment_failed() {
    let db_manager = setup().await;
    let payment = pending_payment(&db_manager).await;
    let intent_id = payment.stripe_payment_intent_id.clone().unwrap();
    let payload = intent_event("payment_intent.payment_failed", &intent_id);

    let outcome = handle_webhook(&db_manager, &StripeConfig::default(), payload.as_bytes(), None)
        .await
        .unwrap();
    assert_eq!(outcome, WebhookOutcome::Failed { payment_id: payment.id });
    let stored = get_payment(db_manager.pool(), payment.id).await.unwrap();
    assert!(stored.is(PaymentStatus::Failed));

    let unknown = intent_event("payment_intent.payment_failed", "pi_missing");
    let outcome = handle_webhook(&db_manager, &StripeConfig::default(), unknown.as_bytes(), None)
        .await
        .unwrap();
    assert_eq!(outcome, WebhookOutcome::UnknownIntent("pi_missing".to_string()));
}

#[tokio::test]
#[ignore]
async fn test_signed_webhook_replay_through_router_notifies_once() {
    let db_manager = setup().await;
    let payment = pending_payment(&db_manager).await;
    let intent_id = payment.stripe_payment_intent_id.clone().unwrap();

    let mut config = AppConfig::default();
    config.stripe.webhook_secret = WEBHOOK_SECRET.to_string();
    let app = routes::app(AppState::new(db_manager.clone(), config));

    let payload = intent_event("payment_intent.succeeded", &intent_id);
    for _ in 0..2 {
        let signature = stripe_signature(payload.as_bytes(), chrono::Utc::now().timestamp());
        let request = Request::builder()
            .method("POST")
            .uri("/payments/webhook")
            .header("Stripe-Signature", signature)
            .body(Body::from(payload.clone()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stored = get_payment(db_manager.pool(), payment.id).await.unwrap();
    assert!(stored.is(PaymentStatus::Completed));
    assert_eq!(count_notifications(&db_manager, "payment", payment.id, "payment").await, 2);
}

#[tokio::test]
#[ignore]
async fn test_disabled_app_preference_suppresses_notification() {
    let db_manager = setup().await;
    let user = create_user(&db_manager, "quiet").await;
    update_preferences(
        &db_manager,
        user.id,
        PreferencesUpdate {
            app_comment: Some(false),
            ..PreferencesUpdate::default()
        },
    )
    .await
    .unwrap();

    let object_id = (Uuid::new_v4().as_u128() % 1_000_000_000) as i64;
    let notify = |kind| NewNotification {
        user_id: user.id,
        title: "New comment".to_string(),
        message: "Someone commented".to_string(),
        kind,
        level: NotificationLevel::Info,
        link: None,
        object: Some(RelatedObject::comment(object_id)),
    };

    let mut conn = db_manager.pool().acquire().await.unwrap();
    let suppressed = create_notification(&mut conn, &notify(NotificationType::Comment))
        .await
        .unwrap();
    assert!(suppressed.is_none());
    assert_eq!(count_notifications(&db_manager, "comment", object_id, "comment").await, 0);

    let delivered = create_notification(&mut conn, &notify(NotificationType::Bid))
        .await
        .unwrap();
    assert!(delivered.is_some());
    assert_eq!(count_notifications(&db_manager, "comment", object_id, "bid").await, 1);
}

#[tokio::test]
#[ignore]
async fn test_database_entries_answer_after_builtin_and_before_fallback() {
    let db_manager = setup().await;
    let models = ChatModels::new(ChatbotConfig::default());
    let bot = SmartChatBot::new(&db_manager, &models);

    let suffix = Uuid::new_v4().as_u128() % 100_000_000;
    let example = format!("zqxw {:08}", suffix);
    let category = format!("custom_{:08}", suffix);
    sqlx::query(chatbot_queries::INSERT_ENTRY)
        .bind(&category)
        .bind("en")
        .bind(vec![example.clone()])
        .bind(vec!["Custom answer".to_string()])
        .bind(true)
        .execute(db_manager.pool())
        .await
        .unwrap();

    let builtin = bot.respond(None, None, "hello").await;
    assert_eq!(builtin.source, SOURCE_KNOWLEDGE_BASE);

    let stored = bot.respond(None, None, &example).await;
    assert_eq!(stored.source, SOURCE_DATABASE_KB);
    assert_eq!(stored.category.as_deref(), Some(category.as_str()));
    assert_eq!(stored.response, "Custom answer");

    let unmatched = bot.respond(None, None, "qwzx vbnm").await;
    assert_eq!(unmatched.source, SOURCE_FALLBACK);
    assert_eq!(unmatched.category, None);
}
