use crate::chatbot::models::ChatModels;
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::media::MediaStore;
use crate::payments::gateway::{PaymentGateway, StripeClient};
use std::sync::Arc;

/// Shared handles given to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub config: Arc<AppConfig>,
    pub payments: Arc<dyn PaymentGateway>,
    pub chat_models: Arc<ChatModels>,
    pub media: Arc<MediaStore>,
}

impl AppState {
    /// Wire the production collaborators from configuration.
    pub fn new(db: Arc<DatabaseManager>, config: AppConfig) -> Self {
        let payments: Arc<dyn PaymentGateway> = Arc::new(StripeClient::new(&config.stripe));
        let chat_models = Arc::new(ChatModels::new(config.chatbot.clone()));
        let media = Arc::new(MediaStore::new(config.media.clone()));
        Self {
            db,
            config: Arc::new(config),
            payments,
            chat_models,
            media,
        }
    }

    pub fn with_payment_gateway(mut self, payments: Arc<dyn PaymentGateway>) -> Self {
        self.payments = payments;
        self
    }
}
