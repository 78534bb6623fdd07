// region:    --- Imports
use super::model::PaymentIntent;
use crate::config::StripeConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info};
// endregion: --- Imports

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Creates payment intents with a card processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: &[(&str, String)],
    ) -> AppResult<PaymentIntent>;
}

/// Stripe REST client. Requests are form encoded and authenticated with the
/// secret key as a bearer token.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: config.secret_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: &[(&str, String)],
    ) -> AppResult<PaymentIntent> {
        if self.secret_key.is_empty() {
            return Err(AppError::ExternalService(
                "Stripe secret key is not configured".to_string(),
            ));
        }

        let mut form: Vec<(String, String)> = vec![
            ("amount".to_string(), amount_minor.to_string()),
            ("currency".to_string(), currency.to_string()),
        ];
        for (key, value) in metadata {
            form.push((format!("metadata[{}]", key), value.clone()));
        }

        let url = format!("{}/v1/payment_intents", self.api_base);
        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<StripeErrorBody>().await {
                Ok(body) => body
                    .error
                    .message
                    .unwrap_or_else(|| format!("Stripe returned {}", status)),
                Err(_) => format!("Stripe returned {}", status),
            };
            error!("{:<12} --> Payment intent rejected: {}", "Stripe", message);
            return Err(AppError::ExternalService(message));
        }

        let intent = response
            .json::<PaymentIntent>()
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;
        info!("{:<12} --> Created payment intent {}", "Stripe", intent.id);
        Ok(intent)
    }
}
