use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde_json::{json, Value};
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{PaymentError, PaymentIntent, PaymentIntentStatus};

/// Queries the external payment provider for the terminal status of a
/// payment reference. Split out as a trait so the booking tests can stub the
/// provider without a network round trip.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn intent_status(&self, reference: &str) -> Result<PaymentIntentStatus, PaymentError>;
}

/// HTTP client for the payment provider. Requests carry the API key and a
/// bounded timeout; a timeout or transport failure is surfaced, never
/// retried here.
pub struct PaymentProviderClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PaymentProviderClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.payment_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.payment_base_url.clone(),
            api_key: config.payment_api_key.clone(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, PaymentError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Payment provider request: {} {}", method, url);

        let mut req = self.client.request(method, &url).headers(self.headers());
        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                PaymentError::Timeout
            } else {
                PaymentError::ProviderError(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PaymentError::ReferenceNotFound);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Payment provider error ({}): {}", status, error_text);
            return Err(PaymentError::ProviderError(format!(
                "{}: {}",
                status, error_text
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| PaymentError::ProviderError(e.to_string()))
    }

    /// Create a pending payment intent keyed by amount and booking metadata.
    pub async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        provider_id: Uuid,
        consumer_id: Uuid,
    ) -> Result<PaymentIntent, PaymentError> {
        let body = json!({
            "amount": amount_cents,
            "currency": currency,
            "metadata": {
                "provider_id": provider_id,
                "consumer_id": consumer_id,
            }
        });

        let value = self
            .request(Method::POST, "/v1/payment_intents", Some(body))
            .await?;

        Self::parse_intent(value)
    }

    /// Fetch an intent by reference.
    pub async fn fetch_intent(&self, reference: &str) -> Result<PaymentIntent, PaymentError> {
        let path = format!("/v1/payment_intents/{}", reference);
        let value = self.request(Method::GET, &path, None).await?;
        Self::parse_intent(value)
    }

    fn parse_intent(value: Value) -> Result<PaymentIntent, PaymentError> {
        serde_json::from_value(value)
            .map_err(|e| PaymentError::ProviderError(format!("malformed intent payload: {}", e)))
    }
}

#[async_trait]
impl PaymentVerifier for PaymentProviderClient {
    async fn intent_status(&self, reference: &str) -> Result<PaymentIntentStatus, PaymentError> {
        let intent = self.fetch_intent(reference).await?;
        Ok(intent.status)
    }
}
