use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub payment_base_url: String,
    pub payment_api_key: String,
    pub payment_timeout_secs: u64,
    /// Comma-separated `provider_id=category` pairs seeding the provider
    /// directory, e.g. `9f3b...=private,ab12...=public`.
    pub provider_categories: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            payment_base_url: env::var("PAYMENT_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("PAYMENT_BASE_URL not set, using empty value");
                    String::new()
                }),
            payment_api_key: env::var("PAYMENT_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("PAYMENT_API_KEY not set, using empty value");
                    String::new()
                }),
            payment_timeout_secs: env::var("PAYMENT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            provider_categories: env::var("PROVIDER_CATEGORIES").unwrap_or_default(),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    pub fn is_payment_configured(&self) -> bool {
        !self.payment_base_url.is_empty() && !self.payment_api_key.is_empty()
    }
}
