use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub jwt_secret: String,
    pub payment_base_url: String,
    pub payment_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            payment_base_url: "http://localhost:4242".to_string(),
            payment_api_key: "test-payment-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            jwt_secret: self.jwt_secret.clone(),
            payment_base_url: self.payment_base_url.clone(),
            payment_api_key: self.payment_api_key.clone(),
            payment_timeout_secs: 2,
            provider_categories: String::new(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestPrincipal {
    pub id: String,
    pub role: String,
}

impl Default for TestPrincipal {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: "consumer".to_string(),
        }
    }
}

impl TestPrincipal {
    pub fn consumer(id: &str) -> Self {
        Self { id: id.to_string(), role: "consumer".to_string() }
    }

    pub fn provider(id: &str) -> Self {
        Self { id: id.to_string(), role: "provider".to_string() }
    }

    pub fn admin() -> Self {
        Self { id: Uuid::new_v4().to_string(), role: "admin".to_string() }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    /// Mint a signed HS256 token for tests; mirrors the shape the middleware
    /// expects.
    pub fn create_token(principal: &TestPrincipal, secret: &str) -> String {
        let header = json!({ "alg": "HS256", "typ": "JWT" });
        let now = Utc::now();
        let claims = json!({
            "sub": principal.id,
            "role": principal.role,
            "iat": now.timestamp(),
            "exp": (now + Duration::hours(1)).timestamp(),
        });

        let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims.to_string());
        let signing_input = format!("{}.{}", header_b64, claims_b64);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature)
    }

    pub fn create_expired_token(principal: &TestPrincipal, secret: &str) -> String {
        let header = json!({ "alg": "HS256", "typ": "JWT" });
        let past = Utc::now() - Duration::hours(2);
        let claims = json!({
            "sub": principal.id,
            "role": principal.role,
            "iat": past.timestamp(),
            "exp": (past + Duration::hours(1)).timestamp(),
        });

        let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims.to_string());
        let signing_input = format!("{}.{}", header_b64, claims_b64);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature)
    }
}
