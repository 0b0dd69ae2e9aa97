use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use shared_store::records::{ProviderCategory, ProviderCategoryParseError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    Pending,
    Succeeded,
    Failed,
    Cancelled,
}

impl fmt::Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentIntentStatus::Pending => write!(f, "pending"),
            PaymentIntentStatus::Succeeded => write!(f, "succeeded"),
            PaymentIntentStatus::Failed => write!(f, "failed"),
            PaymentIntentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Payment intent as reported by the external provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub reference: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentIntentStatus,
    pub provider_id: Uuid,
    pub consumer_id: Uuid,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentRequest {
    pub amount_cents: i64,
    pub currency: Option<String>,
    pub provider_id: Uuid,
    pub consumer_id: Uuid,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PaymentError {
    #[error("payment reference not found")]
    ReferenceNotFound,

    #[error("payment is not in a succeeded state: {0}")]
    NotSucceeded(PaymentIntentStatus),

    #[error("payment provider timed out")]
    Timeout,

    #[error("payment provider error: {0}")]
    ProviderError(String),
}

