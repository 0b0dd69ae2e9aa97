use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_store::records::BookingStatus;

/// A booking request targets a slot by its coordinates; the engine resolves
/// these to a concrete slot id before claiming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRequest {
    pub provider_id: Uuid,
    pub consumer_id: Uuid,
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Booking not found")]
    NotFound,

    /// Covers both "no such slot" and "slot already occupied"; the two are
    /// deliberately indistinguishable to callers.
    #[error("{0}")]
    SlotUnavailable(String),

    #[error("Payment reference required for this provider")]
    PaymentRequired,

    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    #[error("Not authorized for this booking")]
    NotAuthorized,

    #[error("Booking is not in a state that allows this transition")]
    InvalidStatusTransition,
}
