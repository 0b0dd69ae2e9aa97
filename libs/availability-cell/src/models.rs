use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_store::records::{AvailabilityWindow, RecurrencePolicy};

/// A proposed slot interval as submitted by the provider, before validation
/// assigns it an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWindowRequest {
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub slots: Vec<RawSlot>,
    #[serde(default = "default_recurrence")]
    pub recurrence: RecurrencePolicy,
}

fn default_recurrence() -> RecurrencePolicy {
    RecurrencePolicy::None
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWindowRequest {
    pub date: Option<NaiveDate>,
    pub slots: Option<Vec<RawSlot>>,
    pub recurrence: Option<RecurrencePolicy>,
}

/// Dates the expander visited, split by outcome. Skipped dates are reported
/// rather than silently dropped so callers can see partial application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpansionReport {
    pub created: Vec<NaiveDate>,
    pub skipped: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWindowResponse {
    pub window: AvailabilityWindow,
    pub expansion: ExpansionReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWindowResponse {
    pub window: AvailabilityWindow,
    /// Occupied slots that were replaced away by the new slot set. Permitted,
    /// but surfaced as a data-loss signal.
    pub occupied_slots_dropped: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    pub date: Option<NaiveDate>,
    /// Reference instant for the "upcoming" filter; defaults to the server
    /// clock when absent.
    pub from: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Proposed slots overlap existing availability")]
    Overlap,

    #[error("Availability window not found")]
    NotFound,

    #[error("Window contains occupied slots")]
    WindowOccupied,
}
