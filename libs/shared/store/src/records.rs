use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single bookable interval inside an availability window.
///
/// Slots carry a stable id so bookings can reference them directly instead of
/// matching on timestamps. The occupied flag is flipped only through the
/// store's conditional claim/release operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub occupied: bool,
}

impl Slot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            occupied: false,
        }
    }
}

/// Provider classification deciding whether a booking must be prepaid.
/// Read-only input from the provider record; the engine never mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCategory {
    Public,
    Private,
}

impl fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderCategory::Public => write!(f, "public"),
            ProviderCategory::Private => write!(f, "private"),
        }
    }
}

#[derive(Debug)]
pub struct ProviderCategoryParseError(pub String);

impl fmt::Display for ProviderCategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown provider category: {}", self.0)
    }
}

impl std::error::Error for ProviderCategoryParseError {}

impl std::str::FromStr for ProviderCategory {
    type Err = ProviderCategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(ProviderCategory::Public),
            "private" => Ok(ProviderCategory::Private),
            other => Err(ProviderCategoryParseError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePolicy {
    None,
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for RecurrencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrencePolicy::None => write!(f, "none"),
            RecurrencePolicy::Daily => write!(f, "daily"),
            RecurrencePolicy::Weekly => write!(f, "weekly"),
            RecurrencePolicy::Monthly => write!(f, "monthly"),
        }
    }
}

/// A provider's declared bookable slots for one calendar day.
///
/// Invariant maintained by the availability service: every slot lies within
/// `date`'s 24-hour span, and the union of a provider's windows for one date
/// is free of overlapping slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
    pub recurrence: RecurrencePolicy,
}

impl AvailabilityWindow {
    pub fn new(
        provider_id: Uuid,
        date: NaiveDate,
        slots: Vec<Slot>,
        recurrence: RecurrencePolicy,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider_id,
            date,
            slots,
            recurrence,
        }
    }

    pub fn has_occupied_slots(&self) -> bool {
        self.slots.iter().any(|slot| slot.occupied)
    }

    pub fn slot_by_id(&self, slot_id: Uuid) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.id == slot_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Booked,
    Completed,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Booked => write!(f, "booked"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

/// A consumer's claim on a slot. Slot coordinates are copies, not live
/// references; `window_id` and `slot_id` are the stable handles used to
/// release the slot on cancellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub consumer_id: Uuid,
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub window_id: Uuid,
    pub slot_id: Uuid,
    pub slot_start: DateTime<Utc>,
    pub slot_end: DateTime<Utc>,
    pub category: ProviderCategory,
    pub status: BookingStatus,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
