use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use shared_models::auth::Principal;
use shared_store::records::{Booking, BookingStatus};
use shared_store::{ScheduleStore, StoreError};

use crate::models::BookingError;
use crate::services::booking::release_booked_slot;

/// Booking status transitions. `booked` is the only non-terminal state:
/// cancellation releases the paired slot, completion leaves it claimed.
pub struct BookingLifecycleService {
    store: Arc<ScheduleStore>,
}

impl BookingLifecycleService {
    pub fn new(store: Arc<ScheduleStore>) -> Self {
        Self { store }
    }

    /// Cancel a booking on behalf of its consumer. The ownership comparison
    /// is part of this contract even though broader role policy lives with
    /// the caller. Slot release is best-effort: a window deleted since
    /// booking does not block the cancellation.
    pub async fn cancel(
        &self,
        booking_id: Uuid,
        requester: &Principal,
    ) -> Result<Booking, BookingError> {
        let booking = self
            .store
            .booking(booking_id)
            .await
            .ok_or(BookingError::NotFound)?;

        if booking.consumer_id.to_string() != requester.id && !requester.is_admin() {
            return Err(BookingError::NotAuthorized);
        }

        let cancelled = self.transition(booking_id, BookingStatus::Cancelled).await?;
        release_booked_slot(&self.store, &cancelled).await;

        info!("Cancelled booking {}", booking_id);
        Ok(cancelled)
    }

    /// Administrative transition to `completed`. No slot side effect; a
    /// completed visit does not reopen the slot.
    pub async fn complete(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        let completed = self.transition(booking_id, BookingStatus::Completed).await?;
        info!("Completed booking {}", booking_id);
        Ok(completed)
    }

    /// Administrative status update covering both terminal transitions.
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, BookingError> {
        match status {
            BookingStatus::Completed => self.complete(booking_id).await,
            BookingStatus::Cancelled => {
                let cancelled = self.transition(booking_id, BookingStatus::Cancelled).await?;
                release_booked_slot(&self.store, &cancelled).await;
                info!("Cancelled booking {} (administrative)", booking_id);
                Ok(cancelled)
            }
            BookingStatus::Booked => Err(BookingError::InvalidStatusTransition),
        }
    }

    async fn transition(
        &self,
        booking_id: Uuid,
        next: BookingStatus,
    ) -> Result<Booking, BookingError> {
        debug!("Transitioning booking {} to {}", booking_id, next);
        self.store
            .transition_booking(booking_id, BookingStatus::Booked, next)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => BookingError::NotFound,
                _ => BookingError::InvalidStatusTransition,
            })
    }
}
