use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use payment_cell::{PaymentError, PaymentGate, PaymentVerifier};
use shared_store::records::{Booking, BookingStatus};
use shared_store::ScheduleStore;

use crate::models::{BookRequest, BookingError};
use crate::services::directory::ProviderDirectory;

pub struct BookingService {
    store: Arc<ScheduleStore>,
    directory: Arc<dyn ProviderDirectory>,
    gate: PaymentGate,
}

impl BookingService {
    pub fn new(
        store: Arc<ScheduleStore>,
        directory: Arc<dyn ProviderDirectory>,
        verifier: Arc<dyn PaymentVerifier>,
    ) -> Self {
        Self {
            store,
            directory,
            gate: PaymentGate::new(verifier),
        }
    }

    /// Book a slot. The ordering here is load-bearing: lookup and payment
    /// confirmation run before any state changes, and the claim itself is a
    /// conditional flip under the provider's lock. A slot taken between the
    /// read and the claim surfaces as a failed claim, never a double
    /// booking, and a payment failure leaves the slot untouched.
    pub async fn book(&self, request: BookRequest) -> Result<Booking, BookingError> {
        debug!(
            "Booking request: provider {} consumer {} at {}",
            request.provider_id, request.consumer_id, request.start
        );

        if request.start >= request.end {
            return Err(BookingError::Validation(
                "slot start must be before its end".to_string(),
            ));
        }
        if request.start.date_naive() != request.date {
            return Err(BookingError::Validation(
                "slot start does not fall on the requested date".to_string(),
            ));
        }

        // Step 1: locate the window for the requested calendar day.
        let windows = self
            .store
            .windows_for_provider(request.provider_id, Some(request.date))
            .await;
        if windows.is_empty() {
            return Err(BookingError::SlotUnavailable(format!(
                "No availability for {}",
                request.date
            )));
        }

        // Step 2: locate a free slot whose start matches exactly. Missing
        // and occupied are reported the same way.
        let target = windows.iter().find_map(|window| {
            window
                .slots
                .iter()
                .find(|slot| slot.start == request.start && !slot.occupied)
                .map(|slot| (window.id, slot.id, slot.start, slot.end))
        });
        let Some((window_id, slot_id, slot_start, slot_end)) = target else {
            // A slot that exists but is occupied reads the same as one that
            // never existed.
            return Err(BookingError::SlotUnavailable(
                "Slot unavailable".to_string(),
            ));
        };

        if slot_end != request.end {
            return Err(BookingError::Validation(
                "slot end does not match the requested interval".to_string(),
            ));
        }

        // Step 3: payment gate, outside any lock. Nothing has been claimed
        // yet, so a failure here has no state to undo.
        let category = self.directory.category(request.provider_id).await;
        if PaymentGate::requires_payment(category) {
            let reference = request
                .payment_reference
                .as_deref()
                .ok_or(BookingError::PaymentRequired)?;

            self.gate.confirm(reference).await.map_err(|e| match e {
                PaymentError::ReferenceNotFound => {
                    BookingError::PaymentFailed("payment reference not found".to_string())
                }
                PaymentError::NotSucceeded(status) => {
                    BookingError::PaymentFailed(format!("payment is {}", status))
                }
                PaymentError::Timeout => {
                    BookingError::PaymentFailed("payment provider timed out".to_string())
                }
                PaymentError::ProviderError(msg) => BookingError::PaymentFailed(msg),
            })?;
        }

        // Step 4: conditional claim. The store re-checks occupancy under the
        // provider lock, so a stale read above cannot produce a double claim.
        if !self
            .store
            .claim_slot(request.provider_id, window_id, slot_id)
            .await
        {
            return Err(BookingError::SlotUnavailable(
                "Slot unavailable".to_string(),
            ));
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            consumer_id: request.consumer_id,
            provider_id: request.provider_id,
            date: request.date,
            window_id,
            slot_id,
            slot_start,
            slot_end,
            category,
            status: BookingStatus::Booked,
            payment_reference: request.payment_reference,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_booking(booking.clone()).await;

        info!(
            "Booked slot {} for consumer {} with provider {}",
            slot_id, booking.consumer_id, booking.provider_id
        );
        Ok(booking)
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        self.store
            .booking(booking_id)
            .await
            .ok_or(BookingError::NotFound)
    }

    /// A consumer's bookings, newest date first.
    pub async fn consumer_bookings(&self, consumer_id: Uuid) -> Vec<Booking> {
        self.store.bookings_for_consumer(consumer_id).await
    }

    /// A provider's bookings, newest date first.
    pub async fn provider_bookings(&self, provider_id: Uuid) -> Vec<Booking> {
        self.store.bookings_for_provider(provider_id).await
    }
}

/// Release helper shared with the lifecycle service: reopening the slot is
/// best-effort, since the window may have been deleted after booking.
pub(crate) async fn release_booked_slot(store: &ScheduleStore, booking: &Booking) {
    let released = store
        .release_slot(booking.provider_id, booking.window_id, booking.slot_id)
        .await;
    if !released {
        warn!(
            "Slot {} for booking {} no longer exists; skipping release",
            booking.slot_id, booking.id
        );
    }
}
