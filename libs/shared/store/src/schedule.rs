use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::records::{AvailabilityWindow, Booking, BookingStatus};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("proposed slots conflict with an existing window")]
    Conflict,

    #[error("window still contains occupied slots")]
    OccupiedSlots,

    #[error("booking is not in the expected status")]
    StatusMismatch,
}

/// One provider's availability document. The mutex serializes every slot
/// mutation for the provider; requests for different providers never contend
/// on it.
struct ProviderShelf {
    windows: Mutex<Vec<AvailabilityWindow>>,
}

impl ProviderShelf {
    fn new() -> Self {
        Self {
            windows: Mutex::new(Vec::new()),
        }
    }
}

/// In-memory schedule store.
///
/// Stands in for the document database: windows are looked up, inserted and
/// updated by id, and every check-then-act sequence (overlap validation
/// before commit, claim of an unoccupied slot) runs under the owning
/// provider's lock so concurrent bookers cannot both observe a free slot.
pub struct ScheduleStore {
    providers: RwLock<HashMap<Uuid, Arc<ProviderShelf>>>,
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
            bookings: RwLock::new(HashMap::new()),
        }
    }

    async fn shelf(&self, provider_id: Uuid) -> Arc<ProviderShelf> {
        {
            let providers = self.providers.read().await;
            if let Some(shelf) = providers.get(&provider_id) {
                return Arc::clone(shelf);
            }
        }
        let mut providers = self.providers.write().await;
        Arc::clone(
            providers
                .entry(provider_id)
                .or_insert_with(|| Arc::new(ProviderShelf::new())),
        )
    }

    async fn shelf_if_exists(&self, provider_id: Uuid) -> Option<Arc<ProviderShelf>> {
        self.providers.read().await.get(&provider_id).map(Arc::clone)
    }

    // ==========================================================================
    // AVAILABILITY WINDOWS
    // ==========================================================================

    /// Insert a window after the caller's validation passes against the
    /// provider's current windows. Validation and insert happen under the
    /// provider lock, so no other window can slip in between them.
    pub async fn insert_window_checked(
        &self,
        window: AvailabilityWindow,
        is_valid: impl FnOnce(&[AvailabilityWindow]) -> bool,
    ) -> Result<(), StoreError> {
        let shelf = self.shelf(window.provider_id).await;
        let mut windows = shelf.windows.lock().await;

        if !is_valid(&windows) {
            return Err(StoreError::Conflict);
        }

        debug!("Inserting window {} for provider {}", window.id, window.provider_id);
        windows.push(window);
        Ok(())
    }

    /// Replace a window by id. The validation closure sees every window for
    /// the provider except the one being replaced, again under the provider
    /// lock.
    pub async fn update_window_checked(
        &self,
        window: AvailabilityWindow,
        is_valid: impl FnOnce(&[AvailabilityWindow]) -> bool,
    ) -> Result<AvailabilityWindow, StoreError> {
        let shelf = self
            .shelf_if_exists(window.provider_id)
            .await
            .ok_or(StoreError::NotFound)?;
        let mut windows = shelf.windows.lock().await;

        let position = windows
            .iter()
            .position(|existing| existing.id == window.id)
            .ok_or(StoreError::NotFound)?;

        let others: Vec<AvailabilityWindow> = windows
            .iter()
            .filter(|existing| existing.id != window.id)
            .cloned()
            .collect();
        if !is_valid(&others) {
            return Err(StoreError::Conflict);
        }

        debug!("Updating window {} for provider {}", window.id, window.provider_id);
        windows[position] = window.clone();
        Ok(window)
    }

    /// Remove a window, refusing while any slot is occupied. The occupancy
    /// check and the removal are one atomic step.
    pub async fn remove_window(&self, window_id: Uuid) -> Result<(), StoreError> {
        let providers = self.providers.read().await;
        for shelf in providers.values() {
            let mut windows = shelf.windows.lock().await;
            if let Some(position) = windows.iter().position(|w| w.id == window_id) {
                if windows[position].has_occupied_slots() {
                    return Err(StoreError::OccupiedSlots);
                }
                windows.remove(position);
                debug!("Removed window {}", window_id);
                return Ok(());
            }
        }
        Err(StoreError::NotFound)
    }

    pub async fn window(&self, window_id: Uuid) -> Option<AvailabilityWindow> {
        let providers = self.providers.read().await;
        for shelf in providers.values() {
            let windows = shelf.windows.lock().await;
            if let Some(window) = windows.iter().find(|w| w.id == window_id) {
                return Some(window.clone());
            }
        }
        None
    }

    pub async fn windows_for_provider(
        &self,
        provider_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Vec<AvailabilityWindow> {
        let Some(shelf) = self.shelf_if_exists(provider_id).await else {
            return Vec::new();
        };
        let windows = shelf.windows.lock().await;
        windows
            .iter()
            .filter(|window| date.map_or(true, |d| window.date == d))
            .cloned()
            .collect()
    }

    // ==========================================================================
    // SLOT CLAIM / RELEASE
    // ==========================================================================

    /// Conditional claim: set `occupied = true` only where it is still false.
    /// Returns whether the flip happened; a stale read by the caller shows up
    /// here as `false`, never as a double claim.
    pub async fn claim_slot(&self, provider_id: Uuid, window_id: Uuid, slot_id: Uuid) -> bool {
        let Some(shelf) = self.shelf_if_exists(provider_id).await else {
            return false;
        };
        let mut windows = shelf.windows.lock().await;

        let Some(window) = windows.iter_mut().find(|w| w.id == window_id) else {
            return false;
        };
        let Some(slot) = window.slots.iter_mut().find(|s| s.id == slot_id) else {
            return false;
        };

        if slot.occupied {
            return false;
        }
        slot.occupied = true;
        debug!("Claimed slot {} in window {}", slot_id, window_id);
        true
    }

    /// Best-effort release; returns false when the window or slot no longer
    /// exists.
    pub async fn release_slot(&self, provider_id: Uuid, window_id: Uuid, slot_id: Uuid) -> bool {
        let Some(shelf) = self.shelf_if_exists(provider_id).await else {
            return false;
        };
        let mut windows = shelf.windows.lock().await;

        let Some(window) = windows.iter_mut().find(|w| w.id == window_id) else {
            return false;
        };
        let Some(slot) = window.slots.iter_mut().find(|s| s.id == slot_id) else {
            return false;
        };

        slot.occupied = false;
        debug!("Released slot {} in window {}", slot_id, window_id);
        true
    }

    // ==========================================================================
    // BOOKINGS
    // ==========================================================================

    pub async fn insert_booking(&self, booking: Booking) {
        debug!("Inserting booking {}", booking.id);
        self.bookings.write().await.insert(booking.id, booking);
    }

    pub async fn booking(&self, booking_id: Uuid) -> Option<Booking> {
        self.bookings.read().await.get(&booking_id).cloned()
    }

    /// Atomic status transition guarded by the expected current status.
    pub async fn transition_booking(
        &self,
        booking_id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<Booking, StoreError> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings.get_mut(&booking_id).ok_or(StoreError::NotFound)?;

        if booking.status != expected {
            return Err(StoreError::StatusMismatch);
        }

        booking.status = next;
        booking.updated_at = Utc::now();
        debug!("Booking {} transitioned {} -> {}", booking_id, expected, next);
        Ok(booking.clone())
    }

    pub async fn bookings_for_consumer(&self, consumer_id: Uuid) -> Vec<Booking> {
        let bookings = self.bookings.read().await;
        let mut result: Vec<Booking> = bookings
            .values()
            .filter(|booking| booking.consumer_id == consumer_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.date.cmp(&a.date).then(b.slot_start.cmp(&a.slot_start)));
        result
    }

    pub async fn bookings_for_provider(&self, provider_id: Uuid) -> Vec<Booking> {
        let bookings = self.bookings.read().await;
        let mut result: Vec<Booking> = bookings
            .values()
            .filter(|booking| booking.provider_id == provider_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.date.cmp(&a.date).then(b.slot_start.cmp(&a.slot_start)));
        result
    }
}

impl Default for ScheduleStore {
    fn default() -> Self {
        Self::new()
    }
}
