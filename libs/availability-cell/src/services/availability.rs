use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_store::records::{AvailabilityWindow, RecurrencePolicy, Slot};
use shared_store::schedule::{ScheduleStore, StoreError};

use crate::models::{
    AvailabilityError, CreateWindowRequest, CreateWindowResponse, ExpansionReport, RawSlot,
    UpdateWindowRequest, UpdateWindowResponse,
};
use crate::services::{overlap, recurrence};

/// How far ahead the unfiltered listing looks.
const LISTING_HORIZON_DAYS: u64 = 30;

pub struct AvailabilityService {
    store: Arc<ScheduleStore>,
}

impl AvailabilityService {
    pub fn new(store: Arc<ScheduleStore>) -> Self {
        Self { store }
    }

    /// Create an availability window, then expand its recurrence policy over
    /// the fixed one-month horizon. Expansion is partial by policy: dates
    /// whose rebased slots collide with existing windows are skipped and
    /// reported, never aborting the operation.
    pub async fn create_window(
        &self,
        request: CreateWindowRequest,
    ) -> Result<CreateWindowResponse, AvailabilityError> {
        debug!(
            "Creating availability window for provider {} on {}",
            request.provider_id, request.date
        );

        validate_raw_slots(request.date, &request.slots)?;

        let slots: Vec<Slot> = request
            .slots
            .iter()
            .map(|raw| Slot::new(raw.start, raw.end))
            .collect();
        let proposed: Vec<(DateTime<Utc>, DateTime<Utc>)> =
            slots.iter().map(|slot| (slot.start, slot.end)).collect();

        let window = AvailabilityWindow::new(
            request.provider_id,
            request.date,
            slots,
            request.recurrence,
        );
        let response_window = window.clone();

        self.store
            .insert_window_checked(window, |existing| {
                !overlap::conflicts_with_existing(request.date, &proposed, existing, None)
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict => AvailabilityError::Overlap,
                _ => AvailabilityError::NotFound,
            })?;

        let expansion = self
            .expand_recurrence(&response_window, request.recurrence)
            .await;

        info!(
            "Created window {} for provider {} ({} recurrence dates, {} skipped)",
            response_window.id,
            request.provider_id,
            expansion.created.len(),
            expansion.skipped.len()
        );

        Ok(CreateWindowResponse {
            window: response_window,
            expansion,
        })
    }

    async fn expand_recurrence(
        &self,
        template: &AvailabilityWindow,
        policy: RecurrencePolicy,
    ) -> ExpansionReport {
        let mut report = ExpansionReport::default();

        for date in recurrence::candidate_dates(template.date, policy) {
            let rebased = recurrence::rebase_slots(template.date, date, &template.slots);
            let slots: Vec<Slot> = rebased
                .iter()
                .map(|&(start, end)| Slot::new(start, end))
                .collect();

            // Generated windows do not themselves recur.
            let window = AvailabilityWindow::new(
                template.provider_id,
                date,
                slots,
                RecurrencePolicy::None,
            );

            let result = self
                .store
                .insert_window_checked(window, |existing| {
                    !overlap::conflicts_with_existing(date, &rebased, existing, None)
                })
                .await;

            match result {
                Ok(()) => report.created.push(date),
                Err(_) => {
                    debug!("Skipping recurrence date {} for provider {}", date, template.provider_id);
                    report.skipped.push(date);
                }
            }
        }

        report
    }

    /// Replace a window's date, slots or recurrence. The overlap re-check
    /// runs against every other window on the resulting date, atomically
    /// with the replacement. Replacing slots wholesale may drop occupied
    /// ones; that count is surfaced to the caller.
    pub async fn update_window(
        &self,
        window_id: Uuid,
        request: UpdateWindowRequest,
    ) -> Result<UpdateWindowResponse, AvailabilityError> {
        let existing = self
            .store
            .window(window_id)
            .await
            .ok_or(AvailabilityError::NotFound)?;

        let new_date = request.date.unwrap_or(existing.date);

        let (new_slots, occupied_slots_dropped) = match &request.slots {
            Some(raw_slots) => {
                validate_raw_slots(new_date, raw_slots)?;
                let dropped = existing.slots.iter().filter(|s| s.occupied).count();
                if dropped > 0 {
                    warn!(
                        "Window {} update replaces {} occupied slot(s)",
                        window_id, dropped
                    );
                }
                let slots = raw_slots
                    .iter()
                    .map(|raw| Slot::new(raw.start, raw.end))
                    .collect();
                (slots, dropped)
            }
            None => {
                // Keep the slot set, shifting intervals onto the new date so
                // ids and occupancy survive a date-only move.
                let shift = new_date.signed_duration_since(existing.date);
                let slots: Vec<Slot> = existing
                    .slots
                    .iter()
                    .map(|slot| Slot {
                        id: slot.id,
                        start: slot.start + shift,
                        end: slot.end + shift,
                        occupied: slot.occupied,
                    })
                    .collect();
                (slots, 0)
            }
        };

        let proposed: Vec<(DateTime<Utc>, DateTime<Utc>)> = new_slots
            .iter()
            .map(|slot| (slot.start, slot.end))
            .collect();

        let updated = AvailabilityWindow {
            id: existing.id,
            provider_id: existing.provider_id,
            date: new_date,
            slots: new_slots,
            recurrence: request.recurrence.unwrap_or(existing.recurrence),
        };

        let window = self
            .store
            .update_window_checked(updated, |others| {
                !overlap::conflicts_with_existing(new_date, &proposed, others, None)
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict => AvailabilityError::Overlap,
                _ => AvailabilityError::NotFound,
            })?;

        info!("Updated window {} for provider {}", window.id, window.provider_id);

        Ok(UpdateWindowResponse {
            window,
            occupied_slots_dropped,
        })
    }

    /// Delete a window. Refused while any slot is occupied.
    pub async fn delete_window(&self, window_id: Uuid) -> Result<(), AvailabilityError> {
        self.store
            .remove_window(window_id)
            .await
            .map_err(|e| match e {
                StoreError::OccupiedSlots => AvailabilityError::WindowOccupied,
                _ => AvailabilityError::NotFound,
            })?;

        info!("Deleted window {}", window_id);
        Ok(())
    }

    pub async fn window(&self, window_id: Uuid) -> Option<AvailabilityWindow> {
        self.store.window(window_id).await
    }

    /// List a provider's availability. With a date filter the windows for
    /// that day are returned as stored. Unfiltered, the listing covers the
    /// next 30 days from `reference`, keeps only unoccupied slots, and drops
    /// windows left empty by that filter.
    pub async fn list_availability(
        &self,
        provider_id: Uuid,
        date: Option<NaiveDate>,
        reference: DateTime<Utc>,
    ) -> Vec<AvailabilityWindow> {
        if let Some(date) = date {
            let mut windows = self.store.windows_for_provider(provider_id, Some(date)).await;
            windows.sort_by(|a, b| a.date.cmp(&b.date));
            return windows;
        }

        let today = reference.date_naive();
        let horizon = today
            .checked_add_days(Days::new(LISTING_HORIZON_DAYS))
            .unwrap_or(today);

        let mut windows: Vec<AvailabilityWindow> = self
            .store
            .windows_for_provider(provider_id, None)
            .await
            .into_iter()
            .filter(|window| window.date >= today && window.date < horizon)
            .map(|mut window| {
                window.slots.retain(|slot| !slot.occupied);
                window
            })
            .filter(|window| !window.slots.is_empty())
            .collect();

        windows.sort_by(|a, b| a.date.cmp(&b.date));
        windows
    }
}

fn validate_raw_slots(date: NaiveDate, slots: &[RawSlot]) -> Result<(), AvailabilityError> {
    if slots.is_empty() {
        return Err(AvailabilityError::Validation(
            "at least one slot is required".to_string(),
        ));
    }

    let day_start = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AvailabilityError::Validation("invalid date".to_string()))?
        .and_utc();
    let day_end = day_start + chrono::Duration::days(1);

    for slot in slots {
        if slot.start >= slot.end {
            return Err(AvailabilityError::Validation(
                "slot start must be before its end".to_string(),
            ));
        }
        if slot.start < day_start || slot.end > day_end {
            return Err(AvailabilityError::Validation(format!(
                "slot {} - {} falls outside {}",
                slot.start, slot.end, date
            )));
        }
    }

    // The union invariant covers slots within one request too.
    for (i, a) in slots.iter().enumerate() {
        for b in slots.iter().skip(i + 1) {
            if overlap::intervals_overlap(a.start, a.end, b.start, b.end) {
                return Err(AvailabilityError::Validation(
                    "proposed slots overlap each other".to_string(),
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn raw(date: NaiveDate, start_hour: u32, end_hour: u32) -> RawSlot {
        RawSlot {
            start: date.and_hms_opt(start_hour, 0, 0).unwrap().and_utc(),
            end: date.and_hms_opt(end_hour, 0, 0).unwrap().and_utc(),
        }
    }

    fn service() -> (AvailabilityService, Arc<ScheduleStore>) {
        let store = Arc::new(ScheduleStore::new());
        (AvailabilityService::new(Arc::clone(&store)), store)
    }

    #[tokio::test]
    async fn disjoint_windows_on_the_same_date_both_succeed() {
        let (service, _) = service();
        let provider_id = Uuid::new_v4();
        let day = date(2025, 10, 1);

        service
            .create_window(CreateWindowRequest {
                provider_id,
                date: day,
                slots: vec![raw(day, 9, 10)],
                recurrence: RecurrencePolicy::None,
            })
            .await
            .unwrap();

        let second = service
            .create_window(CreateWindowRequest {
                provider_id,
                date: day,
                slots: vec![raw(day, 10, 11)],
                recurrence: RecurrencePolicy::None,
            })
            .await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn overlapping_window_is_rejected() {
        let (service, _) = service();
        let provider_id = Uuid::new_v4();
        let day = date(2025, 10, 1);

        service
            .create_window(CreateWindowRequest {
                provider_id,
                date: day,
                slots: vec![raw(day, 9, 11)],
                recurrence: RecurrencePolicy::None,
            })
            .await
            .unwrap();

        let result = service
            .create_window(CreateWindowRequest {
                provider_id,
                date: day,
                slots: vec![raw(day, 10, 12)],
                recurrence: RecurrencePolicy::None,
            })
            .await;
        assert!(matches!(result, Err(AvailabilityError::Overlap)));
    }

    #[tokio::test]
    async fn malformed_interval_is_rejected_before_persisting() {
        let (service, store) = service();
        let provider_id = Uuid::new_v4();
        let day = date(2025, 10, 1);

        let result = service
            .create_window(CreateWindowRequest {
                provider_id,
                date: day,
                slots: vec![RawSlot {
                    start: day.and_hms_opt(10, 0, 0).unwrap().and_utc(),
                    end: day.and_hms_opt(9, 0, 0).unwrap().and_utc(),
                }],
                recurrence: RecurrencePolicy::None,
            })
            .await;
        assert!(matches!(result, Err(AvailabilityError::Validation(_))));
        assert!(store.windows_for_provider(provider_id, None).await.is_empty());
    }

    #[tokio::test]
    async fn daily_recurrence_fills_the_month_and_skips_collisions() {
        let (service, _) = service();
        let provider_id = Uuid::new_v4();
        let template_day = date(2025, 10, 1);
        let colliding_day = date(2025, 10, 15);

        // Pre-existing window occupying the same time range on Oct 15.
        service
            .create_window(CreateWindowRequest {
                provider_id,
                date: colliding_day,
                slots: vec![raw(colliding_day, 9, 10)],
                recurrence: RecurrencePolicy::None,
            })
            .await
            .unwrap();

        let response = service
            .create_window(CreateWindowRequest {
                provider_id,
                date: template_day,
                slots: vec![raw(template_day, 9, 10)],
                recurrence: RecurrencePolicy::Daily,
            })
            .await
            .unwrap();

        assert_eq!(response.expansion.created.len(), 29);
        assert_eq!(response.expansion.skipped, vec![colliding_day]);
        assert!(!response.expansion.created.contains(&colliding_day));
        assert_eq!(response.expansion.created.first(), Some(&date(2025, 10, 2)));
        assert_eq!(response.expansion.created.last(), Some(&date(2025, 10, 31)));
    }

    #[tokio::test]
    async fn update_excludes_the_edited_window_from_the_overlap_check() {
        let (service, _) = service();
        let provider_id = Uuid::new_v4();
        let day = date(2025, 10, 1);

        let created = service
            .create_window(CreateWindowRequest {
                provider_id,
                date: day,
                slots: vec![raw(day, 9, 10)],
                recurrence: RecurrencePolicy::None,
            })
            .await
            .unwrap();

        // Same time range as before; only conflicts with itself.
        let updated = service
            .update_window(
                created.window.id,
                UpdateWindowRequest {
                    date: None,
                    slots: Some(vec![raw(day, 9, 10)]),
                    recurrence: None,
                },
            )
            .await;
        assert!(updated.is_ok());
    }

    #[tokio::test]
    async fn update_reports_dropped_occupied_slots() {
        let (service, store) = service();
        let provider_id = Uuid::new_v4();
        let day = date(2025, 10, 1);

        let created = service
            .create_window(CreateWindowRequest {
                provider_id,
                date: day,
                slots: vec![raw(day, 9, 10)],
                recurrence: RecurrencePolicy::None,
            })
            .await
            .unwrap();
        let slot_id = created.window.slots[0].id;
        assert!(store.claim_slot(provider_id, created.window.id, slot_id).await);

        let response = service
            .update_window(
                created.window.id,
                UpdateWindowRequest {
                    date: None,
                    slots: Some(vec![raw(day, 14, 15)]),
                    recurrence: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(response.occupied_slots_dropped, 1);
    }

    #[tokio::test]
    async fn delete_refuses_windows_with_occupied_slots() {
        let (service, store) = service();
        let provider_id = Uuid::new_v4();
        let day = date(2025, 10, 1);

        let created = service
            .create_window(CreateWindowRequest {
                provider_id,
                date: day,
                slots: vec![raw(day, 9, 10)],
                recurrence: RecurrencePolicy::None,
            })
            .await
            .unwrap();
        let window_id = created.window.id;
        let slot_id = created.window.slots[0].id;

        assert!(store.claim_slot(provider_id, window_id, slot_id).await);
        assert!(matches!(
            service.delete_window(window_id).await,
            Err(AvailabilityError::WindowOccupied)
        ));

        assert!(store.release_slot(provider_id, window_id, slot_id).await);
        assert!(service.delete_window(window_id).await.is_ok());
        assert!(service.window(window_id).await.is_none());
    }

    #[tokio::test]
    async fn unfiltered_listing_hides_occupied_slots_and_past_windows() {
        let (service, store) = service();
        let provider_id = Uuid::new_v4();
        let past_day = date(2025, 9, 1);
        let future_day = date(2025, 10, 5);
        let reference = date(2025, 10, 1).and_hms_opt(8, 0, 0).unwrap().and_utc();

        service
            .create_window(CreateWindowRequest {
                provider_id,
                date: past_day,
                slots: vec![raw(past_day, 9, 10)],
                recurrence: RecurrencePolicy::None,
            })
            .await
            .unwrap();
        let future = service
            .create_window(CreateWindowRequest {
                provider_id,
                date: future_day,
                slots: vec![raw(future_day, 9, 10), raw(future_day, 10, 11)],
                recurrence: RecurrencePolicy::None,
            })
            .await
            .unwrap();

        let slot_id = future.window.slots[0].id;
        assert!(store.claim_slot(provider_id, future.window.id, slot_id).await);

        let listing = service.list_availability(provider_id, None, reference).await;
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].date, future_day);
        assert_eq!(listing[0].slots.len(), 1);
        assert!(!listing[0].slots[0].occupied);
    }
}
