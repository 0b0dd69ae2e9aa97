use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use shared_store::records::AvailabilityWindow;

/// Half-open interval intersection: back-to-back slots sharing only a
/// boundary instant do not overlap.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Check a proposed slot set for `date` against a provider's existing
/// windows. Only windows whose calendar `date` matches are considered;
/// `exclude` drops the window being edited from the comparison.
pub fn conflicts_with_existing(
    date: NaiveDate,
    proposed: &[(DateTime<Utc>, DateTime<Utc>)],
    existing: &[AvailabilityWindow],
    exclude: Option<Uuid>,
) -> bool {
    existing
        .iter()
        .filter(|window| window.date == date)
        .filter(|window| exclude.map_or(true, |id| window.id != id))
        .any(|window| {
            window.slots.iter().any(|slot| {
                proposed
                    .iter()
                    .any(|&(start, end)| intervals_overlap(start, end, slot.start, slot.end))
            })
        })
}
